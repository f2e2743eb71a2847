//! Resilient remote call layer.
//!
//! The backing store is a spreadsheet-fronting script endpoint that takes a
//! named action plus flat string params in a query string and answers one
//! JSON document. Calls carry a unique id through an explicit handler
//! registry, time out after a fixed bound, and transport-class failures are
//! retried a bounded number of times.

pub mod client;
pub mod config;
pub mod service;
pub mod transport;

pub use client::{RemoteClient, ResponseSink};
pub use config::RemoteConfig;
pub use service::{
    AgeGroupStats, DashboardData, DashboardTotals, GroupPhotoMetadata, GroupPhotoRecord,
    LocationStats, PhotoPlayerRef, PlayerPage, SavedPhoto, SortOrder, TabInfo, TryoutApi,
};
pub use transport::{HttpTransport, Transport, TransportRequest};
