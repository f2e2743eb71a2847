pub mod player;
pub mod schedule;

pub use player::{sort_by_pinny, Player};
pub use schedule::{
    completion_for, current_date_label, is_past_label, CompletionBucket, CompletionStatus,
    DateInfo, TryoutSchedule, TryoutSettings,
};
