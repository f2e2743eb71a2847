use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::warn;
use reqwest::Url;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

use super::config::RemoteConfig;
use super::transport::{HttpTransport, Transport, TransportRequest};

type PendingCalls = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value>>>>>;

/// Delivery handle given to the transport. Resolving an id that is no longer
/// registered (the call already timed out or settled) is a no-op, so a late
/// response can never wake the wrong caller.
#[derive(Clone)]
pub struct ResponseSink {
    pending: PendingCalls,
}

impl ResponseSink {
    pub fn resolve(&self, call_id: u64, outcome: Result<Value>) {
        let sender = self.pending.lock().unwrap().remove(&call_id);
        if let Some(sender) = sender {
            let _ = sender.send(outcome);
        }
    }
}

/// Remote call layer: one `action` + flat string params per call, one JSON
/// response. Each in-flight call owns a slot in a shared registry keyed by a
/// monotonic call id, deregistered on every exit path, so overlapping calls
/// from unrelated screens never interfere.
#[derive(Clone)]
pub struct RemoteClient {
    config: RemoteConfig,
    transport: Arc<dyn Transport>,
    pending: PendingCalls,
    next_call_id: Arc<AtomicU64>,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_call_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_http(config: RemoteConfig) -> Self {
        Self::new(config, Arc::new(HttpTransport::new()))
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Issues one call and awaits its JSON payload.
    ///
    /// The response envelope is decoded exactly once, here: an `error` field
    /// or `success: false` rejects with [`Error::Remote`]; otherwise the
    /// `data` member (or the whole object when the service answers unwrapped)
    /// resolves the call.
    pub async fn call(&self, action: &str, params: &[(String, String)]) -> Result<Value> {
        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let url = self.build_url(action, params)?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(call_id, tx);
        self.transport.dispatch(
            TransportRequest {
                call_id,
                url: url.to_string(),
            },
            self.sink(),
        );

        let outcome = match tokio::time::timeout(self.config.request_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                // Sender dropped without delivering; treat as a transport loss.
                self.pending.lock().unwrap().remove(&call_id);
                Err(Error::Transport("request dropped".to_string()))
            }
            Err(_) => {
                self.pending.lock().unwrap().remove(&call_id);
                Err(Error::Timeout)
            }
        };

        decode_envelope(outcome?)
    }

    /// [`RemoteClient::call`] with bounded retry for transport-class failures.
    /// Logical failures from the service surface immediately; the final error
    /// of an exhausted loop is returned unchanged.
    pub async fn call_with_retry(&self, action: &str, params: &[(String, String)]) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            match self.call(action, params).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "{action} failed ({err}); retry {attempt}/{}",
                        self.config.max_retries
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn build_url(&self, action: &str, params: &[(String, String)]) -> Result<Url> {
        let pairs = std::iter::once(("action", action))
            .chain(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Url::parse_with_params(&self.config.base_url, pairs)
            .map_err(|err| Error::Validation(format!("bad endpoint url: {err}")))
    }

    fn sink(&self) -> ResponseSink {
        ResponseSink {
            pending: Arc::clone(&self.pending),
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

fn decode_envelope(raw: Value) -> Result<Value> {
    if let Some(object) = raw.as_object() {
        if let Some(message) = object.get("error").and_then(Value::as_str) {
            return Err(Error::Remote(message.to_string()));
        }
        if object.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(Error::Remote("remote call reported failure".to_string()));
        }
        if let Some(data) = object.get("data") {
            if !data.is_null() {
                return Ok(data.clone());
            }
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn config() -> RemoteConfig {
        RemoteConfig::new("http://localhost/exec")
    }

    /// Answers every call synchronously with a fixed payload.
    struct FixedTransport(Value);

    impl Transport for FixedTransport {
        fn dispatch(&self, request: TransportRequest, sink: ResponseSink) {
            sink.resolve(request.call_id, Ok(self.0.clone()));
        }
    }

    /// Fails every call, counting attempts.
    struct FailingTransport {
        attempts: Arc<AtomicU32>,
    }

    impl Transport for FailingTransport {
        fn dispatch(&self, request: TransportRequest, sink: ResponseSink) {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            sink.resolve(
                request.call_id,
                Err(Error::Transport(format!("attempt {n} refused"))),
            );
        }
    }

    /// Parks requests so tests can deliver (or withhold) responses manually.
    #[derive(Clone, Default)]
    struct ManualTransport {
        parked: Arc<Mutex<Vec<(TransportRequest, ResponseSink)>>>,
    }

    impl ManualTransport {
        fn take_all(&self) -> Vec<(TransportRequest, ResponseSink)> {
            std::mem::take(&mut self.parked.lock().unwrap())
        }
    }

    impl Transport for ManualTransport {
        fn dispatch(&self, request: TransportRequest, sink: ResponseSink) {
            self.parked.lock().unwrap().push((request, sink));
        }
    }

    #[tokio::test]
    async fn success_unwraps_data_and_cleans_up() {
        let client = Arc::new(RemoteClient::new(
            config(),
            Arc::new(FixedTransport(json!({ "data": { "totalPlayers": 3 } }))),
        ));
        let value = client.call("getPlayers", &[]).await.unwrap();
        assert_eq!(value, json!({ "totalPlayers": 3 }));
        assert_eq!(client.pending_len(), 0);
    }

    #[tokio::test]
    async fn logical_error_rejects_verbatim() {
        let client = RemoteClient::new(
            config(),
            Arc::new(FixedTransport(json!({ "error": "Unknown tab: U99" }))),
        );
        let err = client.call("getPlayers", &[]).await.unwrap_err();
        assert!(matches!(&err, Error::Remote(msg) if msg == "Unknown tab: U99"));
        assert!(!err.is_retryable());
        assert_eq!(client.pending_len(), 0);
    }

    #[tokio::test]
    async fn success_false_is_a_logical_error() {
        let client = RemoteClient::new(
            config(),
            Arc::new(FixedTransport(json!({ "success": false }))),
        );
        assert!(matches!(
            client.call("saveGroupPhoto", &[]).await,
            Err(Error::Remote(_))
        ));
    }

    #[tokio::test]
    async fn unwrapped_object_passes_through() {
        let client = RemoteClient::new(
            config(),
            Arc::new(FixedTransport(json!({ "success": true, "fileUrl": "u" }))),
        );
        let value = client.call("saveGroupPhoto", &[]).await.unwrap();
        assert_eq!(value["fileUrl"], "u");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_deregisters_and_late_delivery_is_a_noop() {
        let transport = ManualTransport::default();
        let client = RemoteClient::new(config(), Arc::new(transport.clone()));

        let err = client.call("getDashboard", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
        assert_eq!(client.pending_len(), 0, "timed-out handler must be deregistered");

        // The response finally shows up; nothing must be waiting for it.
        for (request, sink) in transport.take_all() {
            sink.resolve(request.call_id, Ok(json!({ "data": 1 })));
        }
        assert_eq!(client.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_bound_is_exact_and_last_error_surfaces() {
        let attempts = Arc::new(AtomicU32::new(0));
        let client = RemoteClient::new(
            config(),
            Arc::new(FailingTransport {
                attempts: Arc::clone(&attempts),
            }),
        );

        let err = client.call_with_retry("getDashboard", &[]).await.unwrap_err();
        assert_eq!(attempts.load(Ordering::SeqCst), 4, "1 initial + 3 retries");
        assert!(matches!(&err, Error::Transport(msg) if msg == "attempt 4 refused"));
        assert_eq!(client.pending_len(), 0);
    }

    #[tokio::test]
    async fn retry_counter_resets_per_call() {
        let client = RemoteClient::new(
            config(),
            Arc::new(FixedTransport(json!({ "data": "ok" }))),
        );
        // Two consecutive successful calls each succeed on their first attempt.
        assert!(client.call_with_retry("a", &[]).await.is_ok());
        assert!(client.call_with_retry("b", &[]).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_calls_resolve_independently() {
        let transport = ManualTransport::default();
        let client = RemoteClient::new(config(), Arc::new(transport.clone()));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.call("getDashboard", &[]).await }
        });
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.call("getAvailableTabs", &[]).await }
        });

        // Let both calls register before answering out of order.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut parked = transport.take_all();
        assert_eq!(parked.len(), 2);
        parked.sort_by_key(|(request, _)| request.call_id);
        let (req_a, sink_a) = parked.remove(0);
        let (req_b, sink_b) = parked.remove(0);
        sink_b.resolve(req_b.call_id, Ok(json!({ "data": "second" })));
        sink_a.resolve(req_a.call_id, Ok(json!({ "data": "first" })));

        assert_eq!(first.await.unwrap().unwrap(), json!("first"));
        assert_eq!(second.await.unwrap().unwrap(), json!("second"));
        assert_eq!(client.pending_len(), 0);
    }

    #[tokio::test]
    async fn builds_query_string_with_action_and_params() {
        let transport = ManualTransport::default();
        let client = RemoteClient::new(config(), Arc::new(transport.clone()));

        let call = tokio::spawn({
            let client = client.clone();
            async move {
                client
                    .call(
                        "getPlayers",
                        &[
                            ("location".to_string(), "NORTH".to_string()),
                            ("age".to_string(), "U14".to_string()),
                        ],
                    )
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let parked = transport.take_all();
        let url = &parked[0].0.url;
        assert!(url.contains("action=getPlayers"));
        assert!(url.contains("location=NORTH"));
        assert!(url.contains("age=U14"));
        parked[0].1.resolve(parked[0].0.call_id, Ok(json!({ "data": {} })));
        call.await.unwrap().unwrap();
    }
}
