use serde_json::Value;

use crate::error::Error;

use super::client::ResponseSink;

/// One outbound request: the fully-built query URL plus the call id the
/// response must be delivered under.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub call_id: u64,
    pub url: String,
}

/// Fire-and-forget request dispatch. The remote endpoint takes everything in
/// the query string and answers a single JSON document; implementations hand
/// the outcome back through the sink, keyed by call id. Delivery after the
/// caller has given up (timeout) is absorbed by the sink as a no-op.
pub trait Transport: Send + Sync + 'static {
    fn dispatch(&self, request: TransportRequest, sink: ResponseSink);
}

/// Production transport over plain HTTP GET.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn dispatch(&self, request: TransportRequest, sink: ResponseSink) {
        let http = self.http.clone();
        tokio::spawn(async move {
            let outcome = fetch_json(&http, &request.url).await;
            sink.resolve(request.call_id, outcome);
        });
    }
}

async fn fetch_json(http: &reqwest::Client, url: &str) -> Result<Value, Error> {
    let response = http
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|err| Error::Transport(err.to_string()))?;
    response
        .json::<Value>()
        .await
        .map_err(|err| Error::Transport(format!("malformed response: {err}")))
}
