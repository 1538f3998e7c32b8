//! JSON-RPC 2.0 over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::config::validate_url;
use crate::RpcError;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// HTTP transport shared by the namespace clients.
#[derive(Debug)]
pub struct RpcTransport {
    client: Client,
    url: String,
    token: Option<String>,
    request_id: AtomicU64,
}

impl RpcTransport {
    /// Create a transport for `url`, optionally authenticating with a bearer token.
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let url = url.into();
        validate_url(&url)?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(RpcError::Http)?;

        Ok(Self {
            client,
            url,
            token,
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this transport posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the next request ID.
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Make a JSON-RPC call.
    ///
    /// A `null` result is handed to `R`'s deserializer, so `Option<T>` results
    /// decode to `None`; a response with neither `result` nor `error` is
    /// [`RpcError::MissingResult`].
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        let id = self.next_id();
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        tracing::trace!(method, id, url = %self.url, "RPC request");

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                RpcError::Connection(format!("Cannot connect to {}", self.url))
            } else {
                RpcError::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(RpcError::Http)?;

        let mut object = match serde_json::from_slice::<serde_json::Map<String, Value>>(&body) {
            Ok(object) => object,
            Err(e) if status.is_success() => {
                return Err(RpcError::Parse(format!("{method}: {e}")));
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&body);
                return Err(RpcError::Parse(format!(
                    "{method}: HTTP {status}: {}",
                    text.trim()
                )));
            }
        };

        if let Some(error) = object.remove("error").filter(|e| !e.is_null()) {
            let error: JsonRpcErrorObject = serde_json::from_value(error)
                .map_err(|e| RpcError::Parse(format!("{method}: malformed error: {e}")))?;
            tracing::debug!(method, id, code = error.code, "RPC error response");
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = object
            .remove("result")
            .ok_or_else(|| RpcError::MissingResult(method.to_string()))?;

        serde_json::from_value(result).map_err(|e| RpcError::Parse(format!("{method}: {e}")))
    }
}
