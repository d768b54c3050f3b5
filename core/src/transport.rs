//! Executing `HttpRequest` values.
//!
//! # Design
//! `Transport` is the seam between the deterministic client and the network.
//! `UreqTransport` (behind the default `ureq` feature) builds a fresh agent
//! with idle pooling disabled for every request, so each call opens its own
//! connection and the connection is closed when the response is dropped, on
//! success and error paths alike. Redirects are not followed: a 3xx status
//! is handed to the classifier like any other code.

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP request and returns its status and body.
///
/// Non-2xx statuses are data, not errors; only failures to complete the
/// round-trip are returned as `Err`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use std::time::Duration;

    use tracing::debug;

    use super::Transport;
    use crate::error::Result;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by `ureq`.
    #[derive(Debug, Clone, Default)]
    pub struct UreqTransport {
        timeout: Option<Duration>,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Bound the whole round-trip by `timeout`.
        pub fn with_timeout(timeout: Duration) -> Self {
            UreqTransport {
                timeout: Some(timeout),
            }
        }

        fn agent(&self) -> ureq::Agent {
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .max_redirects(0)
                .max_idle_connections(0)
                .max_idle_connections_per_host(0)
                .timeout_global(self.timeout)
                .build()
                .new_agent()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            let url = request.url();
            debug!(method = %request.method, %url, "sending Carrot request");

            let agent = self.agent();
            let body = request.body.unwrap_or_default();
            let mut response = match request.method {
                HttpMethod::Post => {
                    let mut builder = agent.post(url.as_str());
                    for (key, value) in &request.headers {
                        builder = builder.header(key.as_str(), value.as_str());
                    }
                    builder.send(body.as_bytes())?
                }
                HttpMethod::Get => {
                    let mut builder = agent.get(url.as_str());
                    for (key, value) in &request.headers {
                        builder = builder.header(key.as_str(), value.as_str());
                    }
                    builder.force_send_body().send(body.as_bytes())?
                }
            };

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();
            // Error pages are not always UTF-8; they still have to reach the classifier.
            let bytes = response.body_mut().read_to_vec()?;
            let body = String::from_utf8_lossy(&bytes).into_owned();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
