//! Executes `HttpRequest`s against the network.
//!
//! # Design
//! `Transport::send` never fails. Network-level failures become synthetic
//! responses (502 for refused connections, 504 for timeouts, 400 for
//! requests that could not be put on the wire, 500 otherwise) with a small
//! JSON diagnostic body, so callers interpret every outcome through the
//! same status check. Exactly one attempt is made per call.

use std::io::ErrorKind;
use std::time::Duration;

use serde_json::json;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const BAD_REQUEST: u16 = 400;
pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const BAD_GATEWAY: u16 = 502;
pub const GATEWAY_TIMEOUT: u16 = 504;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Performs one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> HttpResponse;
}

/// Blocking `Transport` backed by a shared `ureq::Agent`.
///
/// Status codes are returned as data rather than errors, and redirects are
/// followed by ureq's defaults.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let headers = request.effective_headers();
        let url = request.url.as_str();

        let mut response = match request.method {
            HttpMethod::Get => prepare(self.agent.get(url), request, &headers).call(),
            HttpMethod::Head => prepare(self.agent.head(url), request, &headers).call(),
            HttpMethod::Options => prepare(self.agent.options(url), request, &headers).call(),
            HttpMethod::Delete => prepare(self.agent.delete(url), request, &headers).call(),
            HttpMethod::Post => send_with_body(prepare(self.agent.post(url), request, &headers), request),
            HttpMethod::Put => send_with_body(prepare(self.agent.put(url), request, &headers), request),
            HttpMethod::Patch => send_with_body(prepare(self.agent.patch(url), request, &headers), request),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = if request.method == HttpMethod::Head {
            String::new()
        } else {
            response.body_mut().read_to_string()?
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> HttpResponse {
        match self.dispatch(request) {
            Ok(response) => {
                tracing::debug!(
                    method = request.method.as_str(),
                    url = %request.url,
                    status = response.status,
                    "dodois request completed"
                );
                response
            }
            Err(err) => {
                let response = failure_response(&err);
                tracing::warn!(
                    method = request.method.as_str(),
                    url = %request.url,
                    status = response.status,
                    error = %err,
                    "dodois request failed before a response was received"
                );
                response
            }
        }
    }
}

fn prepare<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Status code a transport failure is reported as.
pub fn failure_status(err: &ureq::Error) -> u16 {
    match err {
        ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => BAD_GATEWAY,
        ureq::Error::Timeout(_) => GATEWAY_TIMEOUT,
        ureq::Error::Io(io) => match io.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable => BAD_GATEWAY,
            ErrorKind::TimedOut | ErrorKind::WouldBlock => GATEWAY_TIMEOUT,
            _ => INTERNAL_SERVER_ERROR,
        },
        ureq::Error::BadUri(_) | ureq::Error::Http(_) | ureq::Error::Protocol(_) => BAD_REQUEST,
        _ => INTERNAL_SERVER_ERROR,
    }
}

/// Synthetic response standing in for a failed exchange.
pub fn failure_response(err: &ureq::Error) -> HttpResponse {
    let status = failure_status(err);
    let message = match status {
        BAD_GATEWAY => "connection could not be established",
        GATEWAY_TIMEOUT => "timed out waiting for the connection",
        BAD_REQUEST => "request could not be sent",
        _ => "request processing failed",
    };
    HttpResponse {
        status,
        headers: Vec::new(),
        body: json!({ "error": message, "detail": err.to_string() }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn connection_failures_map_to_502() {
        assert_eq!(failure_status(&ureq::Error::ConnectionFailed), BAD_GATEWAY);
        assert_eq!(failure_status(&ureq::Error::HostNotFound), BAD_GATEWAY);
        let refused = ureq::Error::Io(io::Error::from(ErrorKind::ConnectionRefused));
        assert_eq!(failure_status(&refused), BAD_GATEWAY);
    }

    #[test]
    fn timeouts_map_to_504() {
        assert_eq!(
            failure_status(&ureq::Error::Timeout(ureq::Timeout::Global)),
            GATEWAY_TIMEOUT
        );
        let timed_out = ureq::Error::Io(io::Error::from(ErrorKind::TimedOut));
        assert_eq!(failure_status(&timed_out), GATEWAY_TIMEOUT);
    }

    #[test]
    fn malformed_requests_map_to_400() {
        assert_eq!(failure_status(&ureq::Error::BadUri("::".to_string())), BAD_REQUEST);
    }

    #[test]
    fn anything_else_maps_to_500() {
        let other = ureq::Error::Io(io::Error::new(ErrorKind::Other, "boom"));
        assert_eq!(failure_status(&other), INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn failure_body_is_json_diagnostic() {
        let response = failure_response(&ureq::Error::ConnectionFailed);
        assert_eq!(response.status, BAD_GATEWAY);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], "connection could not be established");
        assert!(body["detail"].is_string());
    }
}
