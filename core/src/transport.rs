//! ureq-backed `Transport`.
//!
//! Status-code-as-error is disabled so 4xx/5xx responses come back as data
//! and the core decides what they mean; only connection and timeout
//! failures become `TransportError`.

use std::time::Duration;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

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
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = req.body.as_ref().map(|b| b.to_bytes());
        let result = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(&req.url), &req.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&req.url), &req.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&req.url), &req.headers);
                match &body {
                    Some(bytes) => builder.send(&bytes[..]),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(&req.url), &req.headers);
                match &body {
                    Some(bytes) => builder.send(&bytes[..]),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError::new(&req, e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(&req, e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connection_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = UreqTransport::new(Duration::from_secs(2));
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/api/fornecedores/"),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(request).unwrap_err();
        assert_eq!(err.method, HttpMethod::Get);
        assert!(err.url.ends_with("/api/fornecedores/"));
    }
}
