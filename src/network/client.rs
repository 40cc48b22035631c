//! HTTP client wrapper - executes resolved requests and captures responses

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use base64::Engine;

use super::Transport;
use crate::error::TransportError;
use crate::models::{HttpMethod, ResolvedRequest, ResponseData};

/// `reqwest`-backed transport
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client, timeout })
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

/// Build a request from an already-resolved template
fn build_request(client: &reqwest::Client, request: &ResolvedRequest) -> reqwest::RequestBuilder {
    let mut req_builder = client.request(to_reqwest_method(request.method), &request.url);

    if !request.params.is_empty() {
        req_builder = req_builder.query(&request.params);
    }

    for (key, value) in &request.headers {
        req_builder = req_builder.header(key, value);
    }

    // Credentials only go out when a username is set
    if let Some(auth) = request.auth.as_ref().filter(|a| !a.username.is_empty()) {
        let credentials = format!("{}:{}", auth.username, auth.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        req_builder = req_builder.header("Authorization", format!("Basic {}", encoded));
    }

    if !request.body.is_empty() {
        req_builder = req_builder.body(request.body.clone());
    }

    req_builder
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ResolvedRequest) -> Result<ResponseData, TransportError> {
        let start = Instant::now();
        let resp = build_request(&self.client, request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status().as_u16();
        let headers = collect_headers(resp.headers());
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(ResponseData::new(status, headers, body, elapsed_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BasicAuth;

    fn resolved(method: HttpMethod) -> ResolvedRequest {
        let mut params = BTreeMap::new();
        params.insert("page".to_string(), "2".to_string());
        let mut headers = BTreeMap::new();
        headers.insert("X-Trace".to_string(), "abc".to_string());
        ResolvedRequest {
            method,
            url: "https://api.example.com/users".to_string(),
            headers,
            params,
            body: r#"{"a":1}"#.to_string(),
            auth: Some(BasicAuth::new("user", "pass")),
        }
    }

    #[test]
    fn test_build_request_applies_every_field() {
        let client = reqwest::Client::new();
        let built = build_request(&client, &resolved(HttpMethod::PATCH)).build().unwrap();

        assert_eq!(built.method(), &reqwest::Method::PATCH);
        assert_eq!(built.url().as_str(), "https://api.example.com/users?page=2");
        assert_eq!(built.headers()["x-trace"], "abc");
        assert_eq!(built.headers()["authorization"], "Basic dXNlcjpwYXNz");
        assert_eq!(built.body().and_then(|b| b.as_bytes()), Some(&br#"{"a":1}"#[..]));
    }

    #[test]
    fn test_empty_username_sends_no_credentials() {
        let client = reqwest::Client::new();
        let mut request = resolved(HttpMethod::GET);
        request.auth = Some(BasicAuth::new("", "pass"));
        let built = build_request(&client, &request).build().unwrap();
        assert!(built.headers().get("authorization").is_none());
    }

    #[test]
    fn test_duplicate_headers_are_joined() {
        let mut map = reqwest::header::HeaderMap::new();
        map.append("set-cookie", "a=1".parse().unwrap());
        map.append("set-cookie", "b=2".parse().unwrap());
        let headers = collect_headers(&map);
        assert_eq!(headers["set-cookie"], "a=1, b=2");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let mut request = resolved(HttpMethod::GET);
        request.url = "http://127.0.0.1:1/".to_string();
        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Connect(_) | TransportError::Request(_) | TransportError::Timeout(_)
        ));
    }
}
