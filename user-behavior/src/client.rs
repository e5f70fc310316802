use crate::body::{byte_body, empty_body, DrainBodyFuture};
use crate::error::{DefinitionError, RequestError};
use crate::stats::{RequestRecord, Recorder};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CONTENT_LENGTH;
use hyper::{HeaderMap, Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pooled connection handle, cheap to clone and shared by every user.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }

    async fn send_recv(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), RequestError> {
        let resp = self.client.request(request).await?;
        let content_length: usize = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|hv| hv.to_str().ok())
            .and_then(|hv| hv.parse().ok())
            .unwrap_or(1024);
        let (parts, body) = resp.into_parts();
        let bytes = DrainBodyFuture::new_trusted_length(body, content_length).await?;
        Ok((parts.status, parts.headers, bytes))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Checks that `host` is an absolute `http://` url and strips any trailing
/// slash so paths can be appended directly.
pub fn normalize_host(host: &str) -> Result<String, DefinitionError> {
    let invalid = |reason: &str| DefinitionError::InvalidHost {
        host: host.to_string(),
        reason: reason.to_string(),
    };
    let uri: Uri = host.parse().map_err(|_| invalid("not a valid uri"))?;
    match uri.scheme_str() {
        Some("http") => {}
        Some(_) => return Err(invalid("only http is supported")),
        None => return Err(invalid("missing scheme")),
    }
    if uri.authority().is_none() {
        return Err(invalid("missing host"));
    }
    if uri.query().is_some() {
        return Err(invalid("must not carry a query"));
    }
    Ok(host.trim_end_matches('/').to_string())
}

/// The client a task receives. Bound to one base target, it reports every
/// request it issues to the harness' [`Recorder`].
#[derive(Clone)]
pub struct UserClient {
    http: HttpClient,
    base: String,
    recorder: Arc<dyn Recorder>,
    timeout: Duration,
}

impl UserClient {
    pub fn new(
        http: HttpClient,
        base: &str,
        recorder: Arc<dyn Recorder>,
        timeout: Duration,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            http,
            base: normalize_host(base)?,
            recorder,
            timeout,
        })
    }

    #[inline]
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[inline]
    #[must_use]
    pub fn recorder(&self) -> &dyn Recorder {
        self.recorder.as_ref()
    }

    pub async fn get(&mut self, path: &str) -> Result<Response, RequestError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: impl Into<Bytes>) -> Result<Response, RequestError> {
        self.request(Method::POST, path, Some(body.into())).await
    }

    /// Non-2xx responses come back as `Ok` but are recorded as failures.
    /// Requests that never produce a response are recorded and returned as
    /// errors. Nothing is retried.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Response, RequestError> {
        let start = Instant::now();
        let result = self.issue(method.clone(), path, body).await;
        let elapsed = start.elapsed();
        let record = match &result {
            Ok(resp) => {
                tracing::debug!(%method, path, status = %resp.status, ?elapsed, "request finished");
                RequestRecord {
                    method,
                    name: path.to_string(),
                    status: Some(resp.status),
                    elapsed,
                    content_length: resp.body.len(),
                    error: (!resp.is_success()).then(|| format!("HTTP {}", resp.status)),
                }
            }
            Err(e) => {
                tracing::debug!(%method, path, error = %e, ?elapsed, "request failed");
                RequestRecord {
                    method,
                    name: path.to_string(),
                    status: None,
                    elapsed,
                    content_length: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        self.recorder.record_request(&record);
        result
    }

    async fn issue(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Response, RequestError> {
        let uri = self.uri_for(path)?;
        let body = body.map_or_else(empty_body, byte_body);
        let request = Request::builder().method(method).uri(uri).body(body)?;
        let (status, headers, body) = tokio::time::timeout(self.timeout, self.http.send_recv(request))
            .await
            .map_err(|_| RequestError::Timeout(self.timeout))??;
        Ok(Response {
            status,
            headers,
            body,
        })
    }

    fn uri_for(&self, path: &str) -> Result<Uri, RequestError> {
        let uri = if path.starts_with('/') {
            format!("{}{path}", self.base)
        } else {
            format!("{}/{path}", self.base)
        };
        uri.parse().map_err(|source| RequestError::InvalidUri { uri, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RequestStats;

    fn client(base: &str) -> UserClient {
        UserClient::new(
            HttpClient::new(),
            base,
            Arc::new(RequestStats::new()),
            DEFAULT_REQUEST_TIMEOUT,
        )
        .unwrap()
    }

    #[test]
    fn host_must_be_absolute_http() {
        assert_eq!(normalize_host("http://localhost:8089/").unwrap(), "http://localhost:8089");
        assert!(normalize_host("localhost:8089").is_err());
        assert!(normalize_host("https://example.com").is_err());
        assert!(normalize_host("/just/a/path").is_err());
        assert!(normalize_host("http://example.com/?a=b").is_err());
    }

    #[test]
    fn joins_paths_onto_base() {
        let c = client("http://127.0.0.1:8080/");
        assert_eq!(c.uri_for("/").unwrap().to_string(), "http://127.0.0.1:8080/");
        assert_eq!(c.uri_for("count").unwrap().to_string(), "http://127.0.0.1:8080/count");

        let c = client("http://127.0.0.1:8080/api");
        assert_eq!(c.uri_for("/items").unwrap().to_string(), "http://127.0.0.1:8080/api/items");
    }

    #[test]
    fn rejects_unparseable_paths() {
        let c = client("http://127.0.0.1:8080");
        assert!(matches!(c.uri_for("/has space"), Err(RequestError::InvalidUri { .. })));
    }
}
