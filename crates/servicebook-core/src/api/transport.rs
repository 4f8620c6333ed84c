//! The seam between the API client and the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cookie the backend sets with its CSRF token
const CSRF_COOKIE: &str = "csrftoken";

/// Header the backend expects the CSRF token echoed in
const CSRF_HEADER: &str = "X-CSRFToken";

/// One outbound call: method, path relative to the API base (or an
/// absolute URL), query parameters, optional JSON body, extra headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_pairs<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.query.push((key.into(), value.to_string()));
        }
        self
    }

    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| {
                ApiError::InvalidRequest(format!("Failed to encode request body: {}", e))
            })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Value of a header on this request, if set and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response, whatever the status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
        })
    }

    pub fn into_error(self) -> ApiError {
        ApiError::from_status(self.status, self.body)
    }
}

/// Sends one request and reports what came back.
///
/// Non-2xx statuses are responses, not errors; only a failure to get a
/// response at all is an `Err` (`ApiError::Network`).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport with a cookie jar for the backend's CSRF cookie.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    cookies: Arc<Jar>,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| {
                ApiError::InvalidRequest(format!("Invalid API URL '{}': {}", base_url, e))
            })?;
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_provider(Arc::clone(&cookies))
            .build()?;

        Ok(Self {
            client,
            base_url,
            cookies,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let parsed = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
        } else {
            self.base_url.join(path)
        };
        parsed.map_err(|e| {
            ApiError::InvalidRequest(format!("Invalid request path '{}': {}", path, e))
        })
    }

    fn csrf_token(&self, url: &Url) -> Option<String> {
        let header = self.cookies.cookies(url)?;
        let cookies = header.to_str().ok()?;
        find_cookie(cookies, CSRF_COOKIE).map(str::to_string)
    }
}

/// Value of the cookie `name` in a `Cookie` header value
fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

impl HttpTransport {
    /// Build the outgoing request. Unsafe methods echo the CSRF cookie, if
    /// the jar holds one for the URL.
    fn build(&self, request: &ApiRequest) -> Result<reqwest::Request, ApiError> {
        let url = self.url_for(&request.path)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .header(header::ACCEPT, "application/json")
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !is_safe_method(&request.method) {
            let token = self.csrf_token(&url);
            if let Some(value) = token.and_then(|t| HeaderValue::from_str(&t).ok()) {
                builder = builder.header(CSRF_HEADER, value);
            }
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let outgoing = self.build(request)?;
        let url = outgoing.url().clone();

        let response = self.client.execute(outgoing).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method = %request.method, url = %url, status = %status, "Response received");

        Ok(ApiResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie() {
        assert_eq!(find_cookie("csrftoken=abc123", "csrftoken"), Some("abc123"));
        assert_eq!(
            find_cookie("sessionid=xyz; csrftoken=abc123; theme=dark", "csrftoken"),
            Some("abc123")
        );
        assert_eq!(find_cookie("sessionid=xyz", "csrftoken"), None);
        assert_eq!(find_cookie("", "csrftoken"), None);
        assert_eq!(find_cookie("xcsrftoken=nope", "csrftoken"), None);
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::PATCH));
        assert!(!is_safe_method(&Method::DELETE));
    }

    #[test]
    fn test_url_for_relative_and_absolute_paths() {
        let transport = HttpTransport::new("http://localhost:8000").unwrap();
        assert_eq!(
            transport.url_for("/api/machines/").unwrap().as_str(),
            "http://localhost:8000/api/machines/"
        );
        assert_eq!(
            transport
                .url_for("https://silant.example/api/references/?page=2")
                .unwrap()
                .as_str(),
            "https://silant.example/api/references/?page=2"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_csrf_token_read_from_jar() {
        let transport = HttpTransport::new("http://localhost:8000").unwrap();
        let url = Url::parse("http://localhost:8000/api/maintenance/").unwrap();
        assert_eq!(transport.csrf_token(&url), None);

        transport
            .cookies
            .add_cookie_str("csrftoken=tok42; Path=/", &url);
        assert_eq!(transport.csrf_token(&url).as_deref(), Some("tok42"));
    }

    #[test]
    fn test_csrf_header_only_on_unsafe_methods() {
        let transport = HttpTransport::new("http://localhost:8000").unwrap();
        let url = Url::parse("http://localhost:8000/").unwrap();
        transport
            .cookies
            .add_cookie_str("csrftoken=tok42; Path=/", &url);

        let body = serde_json::json!({"machine": 1});
        let post = ApiRequest::post("/api/complaints/").json(&body).unwrap();
        let post = transport.build(&post).unwrap();
        assert_eq!(
            post.headers().get(CSRF_HEADER).and_then(|v| v.to_str().ok()),
            Some("tok42")
        );

        let get = transport.build(&ApiRequest::get("/api/complaints/")).unwrap();
        assert!(get.headers().get(CSRF_HEADER).is_none());
        assert_eq!(get.url().as_str(), "http://localhost:8000/api/complaints/");
    }

    #[test]
    fn test_no_csrf_header_without_cookie() {
        let transport = HttpTransport::new("http://localhost:8000").unwrap();
        let post = transport.build(&ApiRequest::post("/api/maintenance/")).unwrap();
        assert!(post.headers().get(CSRF_HEADER).is_none());
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/api/machines/")
            .query("ordering", "-shipment_date")
            .query_opt("model_engine", Some(3))
            .query_opt::<i64>("model_transmission", None);
        assert_eq!(request.query_value("ordering"), Some("-shipment_date"));
        assert_eq!(request.query_value("model_engine"), Some("3"));
        assert_eq!(request.query_value("model_transmission"), None);
        assert!(request.body.is_none());
    }
}
