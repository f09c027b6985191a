//! HTTP collaborator.
//!
//! The client never looks past the status code and body of a reply, so the
//! transport is a narrow trait: take an [`ApiRequest`], return a [`Reply`].
//! [`HttpTransport`] is the production implementation over a blocking
//! `reqwest` client; tests plug in scripted transports.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use sad_config::ServerConfig;
use serde::de::DeserializeOwned;

use crate::classify::Operation;
use crate::error::ClientError;

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file uploaded as one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: &'static str,
    pub bytes: Vec<u8>,
}

/// One request to the service, before the host is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub operation: Operation,
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub form: Vec<(&'static str, String)>,
    pub file: Option<FilePart>,
}

impl ApiRequest {
    /// Start a request for `operation` using its endpoint's method and path.
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            method: operation.method(),
            path: operation.path(),
            query: Vec::new(),
            form: Vec::new(),
            file: None,
        }
    }

    #[must_use]
    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    #[must_use]
    pub fn form(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.form.push((key, value.into()));
        self
    }

    #[must_use]
    pub fn file(mut self, field: &'static str, bytes: Vec<u8>) -> Self {
        self.file = Some(FilePart { field, bytes });
        self
    }

    /// Full URL with every query value percent-encoded.
    #[must_use]
    pub fn url(&self, host: &str) -> String {
        let mut url = format!("{host}{}", self.path);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&encode_pairs(&self.query));
        }
        url
    }

    /// Form fields as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn form_body(&self) -> String {
        encode_pairs(&self.form)
    }

    /// Value of a query parameter, if present.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        lookup(&self.query, key)
    }

    /// Value of a form field, if present.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<&str> {
        lookup(&self.form, key)
    }
}

fn lookup<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}

fn encode_pairs(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A completed HTTP exchange: status code and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: u16,
    body: Vec<u8>,
}

impl Reply {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, lossily decoded.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedPayload`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self, operation: Operation) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::MalformedPayload {
            operation,
            reason: e.to_string(),
        })
    }

    /// Decode the body as a decimal unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedPayload`] if the body is not a number.
    pub fn integer(&self, operation: Operation) -> Result<u64, ClientError> {
        let text = self.text();
        text.trim()
            .parse()
            .map_err(|e| ClientError::MalformedPayload {
                operation,
                reason: format!("expected an integer, got {:?}: {e}", text.as_ref()),
            })
    }
}

/// Performs one HTTP exchange.
pub trait Transport: Send + Sync {
    /// Send `request` to `host` and return the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when no reply was received. A reply
    /// with any status code, including 4xx/5xx, is `Ok`.
    fn perform(&self, host: &str, request: ApiRequest) -> Result<Reply, ClientError>;
}

/// Blocking `reqwest` transport.
///
/// Keeps a cookie store: the service tracks authentication by session cookie.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a transport using the timeout and user agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the underlying client fails to build.
    pub fn new(config: &ServerConfig) -> Result<Self, ClientError> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn perform(&self, host: &str, request: ApiRequest) -> Result<Reply, ClientError> {
        let url = request.url(host);
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Delete => self.http.delete(&url),
        };

        if let Some(file) = request.file {
            let mut form = Form::new();
            for (key, value) in request.form {
                form = form.text(key, value);
            }
            form = form.part(file.field, Part::bytes(file.bytes).file_name(file.field));
            builder = builder.multipart(form);
        } else if !request.form.is_empty() {
            let body = encode_pairs(&request.form);
            builder = builder
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(body);
        }

        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let body = resp.bytes()?;
        Ok(Reply::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_encodes_every_reserved_character() {
        let request = ApiRequest::new(Operation::GetProfile)
            .query("name", "a/b c&d")
            .query("profile_name", "x=y?#%");
        assert_eq!(
            request.url("https://sad.example.org"),
            "https://sad.example.org/project/profile/get?name=a%2Fb%20c%26d&profile_name=x%3Dy%3F%23%25"
        );
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        let request = ApiRequest::new(Operation::NewAuth);
        assert_eq!(request.url("http://h"), "http://h/auth/new");
    }

    #[test]
    fn form_body_is_urlencoded() {
        let request = ApiRequest::new(Operation::Authenticate)
            .form("id", "12")
            .form("password", "p@ss word");
        assert_eq!(request.form_body(), "id=12&password=p%40ss%20word");
        assert_eq!(request.form_value("password"), Some("p@ss word"));
        assert_eq!(request.form_value("missing"), None);
    }

    #[test]
    fn new_request_takes_endpoint_from_operation() {
        let request = ApiRequest::new(Operation::DeleteProject);
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.path, "/project/delete");
        assert!(request.file.is_none());
    }

    #[test]
    fn reply_integer_trims_whitespace() {
        let reply = Reply::new(200, "1024\n");
        assert_eq!(reply.integer(Operation::WriteProfile).unwrap(), 1024);
    }

    #[test]
    fn reply_integer_rejects_text() {
        let reply = Reply::new(200, "plenty");
        assert!(matches!(
            reply.integer(Operation::WriteProfile),
            Err(ClientError::MalformedPayload {
                operation: Operation::WriteProfile,
                ..
            })
        ));
    }

    #[test]
    fn reply_text_is_lossy() {
        let reply = Reply::new(500, vec![b'o', b'k', 0xff]);
        assert_eq!(reply.text(), "ok\u{fffd}");
    }

    #[test]
    fn http_transport_builds_from_default_config() {
        assert!(HttpTransport::new(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn http_transport_reports_connection_failure() {
        let transport = HttpTransport::new(&ServerConfig {
            timeout_secs: 2,
            ..ServerConfig::default()
        })
        .unwrap();
        let err = transport
            .perform("http://127.0.0.1:1", ApiRequest::new(Operation::NewAuth))
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
