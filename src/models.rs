use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::TransportErrorKind;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    pub fn parse(s: &str) -> Option<HttpMethod> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "PATCH" => Some(HttpMethod::PATCH),
            "DELETE" => Some(HttpMethod::DELETE),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    /// GET and HEAD never carry a payload
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::GET | HttpMethod::HEAD)
    }
}

/// How the request body text is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BodyType {
    #[default]
    None,
    Json,
    FormUrlencoded,
}

/// A key/value row used for query params, headers and environment variables
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub id: String,
    pub key: String,
    pub value: String,
    pub enabled: bool,
    /// Masking hint for editors; has no effect on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValuePair {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.into(),
            value: value.into(),
            enabled: true,
            secret: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Only enabled rows with a key take part in a request
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty()
    }
}

/// Where an API key is injected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

/// Discriminant of [`AuthConfig`], used when switching auth type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthKind {
    None,
    Bearer,
    Basic,
    ApiKey,
    OAuth2,
}

/// Authentication configuration. Exactly one variant's payload exists at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum AuthConfig {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "bearer")]
    Bearer { token: String },
    #[serde(rename = "basic")]
    Basic { username: String, password: String },
    #[serde(rename = "api-key", rename_all = "camelCase")]
    ApiKey {
        key: String,
        value: String,
        add_to: ApiKeyLocation,
    },
    #[serde(rename = "oauth2", rename_all = "camelCase")]
    OAuth2 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        access_token: Option<String>,
    },
}

impl AuthConfig {
    /// A fresh, empty configuration of the given kind
    pub fn empty(kind: AuthKind) -> Self {
        match kind {
            AuthKind::None => AuthConfig::None,
            AuthKind::Bearer => AuthConfig::Bearer {
                token: String::new(),
            },
            AuthKind::Basic => AuthConfig::Basic {
                username: String::new(),
                password: String::new(),
            },
            AuthKind::ApiKey => AuthConfig::ApiKey {
                key: String::new(),
                value: String::new(),
                add_to: ApiKeyLocation::Header,
            },
            AuthKind::OAuth2 => AuthConfig::OAuth2 { access_token: None },
        }
    }

    pub fn kind(&self) -> AuthKind {
        match self {
            AuthConfig::None => AuthKind::None,
            AuthConfig::Bearer { .. } => AuthKind::Bearer,
            AuthConfig::Basic { .. } => AuthKind::Basic,
            AuthConfig::ApiKey { .. } => AuthKind::ApiKey,
            AuthConfig::OAuth2 { .. } => AuthKind::OAuth2,
        }
    }
}

/// A user-authored request, before variable substitution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefinition {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub query_params: Vec<KeyValuePair>,
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

impl RequestDefinition {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        RequestDefinition {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Switch auth type; the previous variant's credentials are dropped
    pub fn switch_auth(&mut self, kind: AuthKind) {
        if self.auth.as_ref().map(AuthConfig::kind) != Some(kind) {
            self.auth = Some(AuthConfig::empty(kind));
        }
    }
}

impl Default for RequestDefinition {
    fn default() -> Self {
        RequestDefinition {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::from("New Request"),
            method: HttpMethod::GET,
            url: String::new(),
            query_params: Vec::new(),
            headers: Vec::new(),
            body: String::new(),
            body_type: BodyType::None,
            auth: None,
        }
    }
}

/// A collection of requests
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub requests: Vec<RequestDefinition>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            requests: Vec::new(),
        }
    }
}

/// Named set of variables substitutable into requests
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub variables: Vec<KeyValuePair>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Environment {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// Sets a variable, replacing the first row with the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.variables.iter_mut().find(|v| v.key == key) {
            Some(existing) => existing.value = value,
            None => self.variables.push(KeyValuePair::new(key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.is_active() && v.key == key)
            .map(|v| v.value.as_str())
    }

    /// Substitutes {{variable}} patterns in text
    pub fn substitute(&self, text: &str) -> String {
        crate::variables::substitute(text, &self.variables)
    }
}

/// Normalized outcome of a send, success or failure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// 0 when nothing was received from the server
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON when the body parses, the raw text otherwise
    pub data: serde_json::Value,
    pub time_ms: u64,
    /// Byte length of the decoded body text
    pub size: usize,
    pub raw_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TransportErrorKind>,
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// History entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestHistoryItem {
    pub id: String,
    pub request: RequestDefinition,
    pub response: ApiResponse,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl RequestHistoryItem {
    pub fn new(request: RequestDefinition, response: ApiResponse) -> Self {
        RequestHistoryItem {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            response,
            timestamp: chrono::Utc::now(),
        }
    }
}
