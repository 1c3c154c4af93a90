//! Staged assembly of a transport-ready request
//!
//! Stages run in a fixed order: URL, query params, headers, auth, body.
//! Auth comes after user params and headers so its overwrite wins.

use url::Url;

use crate::auth::apply_auth;
use crate::errors::BuildError;
use crate::models::{BodyType, Environment, HttpMethod, KeyValuePair, RequestDefinition};
use crate::network::params::{HeaderSet, QuerySet};
use crate::validation::{sanitize_url, validate_url};
use crate::variables::substituter;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully resolved request, ready for the transport
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltRequest {
    pub id: String,
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderSet,
    pub body: Option<String>,
}

/// Builder value threaded through the stages
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    definition: &'a RequestDefinition,
    variables: Option<&'a [KeyValuePair]>,
    url: Url,
    query: QuerySet,
    headers: HeaderSet,
    body: Option<String>,
}

impl<'a> RequestBuilder<'a> {
    /// Resolve the URL template. Fails when the substituted, sanitized URL is
    /// not an absolute http(s) URL.
    pub fn new(
        definition: &'a RequestDefinition,
        variables: Option<&'a [KeyValuePair]>,
    ) -> Result<Self, BuildError> {
        let cleaned = sanitize_url(&substituter(variables)(&definition.url));
        let url = validate_url(&cleaned)?;
        Ok(RequestBuilder {
            definition,
            variables,
            url,
            query: QuerySet::new(),
            headers: HeaderSet::new(),
            body: None,
        })
    }

    fn substitute(&self, text: &str) -> String {
        substituter(self.variables)(text)
    }

    /// Append every active query param, key and value substituted independently
    pub fn with_query_params(mut self) -> Self {
        for param in self.definition.query_params.iter().filter(|p| p.is_active()) {
            let key = self.substitute(&param.key);
            let value = self.substitute(&param.value);
            self.query.append(key, value);
        }
        self
    }

    /// Add every active header after substitution and sanitization
    pub fn with_headers(mut self) -> Self {
        for header in self.definition.headers.iter().filter(|h| h.is_active()) {
            let key = sanitize_header_name(&self.substitute(&header.key));
            if key.is_empty() {
                tracing::debug!(id = %self.definition.id, "Skipping header with no usable name");
                continue;
            }
            let value = sanitize_header_value(&self.substitute(&header.value));
            self.headers.append(key, value);
        }
        self
    }

    /// Inject credentials, overwriting same-named headers or params
    pub fn with_auth(mut self) -> Self {
        apply_auth(
            self.definition.auth.as_ref(),
            &mut self.headers,
            &mut self.query,
            substituter(self.variables),
        );
        self
    }

    /// Encode the payload. GET and HEAD never carry one.
    pub fn with_body(mut self) -> Result<Self, BuildError> {
        let definition = self.definition;
        if !definition.method.has_body() || definition.body.trim().is_empty() {
            return Ok(self);
        }

        match definition.body_type {
            BodyType::None => {}
            BodyType::Json => {
                self.body = Some(self.substitute(&definition.body));
                if !self.headers.contains(CONTENT_TYPE) {
                    self.headers.set(CONTENT_TYPE, JSON_CONTENT_TYPE);
                }
            }
            BodyType::FormUrlencoded => {
                let resolved = self.substitute(&definition.body);
                self.body = Some(encode_form_body(&resolved)?);
                if !self.headers.contains(CONTENT_TYPE) {
                    self.headers.set(CONTENT_TYPE, FORM_CONTENT_TYPE);
                }
            }
        }
        Ok(self)
    }

    pub fn finish(self) -> BuiltRequest {
        let mut url = self.url;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        BuiltRequest {
            id: self.definition.id.clone(),
            method: self.definition.method,
            url,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// Run every stage against the active environment's variables
pub fn build_request(
    definition: &RequestDefinition,
    environment: Option<&Environment>,
) -> Result<BuiltRequest, BuildError> {
    let variables = environment.map(|env| env.variables.as_slice());
    let built = RequestBuilder::new(definition, variables)?
        .with_query_params()
        .with_headers()
        .with_auth()
        .with_body()?
        .finish();
    Ok(built)
}

/// Keep only `[A-Za-z0-9_-]`
pub fn sanitize_header_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Drop CR, LF and NUL so a value can not inject extra header lines
pub fn sanitize_header_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\0'))
        .collect()
}

/// Re-encode a flat JSON object as `application/x-www-form-urlencoded`
pub fn encode_form_body(body: &str) -> Result<String, BuildError> {
    let parsed: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| BuildError::InvalidBody(format!("form body is not valid JSON: {}", e)))?;

    let object = parsed
        .as_object()
        .ok_or_else(|| BuildError::InvalidBody("form body must be a JSON object".to_string()))?;

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in object {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => value.to_string(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(BuildError::InvalidBody(format!(
                    "form field '{}' is not a flat value",
                    key
                )));
            }
        };
        serializer.append_pair(key, &text);
    }
    Ok(serializer.finish())
}
