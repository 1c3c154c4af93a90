//! URL sanitization and validation
//!
//! `validate_url_advanced` classifies raw user input for display, with a
//! correction hint where one is obvious. `validate_url` is the strict check the
//! builder applies before anything is dispatched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::errors::BuildError;

static BARE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-]*(\.[a-zA-Z0-9\-]+)*\.[a-zA-Z]{2,}(:\d+)?(/.*)?$")
        .expect("valid regex")
});

static LOCAL_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(localhost|127\.0\.0\.1)(:\d+)?(/.*)?$").expect("valid regex")
});

static SCRIPT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<script\b[^>]*>").expect("valid regex")
});

static BAD_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:|vbscript:|data:text/html").expect("valid regex"));

/// Inline DOM event handler such as `onload=`, at the start of an attribute or query key.
/// Group 1 is the delimiter in front of it.
static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(^|[\s"'/<?&;])on(load|unload|beforeunload|error|abort|click|dblclick|contextmenu|mouse[a-z]*|pointer[a-z]*|touch[a-z]*|drag[a-z]*|key(down|up|press)|focus|focusin|focusout|blur|change|input|submit|reset|select|scroll|wheel|resize|copy|cut|paste|hashchange|message|toggle|show|animation[a-z]*|transition[a-z]*|play|pause|begin|end)\s*="#,
    )
    .expect("valid regex")
});

static EMBED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*(iframe|embed|object)\b").expect("valid regex"));

/// Outcome class of a URL check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlState {
    Empty,
    Valid,
    Warning,
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlValidation {
    pub is_valid: bool,
    pub state: UrlState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl UrlValidation {
    fn new(state: UrlState, message: impl Into<String>) -> Self {
        UrlValidation {
            is_valid: matches!(state, UrlState::Valid | UrlState::Warning),
            state,
            message: message.into(),
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

/// Classify a raw URL; checks run in priority order and the first match wins
pub fn validate_url_advanced(raw: &str) -> UrlValidation {
    let input = raw.trim();

    if input.is_empty() {
        return UrlValidation::new(UrlState::Empty, "URL is required");
    }

    let has_scheme = input.starts_with("http://") || input.starts_with("https://");

    if !has_scheme && BARE_DOMAIN.is_match(input) {
        return UrlValidation::new(UrlState::Invalid, "URL must start with http:// or https://")
            .suggest(format!("https://{}", input));
    }

    if !has_scheme && LOCAL_HOST.is_match(input) {
        return UrlValidation::new(UrlState::Invalid, "URL must start with http:// or https://")
            .suggest(format!("http://{}", input));
    }

    let parsed = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            let result = UrlValidation::new(UrlState::Invalid, format!("Invalid URL format: {}", e));
            if input.contains('.') && !input.contains("://") {
                return result.suggest(format!("https://{}", input));
            }
            return result;
        }
    };

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return UrlValidation::new(
            UrlState::Invalid,
            format!("Unsupported protocol: {}. Only HTTP and HTTPS are allowed", scheme),
        );
    }

    if is_suspicious(input) {
        return UrlValidation::new(UrlState::Invalid, "URL contains potentially unsafe content");
    }

    if matches!(parsed.host_str(), Some("localhost") | Some("127.0.0.1")) {
        return UrlValidation::new(UrlState::Warning, "Local development URL");
    }

    UrlValidation::new(UrlState::Valid, "Valid URL")
}

/// True when the text carries script-like content
pub fn is_suspicious(text: &str) -> bool {
    SCRIPT_TAG.is_match(text)
        || BAD_SCHEME.is_match(text)
        || EVENT_HANDLER.is_match(text)
        || EMBED_TAG.is_match(text)
}

/// Strip script tags, script-capable schemes and inline event handlers.
///
/// This does not make a URL safe by itself; it still has to pass validation.
pub fn sanitize_url(raw: &str) -> String {
    let cleaned = SCRIPT_TAG.replace_all(raw.trim(), "");
    let cleaned = BAD_SCHEME.replace_all(&cleaned, "");
    let cleaned = EVENT_HANDLER.replace_all(&cleaned, "${1}");
    cleaned.trim().to_string()
}

/// Strict check used before dispatch: an absolute http(s) URL with a host
pub fn validate_url(raw: &str) -> Result<Url, BuildError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| BuildError::InvalidUrl(format!("{} ({})", raw, e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err(BuildError::InvalidUrl(format!("{} has no host", raw))),
        other => Err(BuildError::InvalidUrl(format!(
            "unsupported protocol {} in {}",
            other, raw
        ))),
    }
}
