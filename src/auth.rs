//! Credential injection for the supported auth schemes
//!
//! Injection uses overwrite semantics, so it must run after user headers and
//! params are in place: an auth value always wins over a same-named user value.

use base64::Engine;

use crate::models::{ApiKeyLocation, AuthConfig};
use crate::network::params::{HeaderSet, QuerySet};

pub const AUTHORIZATION: &str = "Authorization";

/// Apply `auth` to the header and query sets. Every credential field goes
/// through `substitute` first; an empty result skips injection.
pub fn apply_auth<F>(
    auth: Option<&AuthConfig>,
    headers: &mut HeaderSet,
    query: &mut QuerySet,
    substitute: F,
) where
    F: Fn(&str) -> String,
{
    let Some(auth) = auth else {
        return;
    };

    match auth {
        AuthConfig::None => {}
        AuthConfig::Bearer { token } => {
            let token = substitute(token);
            if !token.is_empty() {
                headers.set(AUTHORIZATION, format!("Bearer {}", token));
            }
        }
        AuthConfig::Basic { username, password } => {
            let username = substitute(username);
            let password = substitute(password);
            if !username.is_empty() && !password.is_empty() {
                let credentials = format!("{}:{}", username, password);
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
                headers.set(AUTHORIZATION, format!("Basic {}", encoded));
            }
        }
        AuthConfig::ApiKey { key, value, add_to } => {
            let key = substitute(key);
            let value = substitute(value);
            if key.is_empty() || value.is_empty() {
                return;
            }
            match add_to {
                ApiKeyLocation::Header => headers.set(key, value),
                ApiKeyLocation::Query => query.set(key, value),
            }
        }
        // No token flow; a pasted access token is sent as a bearer token verbatim
        AuthConfig::OAuth2 { access_token } => {
            if let Some(token) = access_token.as_deref().filter(|t| !t.is_empty()) {
                headers.set(AUTHORIZATION, format!("Bearer {}", token));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyValuePair;
    use crate::variables::{substitute, substituter};

    fn apply(auth: &AuthConfig) -> (HeaderSet, QuerySet) {
        let mut headers = HeaderSet::new();
        let mut query = QuerySet::new();
        apply_auth(Some(auth), &mut headers, &mut query, substituter(None));
        (headers, query)
    }

    #[test]
    fn test_bearer_sets_exact_header() {
        let (headers, query) = apply(&AuthConfig::Bearer {
            token: "tok".into(),
        });
        assert_eq!(headers.get("Authorization"), Some("Bearer tok"));
        assert!(query.is_empty());
    }

    #[test]
    fn test_bearer_overwrites_user_header() {
        let mut headers = HeaderSet::new();
        headers.append("authorization", "mine");
        let mut query = QuerySet::new();
        let auth = AuthConfig::Bearer { token: "t".into() };
        apply_auth(Some(&auth), &mut headers, &mut query, substituter(None));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Authorization"), Some("Bearer t"));
    }

    #[test]
    fn test_bearer_token_is_substituted() {
        let vars = vec![KeyValuePair::new("token", "abc")];
        let mut headers = HeaderSet::new();
        let mut query = QuerySet::new();
        let auth = AuthConfig::Bearer {
            token: "{{token}}".into(),
        };
        apply_auth(Some(&auth), &mut headers, &mut query, |t| substitute(t, &vars));
        assert_eq!(headers.get("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_empty_bearer_is_skipped() {
        let (headers, _) = apply(&AuthConfig::Bearer {
            token: String::new(),
        });
        assert!(headers.is_empty());
    }

    #[test]
    fn test_basic_encodes_credentials() {
        let (headers, _) = apply(&AuthConfig::Basic {
            username: "user".into(),
            password: "pass".into(),
        });
        assert_eq!(headers.get("Authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn test_basic_requires_both_fields() {
        let (headers, _) = apply(&AuthConfig::Basic {
            username: "user".into(),
            password: String::new(),
        });
        assert!(headers.is_empty());
    }

    #[test]
    fn test_api_key_query_never_touches_headers() {
        let (headers, query) = apply(&AuthConfig::ApiKey {
            key: "api_key".into(),
            value: "k1".into(),
            add_to: ApiKeyLocation::Query,
        });
        assert!(headers.is_empty());
        assert_eq!(query.get("api_key"), Some("k1"));
    }

    #[test]
    fn test_api_key_header() {
        let (headers, query) = apply(&AuthConfig::ApiKey {
            key: "X-Api-Key".into(),
            value: "k1".into(),
            add_to: ApiKeyLocation::Header,
        });
        assert_eq!(headers.get("x-api-key"), Some("k1"));
        assert!(query.is_empty());
    }

    #[test]
    fn test_oauth2_behaves_as_bearer() {
        let (headers, _) = apply(&AuthConfig::OAuth2 {
            access_token: Some("at".into()),
        });
        assert_eq!(headers.get("Authorization"), Some("Bearer at"));

        let (headers, _) = apply(&AuthConfig::OAuth2 { access_token: None });
        assert!(headers.is_empty());
    }

    #[test]
    fn test_none_and_absent_are_noops() {
        let (headers, query) = apply(&AuthConfig::None);
        assert!(headers.is_empty() && query.is_empty());

        let mut headers = HeaderSet::new();
        let mut query = QuerySet::new();
        apply_auth(None, &mut headers, &mut query, substituter(None));
        assert!(headers.is_empty() && query.is_empty());
    }
}
