use crate::models::{AuthConfig, BodyType, HttpMethod, KeyValuePair, RequestDefinition};
use crate::network::builder::BuiltRequest;
use anyhow::{anyhow, Result};

/// Parse a cURL command into a RequestDefinition
pub fn parse_curl(input: &str) -> Result<RequestDefinition> {
    let mut request = RequestDefinition::default();
    let mut method: Option<HttpMethod> = None;

    // Remove line continuations and normalize
    let normalized = input.replace("\\\r\n", " ").replace("\\\n", " ");

    let mut tokens = tokenize(&normalized)?;

    // Skip 'curl' command if present
    if tokens.first().map(|s| s.as_str()) == Some("curl") {
        tokens.remove(0);
    }

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match token.as_str() {
            "-X" | "--request" => {
                let value = iter.next().ok_or_else(|| anyhow!("{} needs a method", token))?;
                method = Some(
                    HttpMethod::parse(&value)
                        .ok_or_else(|| anyhow!("Unknown HTTP method: {}", value))?,
                );
            }
            "-H" | "--header" => {
                let value = iter.next().ok_or_else(|| anyhow!("{} needs a value", token))?;
                apply_header(&mut request, &value)?;
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" => {
                let value = iter.next().ok_or_else(|| anyhow!("{} needs a body", token))?;
                request.body_type = infer_body_type(&request, &value);
                request.body = value;
            }
            "-u" | "--user" => {
                let value = iter.next().ok_or_else(|| anyhow!("{} needs credentials", token))?;
                let (username, password) = value
                    .split_once(':')
                    .map(|(u, p)| (u.to_string(), p.to_string()))
                    .unwrap_or((value.clone(), String::new()));
                request.auth = Some(AuthConfig::Basic { username, password });
            }
            "--compressed" | "-k" | "--insecure" | "-L" | "--location" | "-s" | "--silent"
            | "-v" | "--verbose" => {
                // Ignored flags
            }
            _ => {
                if token.starts_with("http://") || token.starts_with("https://") {
                    request.url = token;
                }
            }
        }
    }

    if request.url.is_empty() {
        return Err(anyhow!("No URL found in cURL command"));
    }

    // Infer POST when a body is given without -X
    request.method = match method {
        Some(m) => m,
        None if !request.body.is_empty() => HttpMethod::POST,
        None => HttpMethod::GET,
    };

    Ok(request)
}

fn apply_header(request: &mut RequestDefinition, raw: &str) -> Result<()> {
    let (key, value) = raw
        .split_once(':')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| anyhow!("Invalid header format: {}", raw))?;

    if key.eq_ignore_ascii_case("authorization") {
        if let Some(token) = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer ")) {
            request.auth = Some(AuthConfig::Bearer {
                token: token.trim().to_string(),
            });
            return Ok(());
        }
    }

    // Don't add duplicate headers
    if !request.headers.iter().any(|h| h.key.eq_ignore_ascii_case(key)) {
        request.headers.push(KeyValuePair::new(key, value));
    }
    Ok(())
}

fn infer_body_type(request: &RequestDefinition, body: &str) -> BodyType {
    let content_type = request
        .headers
        .iter()
        .find(|h| h.key.eq_ignore_ascii_case("content-type"))
        .map(|h| h.value.to_lowercase());

    match content_type.as_deref() {
        Some(ct) if ct.contains("json") => BodyType::Json,
        Some(ct) if ct.contains("x-www-form-urlencoded") => BodyType::FormUrlencoded,
        _ if body.trim_start().starts_with('{') || body.trim_start().starts_with('[') => {
            BodyType::Json
        }
        _ => BodyType::None,
    }
}

/// Tokenize a curl command, respecting quotes
fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escape_next = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ' ' | '\t' | '\n' if !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => {
                current.push(c);
            }
        }
    }

    if in_single_quote || in_double_quote {
        return Err(anyhow!("Unterminated quote in cURL command"));
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

/// Format a built request as a cURL command
pub fn to_curl(request: &BuiltRequest) -> String {
    let mut parts = vec!["curl".to_string()];

    if request.method != HttpMethod::GET {
        parts.push(format!("-X {}", request.method.as_str()));
    }

    parts.push(format!("'{}'", shell_escape(request.url.as_str())));

    for (name, value) in request.headers.iter() {
        parts.push(format!("-H '{}: {}'", name, shell_escape(value)));
    }

    if let Some(body) = &request.body {
        parts.push(format!("-d '{}'", shell_escape(body)));
    }

    parts.join(" \\\n  ")
}

fn shell_escape(s: &str) -> String {
    s.replace('\'', "'\\''")
}
