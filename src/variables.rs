//! `{{key}}` substitution against an ordered variable set
//!
//! The input is scanned once. A substituted value is emitted as-is and never
//! re-scanned, so one variable can not expand into another and loops are
//! impossible. Unknown tokens stay verbatim.

use crate::models::KeyValuePair;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replaces every `{{key}}` with the value of the first enabled variable
/// whose key matches exactly.
pub fn substitute(text: &str, variables: &[KeyValuePair]) -> String {
    if text.is_empty() || !variables.iter().any(KeyValuePair::is_active) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + OPEN.len()..];

        let resolved = candidate.find(CLOSE).and_then(|end| {
            lookup(variables, &candidate[..end]).map(|value| (value, end))
        });

        match resolved {
            Some((value, end)) => {
                out.push_str(value);
                rest = &candidate[end + CLOSE.len()..];
            }
            None => {
                // Emit one brace and rescan, so "{{{a}}}" still resolves the inner token
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn lookup<'a>(variables: &'a [KeyValuePair], key: &str) -> Option<&'a str> {
    variables
        .iter()
        .find(|v| v.is_active() && v.key == key)
        .map(|v| v.value.as_str())
}

/// Substitution closure over an optional variable set
pub fn substituter(variables: Option<&[KeyValuePair]>) -> impl Fn(&str) -> String + '_ {
    move |text: &str| match variables {
        Some(vars) => substitute(text, vars),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<KeyValuePair> {
        pairs.iter().map(|(k, v)| KeyValuePair::new(*k, *v)).collect()
    }

    #[test]
    fn test_substitute_basic() {
        let v = vars(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute("{{a}}-{{b}}", &v), "1-2");
    }

    #[test]
    fn test_disabled_variable_is_ignored() {
        let mut v = vars(&[("a", "1"), ("b", "2")]);
        v[1].enabled = false;
        assert_eq!(substitute("{{a}}-{{b}}", &v), "1-{{b}}");
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let v = vars(&[("x", "y")]);
        assert_eq!(substitute("{{x}}/{{x}}?{{x}}", &v), "y/y?y");
    }

    #[test]
    fn test_no_trimming_or_case_folding() {
        let v = vars(&[("Host", "h")]);
        assert_eq!(substitute("{{ Host }} {{host}} {{Host}}", &v), "{{ Host }} {{host}} h");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let v = vars(&[("a", "{{b}}"), ("b", "2")]);
        assert_eq!(substitute("{{a}}", &v), "{{b}}");

        let looping = vars(&[("a", "{{a}}")]);
        assert_eq!(substitute("{{a}}", &looping), "{{a}}");
    }

    #[test]
    fn test_empty_key_never_matches() {
        let v = vars(&[("", "oops")]);
        assert_eq!(substitute("{{}}", &v), "{{}}");
    }

    #[test]
    fn test_nested_braces_and_unterminated() {
        let v = vars(&[("a", "1")]);
        assert_eq!(substitute("{{{a}}}", &v), "{1}");
        assert_eq!(substitute("{{a", &v), "{{a");
        assert_eq!(substitute("", &v), "");
    }

    #[test]
    fn test_idempotent_without_nested_tokens() {
        let v = vars(&[("a", "1"), ("b", "two")]);
        let text = "{{a}} and {{b}} and {{c}}";
        let once = substitute(text, &v);
        assert_eq!(substitute(&once, &v), once);
    }

    #[test]
    fn test_substituter_without_environment() {
        let sub = substituter(None);
        assert_eq!(sub("{{a}}"), "{{a}}");
    }

    #[test]
    fn test_multibyte_text() {
        let v = vars(&[("name", "wörld")]);
        assert_eq!(substitute("héllo {{name}} ✓", &v), "héllo wörld ✓");
    }
}
