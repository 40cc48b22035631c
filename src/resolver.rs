//! Variable substitution for request templates
//!
//! Placeholders have the form `{{$name}}`. Unknown names are left verbatim;
//! resolution never fails and never recurses into substituted values.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::constants::DEFAULT_SCHEME;
use crate::models::{BasicAuth, Environment, ResolvedRequest, SavedRequest};

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\$([^{}]+)\}\}").expect("placeholder pattern is valid")
    })
}

/// Substitutes every `{{$name}}` in `template` with its value from `variables`
pub fn resolve(template: &str, variables: &BTreeMap<String, String>) -> String {
    if variables.is_empty() || !template.contains("{{$") {
        return template.to_string();
    }
    placeholder()
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names in `template` that have no value in `variables`, in
/// order of first appearance
pub fn unresolved(template: &str, variables: &BTreeMap<String, String>) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for caps in placeholder().captures_iter(template) {
        let name = &caps[1];
        if !variables.contains_key(name) && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    missing
}

/// Resolves every field of a saved request against the environment.
/// With no environment, placeholders pass through untouched.
pub fn resolve_request(request: &SavedRequest, environment: Option<&Environment>) -> ResolvedRequest {
    let empty = BTreeMap::new();
    let vars = environment.map(|env| &env.variables).unwrap_or(&empty);

    let resolve_map = |map: &BTreeMap<String, String>| {
        map.iter()
            .map(|(k, v)| (k.clone(), resolve(v, vars)))
            .collect::<BTreeMap<_, _>>()
    };

    ResolvedRequest {
        method: request.method,
        url: normalize_url(&resolve(&request.url, vars)),
        headers: resolve_map(&request.headers),
        params: resolve_map(&request.params),
        body: resolve(&request.body, vars),
        auth: request
            .auth
            .as_ref()
            .map(|auth| BasicAuth::new(resolve(&auth.username, vars), resolve(&auth.password, vars))),
    }
}

/// Prefixes a scheme when the URL was entered without one
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolves_repeated_and_multiple_placeholders() {
        let v = vars(&[("host", "api.example.com"), ("id", "42")]);
        let out = resolve("https://{{$host}}/users/{{$id}}?again={{$id}}", &v);
        assert_eq!(out, "https://api.example.com/users/42?again=42");
    }

    #[test]
    fn test_missing_variable_is_left_verbatim() {
        let v = vars(&[("host", "example.com")]);
        assert_eq!(resolve("{{$host}}/{{$missing}}", &v), "example.com/{{$missing}}");
        assert_eq!(unresolved("{{$host}}/{{$missing}}/{{$missing}}", &v), vec!["missing"]);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let v = vars(&[("Token", "abc")]);
        assert_eq!(resolve("{{$token}}", &v), "{{$token}}");
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        let v = vars(&[("a", "{{$b}}"), ("b", "deep")]);
        assert_eq!(resolve("{{$a}}", &v), "{{$b}}");
    }

    #[test]
    fn test_unterminated_placeholder_untouched() {
        let v = vars(&[("a", "1")]);
        assert_eq!(resolve("{{$a and {{$a}}", &v), "{{$a and 1");
        assert_eq!(resolve("{{a}}", &v), "{{a}}");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let v = vars(&[("x", "1")]);
        let template = "{{$x}}-{{$y}}";
        assert_eq!(resolve(template, &v), resolve(template, &v));
    }

    #[test]
    fn test_resolve_request_fields_independently() {
        let env = Environment::new("dev")
            .with_var("host", "localhost:8080")
            .with_var("token", "secret")
            .with_var("user", "alice");
        let request = SavedRequest::new("Get Users", HttpMethod::POST, "{{$host}}/users")
            .with_header("Authorization", "Bearer {{$token}}")
            .with_param("owner", "{{$user}}")
            .with_body(r#"{"name":"{{$user}}","role":"{{$role}}"}"#)
            .with_auth(BasicAuth::new("{{$user}}", "pw"));

        let resolved = resolve_request(&request, Some(&env));
        assert_eq!(resolved.url, "https://localhost:8080/users");
        assert_eq!(resolved.headers["Authorization"], "Bearer secret");
        assert_eq!(resolved.params["owner"], "alice");
        assert_eq!(resolved.body, r#"{"name":"alice","role":"{{$role}}"}"#);
        assert_eq!(resolved.auth, Some(BasicAuth::new("alice", "pw")));
    }

    #[test]
    fn test_no_environment_resolves_nothing() {
        let request = SavedRequest::new("r", HttpMethod::GET, "http://{{$host}}/");
        let resolved = resolve_request(&request, None);
        assert_eq!(resolved.url, "http://{{$host}}/");
    }
}
