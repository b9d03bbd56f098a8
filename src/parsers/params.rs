// Parameter Extraction
//
// Decodes request parameters from the pieces a capture provides: the URL
// query string, a form-encoded body, a JSON body and the Cookie header.
// Order is preserved so the classifier reports names as they appear.
//
// Example:
//   URL:   https://x/api/me?lang=en
//   Body:  {"profile": {"newEmail": "a@b.com"}}
//   Out:   [lang (url), profile (json), newEmail (json)]

use crate::models::{Parameter, ParameterLocation};
use serde_json::Value;
use url::{form_urlencoded, Url};

/// Extract URL, body and JSON parameters in that order
pub fn extract_parameters(url: &str, content_type: Option<&str>, body: &[u8]) -> Vec<Parameter> {
    let mut params = query_parameters(url);
    params.extend(body_parameters(content_type, body));
    params
}

pub fn query_parameters(raw: &str) -> Vec<Parameter> {
    let parsed = Url::parse(raw).or_else(|_| Url::parse("http://localhost/")?.join(raw));
    match parsed {
        Ok(url) => url
            .query_pairs()
            .map(|(k, v)| Parameter::new(k, v, ParameterLocation::Url))
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Body parameters, chosen by content type (or sniffed when there is none)
pub fn body_parameters(content_type: Option<&str>, body: &[u8]) -> Vec<Parameter> {
    if body.is_empty() {
        return Vec::new();
    }
    let content_type = content_type.map(|c| c.to_ascii_lowercase()).unwrap_or_default();

    let looks_like_json = content_type.contains("json")
        || (content_type.is_empty()
            && matches!(body.iter().copied().find(|b| !b.is_ascii_whitespace()), Some(b'{') | Some(b'[')));
    if looks_like_json {
        return match serde_json::from_slice::<Value>(body) {
            Ok(json) => {
                let mut params = Vec::new();
                collect_json_params(&json, &mut params);
                params
            }
            Err(_) => Vec::new(),
        };
    }

    if content_type.contains("x-www-form-urlencoded") || content_type.is_empty() {
        // Non-UTF-8 bodies are never treated as forms
        if let Ok(text) = std::str::from_utf8(body) {
            if text.contains('=') {
                return form_urlencoded::parse(text.trim().as_bytes())
                    .map(|(k, v)| Parameter::new(k, v, ParameterLocation::Body))
                    .collect();
            }
        }
    }

    Vec::new()
}

/// Split a `Cookie:` header value into parameters
pub fn cookie_parameters(header: &str) -> Vec<Parameter> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            if name.is_empty() {
                return None;
            }
            Some(Parameter::new(name, value, ParameterLocation::Cookie))
        })
        .collect()
}

/// Walk a JSON document, emitting every object key in document order.
/// Containers get an empty value; scalars their textual form.
fn collect_json_params(json: &Value, params: &mut Vec<Parameter>) {
    match json {
        Value::Object(map) => {
            for (k, v) in map {
                let value = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
                };
                params.push(Parameter::new(k.as_str(), value, ParameterLocation::Json));
                collect_json_params(v, params);
            }
        }
        Value::Array(arr) => {
            for v in arr {
                collect_json_params(v, params);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(params: &[Parameter]) -> Vec<&str> {
        params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn query_and_json_in_order() {
        let params = extract_parameters(
            "https://x/api/me?lang=en&ref=nav",
            Some("application/json; charset=utf-8"),
            br#"{"profile": {"newEmail": "a@b.com", "age": 3}, "tags": [{"primary_email": true}]}"#,
        );
        assert_eq!(
            names(&params),
            vec!["lang", "ref", "profile", "newEmail", "age", "tags", "primary_email"]
        );
        assert_eq!(params[3].value, "a@b.com");
        assert_eq!(params[3].location, ParameterLocation::Json);
        assert_eq!(params[6].value, "true");
    }

    #[test]
    fn form_body_is_decoded() {
        let params = body_parameters(
            Some("application/x-www-form-urlencoded"),
            b"new_email=foo%40bar.com&csrf=abc",
        );
        assert_eq!(names(&params), vec!["new_email", "csrf"]);
        assert_eq!(params[0].value, "foo@bar.com");
        assert_eq!(params[0].location, ParameterLocation::Body);
    }

    #[test]
    fn relative_url_query() {
        let params = query_parameters("/settings?email=a%40b.com");
        assert_eq!(params[0].value, "a@b.com");
    }

    #[test]
    fn garbage_degrades_to_nothing() {
        assert!(body_parameters(Some("application/json"), b"{not json").is_empty());
        assert!(body_parameters(None, &[0xff, 0xfe, b'=']).is_empty());
        assert!(body_parameters(Some("text/plain"), b"a=b").is_empty());
    }

    #[test]
    fn cookies() {
        let params = cookie_parameters("session=abc; user_email=a@b.com;  ; =x");
        assert_eq!(names(&params), vec!["session", "user_email"]);
        assert_eq!(params[1].location, ParameterLocation::Cookie);
    }
}
