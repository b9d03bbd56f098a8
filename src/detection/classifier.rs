// Email-Change Request Classification
//
// STATIC ANALYSIS of a parsed request to decide whether it changes a user's
// registered email address. Pure function of the request and the compiled
// vocabulary; nothing here touches the dedup cache.
//
// Detection channels, evaluated in order, first hit wins:
// - UrlPattern:    lower-cased URL matches a whole-string change pattern
// - ParameterName: a parameter name contains a keyword
// - Body:          the body contains a keyword followed by an "@...." shape
//
// Example:
//   Input:  POST https://x/api/profile/update  params=[newEmail=a@b.com]
//   Output: ClassificationResult {
//             is_email_change: true,
//             matched_params: ["newEmail"],
//             comment: "Email Change - Params: newEmail",
//           }
//
// Used by: listener.rs for live traffic and menu.rs for selected messages

use crate::config::Vocabulary;
use crate::models::{Parameter, ParsedRequest};
use std::fmt;

/// Which detection channel fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchChannel {
    UrlPattern,
    ParameterName,
    Body,
}

impl fmt::Display for MatchChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchChannel::UrlPattern => write!(f, "url pattern"),
            MatchChannel::ParameterName => write!(f, "parameter name"),
            MatchChannel::Body => write!(f, "body content"),
        }
    }
}

/// Outcome of classifying one request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassificationResult {
    pub is_email_change: bool,
    /// Names of every keyword-matching parameter, in request order
    pub matched_params: Vec<String>,
    /// Short human-readable summary, present only on a match
    pub comment: Option<String>,
    pub channel: Option<MatchChannel>,
}

impl ClassificationResult {
    pub fn no_match() -> Self {
        Self::default()
    }
}

/// Email-change classifier over a fixed vocabulary
#[derive(Debug, Clone)]
pub struct EmailChangeClassifier {
    vocabulary: Vocabulary,
}

impl Default for EmailChangeClassifier {
    fn default() -> Self {
        Self::new(Vocabulary::builtin().clone())
    }
}

impl EmailChangeClassifier {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Classify a request.
    ///
    /// Only POST, PUT and PATCH requests can match; every other method is a
    /// non-match whatever its URL or parameters. This is the single place the
    /// method gate is enforced.
    pub fn classify(&self, request: &ParsedRequest) -> ClassificationResult {
        if !request.method.is_state_changing() {
            return ClassificationResult::no_match();
        }

        let channel = match self.detect_channel(request) {
            Some(channel) => channel,
            None => return ClassificationResult::no_match(),
        };

        let matched_params: Vec<String> = self
            .find_email_parameters(request)
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        let comment = Some(Self::comment_for(&matched_params));

        ClassificationResult {
            is_email_change: true,
            matched_params,
            comment,
            channel: Some(channel),
        }
    }

    /// All parameters whose lower-cased name contains a keyword, in request order
    pub fn find_email_parameters<'a>(&self, request: &'a ParsedRequest) -> Vec<&'a Parameter> {
        request
            .parameters
            .iter()
            .filter(|p| self.vocabulary.name_matches(&p.name.to_lowercase()))
            .collect()
    }

    fn detect_channel(&self, request: &ParsedRequest) -> Option<MatchChannel> {
        if self.url_matches(&request.url) {
            return Some(MatchChannel::UrlPattern);
        }
        if self.parameter_name_matches(&request.parameters) {
            return Some(MatchChannel::ParameterName);
        }
        if self.body_matches(&request.body) {
            return Some(MatchChannel::Body);
        }
        None
    }

    fn url_matches(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        self.vocabulary
            .url_patterns()
            .iter()
            .any(|pattern| pattern.is_match(&lowered))
    }

    fn parameter_name_matches(&self, parameters: &[Parameter]) -> bool {
        parameters
            .iter()
            .any(|p| self.vocabulary.name_matches(&p.name.to_lowercase()))
    }

    /// A keyword alone is not enough in the body: it must be followed, on the
    /// same line, by something shaped like `@domain.`. Non-UTF-8 bodies never match.
    fn body_matches(&self, body: &[u8]) -> bool {
        if body.is_empty() {
            return false;
        }
        let text = match std::str::from_utf8(body) {
            Ok(text) => text.to_lowercase(),
            Err(_) => return false,
        };

        self.vocabulary
            .keywords()
            .iter()
            .filter(|k| text.contains(&k.text))
            .any(|k| k.email_shape.is_match(&text))
    }

    fn comment_for(matched_params: &[String]) -> String {
        if matched_params.is_empty() {
            "Email Change Request - Auto-detected".to_string()
        } else {
            format!("Email Change - Params: {}", matched_params.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::models::{Method, ParameterLocation};

    fn request(method: Method, url: &str, params: &[(&str, &str)], body: &str) -> ParsedRequest {
        ParsedRequest::new(
            method,
            url,
            params
                .iter()
                .map(|(n, v)| Parameter::new(*n, *v, ParameterLocation::Body))
                .collect(),
            body.as_bytes().to_vec(),
        )
    }

    #[test]
    fn test_parameter_name_match() {
        let classifier = EmailChangeClassifier::default();
        let req = request(
            Method::POST,
            "https://x/api/profile/update",
            &[("newEmail", "a@b.com")],
            "",
        );
        let result = classifier.classify(&req);
        assert!(result.is_email_change);
        assert_eq!(result.matched_params, vec!["newEmail".to_string()]);
        assert_eq!(result.channel, Some(MatchChannel::ParameterName));
        assert_eq!(result.comment.as_deref(), Some("Email Change - Params: newEmail"));
    }

    #[test]
    fn test_url_match_without_params() {
        let classifier = EmailChangeClassifier::default();
        let req = request(Method::PUT, "https://x/Account/Change-Email", &[], "");
        let result = classifier.classify(&req);
        assert!(result.is_email_change);
        assert!(result.matched_params.is_empty());
        assert_eq!(result.channel, Some(MatchChannel::UrlPattern));
        assert_eq!(
            result.comment.as_deref(),
            Some("Email Change Request - Auto-detected")
        );
    }

    #[test]
    fn test_method_gate() {
        let classifier = EmailChangeClassifier::default();
        let req = request(
            Method::GET,
            "https://x/account/change-email",
            &[("email", "a@b.com")],
            "",
        );
        assert_eq!(classifier.classify(&req), ClassificationResult::no_match());
    }

    #[test]
    fn test_body_requires_email_shape() {
        let classifier = EmailChangeClassifier::default();

        let bare = request(Method::POST, "https://x/api/save", &[], "new_email=");
        assert!(!classifier.classify(&bare).is_email_change);

        let shaped = request(Method::POST, "https://x/api/save", &[], "new_email=foo@bar.com");
        let result = classifier.classify(&shaped);
        assert!(result.is_email_change);
        assert_eq!(result.channel, Some(MatchChannel::Body));
    }

    #[test]
    fn test_body_shape_must_be_on_one_line() {
        let classifier = EmailChangeClassifier::default();
        let req = request(Method::POST, "https://x/api/save", &[], "email\nfoo@bar.com");
        assert!(!classifier.classify(&req).is_email_change);
    }

    #[test]
    fn test_body_shape_stops_at_any_line_terminator() {
        let classifier = EmailChangeClassifier::default();
        for sep in ["\r", "\u{85}", "\u{2028}", "\u{2029}"] {
            let body = format!("new_email{}foo@bar.com", sep);
            let req = request(Method::POST, "https://x/api/save", &[], &body);
            assert!(!classifier.classify(&req).is_email_change, "separator {:?}", sep);
        }
        let same_line = request(Method::POST, "https://x/api/save", &[], "new_email=\tfoo@bar.com");
        assert!(classifier.classify(&same_line).is_email_change);
    }

    #[test]
    fn test_non_utf8_body_is_no_match() {
        let classifier = EmailChangeClassifier::default();
        let mut body = b"new_email=foo@bar.com".to_vec();
        body.push(0xff);
        let req = ParsedRequest::new(Method::POST, "https://x/api/save", vec![], body);
        assert!(!classifier.classify(&req).is_email_change);
    }

    #[test]
    fn test_collects_all_matching_params_in_order() {
        let classifier = EmailChangeClassifier::default();
        let req = request(
            Method::PATCH,
            "https://x/api/me",
            &[("csrf", "t"), ("current_email", "a@b.c"), ("name", "n"), ("NEW_EMAIL", "x@y.z")],
            "",
        );
        let result = classifier.classify(&req);
        assert_eq!(
            result.matched_params,
            vec!["current_email".to_string(), "NEW_EMAIL".to_string()]
        );
        assert_eq!(
            result.comment.as_deref(),
            Some("Email Change - Params: current_email, NEW_EMAIL")
        );
    }

    #[test]
    fn test_alternate_vocabulary() {
        let config = DetectorConfig {
            keywords: vec!["correo".to_string()],
            url_patterns: vec![".*cambiar.*".to_string()],
            ..DetectorConfig::default()
        };
        let classifier = EmailChangeClassifier::new(Vocabulary::compile(&config).unwrap());

        let english = request(Method::POST, "https://x/api", &[("email", "a@b.com")], "");
        assert!(!classifier.classify(&english).is_email_change);

        let spanish = request(Method::POST, "https://x/api", &[("nuevoCorreo", "a@b.com")], "");
        assert!(classifier.classify(&spanish).is_email_change);

        let by_url = request(Method::POST, "https://x/cuenta/cambiar", &[], "");
        assert!(classifier.classify(&by_url).is_email_change);
    }
}
