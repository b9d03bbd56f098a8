/// Unit tests for core mailswap models, config and presentation helpers
use mailswap::annotation::{Annotation, Highlight};
use mailswap::config::DetectorConfig;
use mailswap::detection::{EmailChangeClassifier, HttpListener};
use mailswap::models::{CapturedRequest, HttpService, Method, ParsedRequest, Tool};
use mailswap::request_logger::{format_entry, RequestLogger};

#[test]
fn test_method_display_and_gate() {
    assert_eq!(Method::POST.to_string(), "POST");
    assert_eq!(Method::Other("MKCOL".to_string()).to_string(), "MKCOL");
    assert!(Method::POST.is_state_changing());
    assert!(Method::PUT.is_state_changing());
    assert!(Method::PATCH.is_state_changing());
    assert!(!Method::GET.is_state_changing());
    assert!(!Method::DELETE.is_state_changing());
}

#[test]
fn test_method_serde_roundtrip_as_string() {
    let json = serde_json::to_string(&Method::PATCH).unwrap();
    assert_eq!(json, "\"PATCH\"");
    let parsed: Method = serde_json::from_str("\"TRACE\"").unwrap();
    assert_eq!(parsed, Method::Other("TRACE".to_string()));
}

#[test]
fn test_tool_names() {
    assert_eq!(Tool::from_flag(0x0004).to_string(), "Proxy");
    assert_eq!(Tool::from_flag(0x0010).to_string(), "Scanner");
    assert_eq!(Tool::from_flag(0x9999).to_string(), "Unknown");
}

#[test]
fn test_captured_request_defaults() {
    let capture = CapturedRequest::from_request(ParsedRequest::new(
        Method::POST,
        "https://accounts.example/email",
        vec![],
        vec![],
    ));
    assert_eq!(capture.tool, Tool::Proxy);
    assert_eq!(
        capture.service,
        Some(HttpService { host: "accounts.example".to_string(), port: 443, https: true })
    );
    assert!(capture.header("content-type").is_none());
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocab.json");
    let mut config = DetectorConfig::default();
    config.keywords.push("courriel".to_string());
    config.skip_tools.push(Tool::Scanner);
    config.save(&path).unwrap();

    let loaded = DetectorConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = DetectorConfig::load("/nonexistent/mailswap.json").unwrap_err();
    assert!(matches!(err, mailswap::Error::Io(_)));
}

#[test]
fn test_annotation_for_classification() {
    let classifier = EmailChangeClassifier::default();
    let result = classifier.classify(&ParsedRequest::new(
        Method::POST,
        "https://x/account/change-email",
        vec![],
        vec![],
    ));
    let annotation = Annotation::for_result(&result).unwrap();
    assert_eq!(annotation.highlight, Highlight::Red);
    assert_eq!(annotation.highlight.to_string(), "red");
    assert_eq!(annotation.comment, "Email Change Request - Auto-detected");
}

#[test]
fn test_request_logger_entry() {
    let capture = CapturedRequest::from_request(ParsedRequest::new(
        Method::GET,
        "https://x/",
        vec![],
        vec![],
    ));
    let entry = format_entry(&capture);
    assert!(entry.contains("Request intercepted:"));
    assert!(entry.contains("Tool: Proxy"));
    // printing must not panic
    RequestLogger.process_http_message(0, &capture);
}
