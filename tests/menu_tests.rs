// Context-menu offering and forwarding of selected requests
use mailswap::detection::EmailChangeClassifier;
use mailswap::error::{Error, Result};
use mailswap::forwarder::Forwarder;
use mailswap::menu::{ContextMenu, InvocationContext, MenuItem, SendSummary, SEND_LABEL};
use mailswap::models::{CapturedRequest, Method, Parameter, ParameterLocation, ParsedRequest};
use std::cell::RefCell;

struct RecordingForwarder {
    sent: RefCell<Vec<(String, Vec<String>)>>,
    fail_on: Option<&'static str>,
}

impl RecordingForwarder {
    fn new(fail_on: Option<&'static str>) -> Self {
        Self { sent: RefCell::new(Vec::new()), fail_on }
    }
}

impl Forwarder for RecordingForwarder {
    fn forward(&self, message: &CapturedRequest, target_params: &[String]) -> Result<()> {
        if self.fail_on == Some(message.request.url.as_str()) {
            return Err(Error::Forward("connection refused".to_string()));
        }
        self.sent
            .borrow_mut()
            .push((message.request.url.clone(), target_params.to_vec()));
        Ok(())
    }
}

fn message(method: Method, url: &str, params: &[(&str, &str)]) -> CapturedRequest {
    CapturedRequest::from_request(ParsedRequest::new(
        method,
        url,
        params
            .iter()
            .map(|(n, v)| Parameter::new(*n, *v, ParameterLocation::Body))
            .collect(),
        Vec::new(),
    ))
}

#[test]
fn menu_offered_only_for_email_requests_in_request_contexts() {
    let classifier = EmailChangeClassifier::default();
    let menu = ContextMenu::new(&classifier);
    let plain = message(Method::POST, "https://x/cart", &[("sku", "1")]);
    let change = message(Method::POST, "https://x/api/me", &[("email", "a@b.com")]);

    assert!(menu.items_for(InvocationContext::ProxyHistory, &[plain.clone()]).is_empty());
    assert!(menu.items_for(InvocationContext::ProxyHistory, &[]).is_empty());
    assert!(menu
        .items_for(InvocationContext::MessageViewerResponse, &[change.clone()])
        .is_empty());

    let items = menu.items_for(InvocationContext::TargetSiteMapTree, &[plain, change]);
    assert_eq!(
        items,
        vec![MenuItem::SendToWorkbench(SEND_LABEL.to_string()), MenuItem::Separator]
    );
}

#[test]
fn send_forwards_matching_messages_with_their_params() {
    let classifier = EmailChangeClassifier::default();
    let menu = ContextMenu::new(&classifier);
    let forwarder = RecordingForwarder::new(None);
    let selected = vec![
        message(Method::POST, "https://x/cart", &[("sku", "1")]),
        message(Method::PUT, "https://x/api/me", &[("name", "n"), ("newEmail", "a@b.com"), ("oldEmail", "c@d.com")]),
        message(Method::POST, "https://x/account/change-email", &[]),
    ];

    let summary = menu.send_selected(&selected, &forwarder);
    assert_eq!(summary, SendSummary { sent: 1, skipped: 1, failed: 0 });

    let sent = forwarder.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "https://x/api/me");
    assert_eq!(sent[0].1, vec!["newEmail".to_string(), "oldEmail".to_string()]);
}

#[test]
fn forwarding_failure_does_not_stop_the_rest() {
    let classifier = EmailChangeClassifier::default();
    let menu = ContextMenu::new(&classifier);
    let forwarder = RecordingForwarder::new(Some("https://x/first"));
    let selected = vec![
        message(Method::POST, "https://x/first", &[("email", "a@b.com")]),
        message(Method::PATCH, "https://x/second", &[("user_email", "a@b.com")]),
    ];

    let summary = menu.send_selected(&selected, &forwarder);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.sent, 1);
    assert_eq!(forwarder.sent.borrow()[0].0, "https://x/second");
}
