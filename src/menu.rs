// Context-menu action for selected messages
// Offers "send to workbench" when a selection contains an email-change request

use crate::detection::EmailChangeClassifier;
use crate::forwarder::Forwarder;
use crate::models::CapturedRequest;

pub const SEND_LABEL: &str = "Send Email Request to Intruder";

/// Where the menu was opened in the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationContext {
    MessageEditorRequest,
    MessageEditorResponse,
    MessageViewerRequest,
    MessageViewerResponse,
    TargetSiteMapTree,
    TargetSiteMapTable,
    ProxyHistory,
    ScannerResults,
    IntruderPayloadPositions,
    IntruderAttackResults,
    SearchResults,
}

impl InvocationContext {
    /// Contexts in which a request (rather than a response) is selected
    pub fn is_request_context(&self) -> bool {
        matches!(
            self,
            InvocationContext::MessageViewerRequest
                | InvocationContext::MessageEditorRequest
                | InvocationContext::ProxyHistory
                | InvocationContext::TargetSiteMapTable
                | InvocationContext::TargetSiteMapTree
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    SendToWorkbench(String),
    Separator,
}

/// Outcome of the send action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendSummary {
    pub sent: usize,
    /// Email-change requests without email parameters to mark
    pub skipped: usize,
    pub failed: usize,
}

pub struct ContextMenu<'a> {
    classifier: &'a EmailChangeClassifier,
}

impl<'a> ContextMenu<'a> {
    pub fn new(classifier: &'a EmailChangeClassifier) -> Self {
        Self { classifier }
    }

    /// Menu entries for the current selection; empty when nothing applies
    pub fn items_for(&self, context: InvocationContext, selected: &[CapturedRequest]) -> Vec<MenuItem> {
        if !context.is_request_context() || selected.is_empty() {
            return Vec::new();
        }

        let has_email_request = selected
            .iter()
            .any(|m| self.classifier.classify(&m.request).is_email_change);
        if !has_email_request {
            return Vec::new();
        }

        vec![MenuItem::SendToWorkbench(SEND_LABEL.to_string()), MenuItem::Separator]
    }

    /// Forward every email-change request in the selection.
    ///
    /// A failed forward is logged and counted; the remaining messages are
    /// still sent.
    pub fn send_selected(&self, selected: &[CapturedRequest], forwarder: &dyn Forwarder) -> SendSummary {
        let mut summary = SendSummary::default();

        for message in selected {
            if !self.classifier.classify(&message.request).is_email_change {
                continue;
            }

            let params: Vec<String> = self
                .classifier
                .find_email_parameters(&message.request)
                .into_iter()
                .map(|p| p.name.clone())
                .collect();
            if params.is_empty() {
                log::warn!(
                    "no email parameters in {}; mark the email value in the body manually",
                    message.request.url
                );
                summary.skipped += 1;
                continue;
            }

            match forwarder.forward(message, &params) {
                Ok(()) => {
                    log::info!(
                        "sent {} to workbench, parameters to fuzz: {}",
                        message.request.url,
                        params.join(", ")
                    );
                    summary.sent += 1;
                }
                Err(e) => {
                    log::error!("Error sending {} to workbench: {}", message.request.url, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
