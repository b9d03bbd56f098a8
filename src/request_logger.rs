// Plain request logger
// Prints method, URL and originating tool for every intercepted request

use crate::detection::HttpListener;
use crate::models::CapturedRequest;

const RULE: &str = "========================================";

/// Format one log entry for an intercepted request
pub fn format_entry(message: &CapturedRequest) -> String {
    format!(
        "{rule}\nRequest intercepted:\nMethod: {}\nURL: {}\nTool: {}\n{rule}",
        message.request.method,
        message.request.url,
        message.tool,
        rule = RULE
    )
}

pub struct RequestLogger;

impl HttpListener for RequestLogger {
    fn process_http_message(&self, _message_id: usize, message: &CapturedRequest) {
        println!("{}", format_entry(message));
    }
}
