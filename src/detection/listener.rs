// Live-Traffic Integration
//
// INTEGRATION layer between the host's per-request callback and the
// classifier. Translates captured messages into classifier input, applies
// the tool filter and the dedup window, and hands matches to the
// presentation layer.
//
// Flow per message:
//   tool filter -> classify (method gate inside) -> dedup -> annotate
//
// Used by: main.rs when replaying captures, tests for host simulations

use super::classifier::{ClassificationResult, EmailChangeClassifier};
use super::dedup::DedupCache;
use crate::annotation::{Annotation, Annotator};
use crate::config::{DetectorConfig, Vocabulary};
use crate::error::Result;
use crate::models::{CapturedRequest, Method, Parameter, Tool};
use chrono::{DateTime, Utc};

/// Host callback invoked once per intercepted request
pub trait HttpListener {
    fn process_http_message(&self, message_id: usize, message: &CapturedRequest);
}

/// A reported email-change request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub message_id: usize,
    pub method: Method,
    pub url: String,
    /// Matching parameters with their values, in request order
    pub parameters: Vec<Parameter>,
    pub result: ClassificationResult,
    pub annotation: Annotation,
}

impl Detection {
    /// Human-readable report block
    pub fn summary(&self) -> String {
        let mut out = String::from("[EMAIL CHANGE DETECTED]\n");
        out.push_str(&format!("Method: {}\n", self.method));
        out.push_str(&format!("URL: {}\n", self.url));
        if let Some(channel) = self.result.channel {
            out.push_str(&format!("Matched by: {}\n", channel));
        }
        if !self.parameters.is_empty() {
            out.push_str("Email parameters found:\n");
            for param in &self.parameters {
                out.push_str(&format!("  - {} = {}\n", param.name, param.value));
            }
        }
        out.push_str(&format!("Marked {}: {}\n", self.annotation.highlight, self.annotation.comment));
        out.push_str("========================================");
        out
    }
}

pub struct EmailChangeListener {
    classifier: EmailChangeClassifier,
    cache: DedupCache,
    skip_tools: Vec<Tool>,
    annotator: Option<Box<dyn Annotator + Send + Sync>>,
}

impl Default for EmailChangeListener {
    fn default() -> Self {
        let config = DetectorConfig::default();
        Self {
            classifier: EmailChangeClassifier::default(),
            cache: DedupCache::new(config.dedup),
            skip_tools: config.skip_tools,
            annotator: None,
        }
    }
}

impl EmailChangeListener {
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let vocabulary = Vocabulary::compile(config)?;
        Ok(Self {
            classifier: EmailChangeClassifier::new(vocabulary),
            cache: DedupCache::new(config.dedup.clone()),
            skip_tools: config.skip_tools.clone(),
            annotator: None,
        })
    }

    pub fn with_annotator(mut self, annotator: Box<dyn Annotator + Send + Sync>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    pub fn classifier(&self) -> &EmailChangeClassifier {
        &self.classifier
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Process a message, using its capture timestamp (or now) for dedup
    pub fn process(&self, message_id: usize, message: &CapturedRequest) -> Option<Detection> {
        let now = message.timestamp.unwrap_or_else(Utc::now);
        self.process_at(message_id, message, now)
    }

    pub fn process_at(
        &self,
        message_id: usize,
        message: &CapturedRequest,
        now: DateTime<Utc>,
    ) -> Option<Detection> {
        if self.skip_tools.contains(&message.tool) {
            log::trace!("skipping message #{} from {}", message_id, message.tool);
            return None;
        }

        let request = &message.request;
        let result = self.classifier.classify(request);
        if !result.is_email_change {
            return None;
        }

        if !self.cache.should_report(&request.method, &request.url, now) {
            log::debug!("duplicate email change suppressed: {} {}", request.method, request.url);
            return None;
        }

        let annotation = Annotation::for_result(&result)?;
        if let Some(annotator) = &self.annotator {
            annotator.annotate(message_id, &annotation);
        }

        let parameters = self
            .classifier
            .find_email_parameters(request)
            .into_iter()
            .cloned()
            .collect();

        log::info!(
            "email change detected: {} {} ({})",
            request.method,
            request.url,
            annotation.comment
        );

        Some(Detection {
            message_id,
            method: request.method.clone(),
            url: request.url.clone(),
            parameters,
            result,
            annotation,
        })
    }
}

impl HttpListener for EmailChangeListener {
    fn process_http_message(&self, message_id: usize, message: &CapturedRequest) {
        if let Some(detection) = self.process(message_id, message) {
            println!("{}", detection.summary());
        }
    }
}
