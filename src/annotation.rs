// Presentation of detections
// Highlights and comments attached to captured requests in the host's history view

use crate::detection::ClassificationResult;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Highlight colours offered by the host's history view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Pink,
    Magenta,
    Gray,
}

impl fmt::Display for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Highlight::Red => "red",
            Highlight::Orange => "orange",
            Highlight::Yellow => "yellow",
            Highlight::Green => "green",
            Highlight::Cyan => "cyan",
            Highlight::Blue => "blue",
            Highlight::Pink => "pink",
            Highlight::Magenta => "magenta",
            Highlight::Gray => "gray",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub highlight: Highlight,
    pub comment: String,
}

impl Annotation {
    /// Red highlight plus the classifier's comment. `None` for non-matches.
    pub fn for_result(result: &ClassificationResult) -> Option<Self> {
        if !result.is_email_change {
            return None;
        }
        Some(Self {
            highlight: Highlight::Red,
            comment: result
                .comment
                .clone()
                .unwrap_or_else(|| "Email Change Request - Auto-detected".to_string()),
        })
    }
}

/// Applies annotations to the originating message.
///
/// Implementations must swallow their own failures: a message that cannot be
/// marked is logged and skipped.
pub trait Annotator {
    fn annotate(&self, message_id: usize, annotation: &Annotation);
}

impl<T: Annotator + ?Sized> Annotator for Arc<T> {
    fn annotate(&self, message_id: usize, annotation: &Annotation) {
        (**self).annotate(message_id, annotation);
    }
}

/// In-memory history of annotations keyed by message index
#[derive(Debug, Default)]
pub struct HistoryAnnotator {
    marks: Mutex<BTreeMap<usize, Annotation>>,
}

impl HistoryAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, message_id: usize) -> Option<Annotation> {
        self.marks.lock().get(&message_id).cloned()
    }

    /// All annotations ordered by message index
    pub fn entries(&self) -> Vec<(usize, Annotation)> {
        self.marks
            .lock()
            .iter()
            .map(|(id, a)| (*id, a.clone()))
            .collect()
    }
}

impl Annotator for HistoryAnnotator {
    fn annotate(&self, message_id: usize, annotation: &Annotation) {
        log::debug!(
            "marking message #{} {}: {}",
            message_id, annotation.highlight, annotation.comment
        );
        self.marks.lock().insert(message_id, annotation.clone());
    }
}
