//! Structural markup events consumed by the tree builder.

use crate::error::{Location, TreeError};

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent {
    Start {
        tag: String,
        attributes: Vec<(String, String)>,
        location: Location,
    },
    Text {
        text: String,
        location: Location,
    },
    End {
        tag: String,
        location: Location,
    },
    /// End of input. Sources keep returning it once reached.
    EndOfStream,
}

impl MarkupEvent {
    pub fn start(tag: &str, attributes: &[(&str, &str)]) -> Self {
        MarkupEvent::Start {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            location: Location::default(),
        }
    }

    pub fn text(text: &str) -> Self {
        MarkupEvent::Text {
            text: text.to_string(),
            location: Location::default(),
        }
    }

    pub fn end(tag: &str) -> Self {
        MarkupEvent::End {
            tag: tag.to_string(),
            location: Location::default(),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            MarkupEvent::Start { location, .. }
            | MarkupEvent::Text { location, .. }
            | MarkupEvent::End { location, .. } => *location,
            MarkupEvent::EndOfStream => Location::default(),
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, MarkupEvent::Text { text, .. } if text.trim().is_empty())
    }
}

/// A pull-based producer of markup events in document order.
pub trait EventSource {
    fn next_event(&mut self) -> Result<MarkupEvent, TreeError>;
}

/// Replays a prepared event list, then reports end of stream.
#[derive(Debug, Default)]
pub struct EventList {
    events: std::collections::VecDeque<MarkupEvent>,
}

impl EventList {
    pub fn new(events: impl IntoIterator<Item = MarkupEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for EventList {
    fn next_event(&mut self) -> Result<MarkupEvent, TreeError> {
        Ok(self.events.pop_front().unwrap_or(MarkupEvent::EndOfStream))
    }
}
