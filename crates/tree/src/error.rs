use quire_types::RegistryInconsistency;
use std::fmt;
use thiserror::Error;

/// A position in the markup source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

impl From<(usize, usize)> for Location {
    fn from((line, col): (usize, usize)) -> Self {
        Location { line, col }
    }
}

/// A containment or content-model violation. Always fatal to the document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    #[error("fo:{element} is not allowed inside fo:{ancestor} at {location}")]
    ForbiddenAncestor {
        element: &'static str,
        ancestor: &'static str,
        location: Location,
    },

    #[error("fo:{element} requires {expected} at {location}; content model is {model}")]
    MissingRequiredChild {
        element: &'static str,
        expected: String,
        model: String,
        location: Location,
    },

    #[error("'{found}' is not allowed in fo:{element} at {location}; content model is {model}")]
    UnexpectedChild {
        element: &'static str,
        found: String,
        model: String,
        location: Location,
    },

    #[error("Text is not allowed in fo:{element} at {location}; content model is {model}")]
    UnexpectedText {
        element: &'static str,
        model: String,
        location: Location,
    },

    #[error("Input ended inside fo:{element} opened at {location}; content model is {model}")]
    UnexpectedEndOfInput {
        element: &'static str,
        model: String,
        location: Location,
    },

    #[error("Expected end of fo:{element} but found end of '{found}' at {location}")]
    MismatchedEnd {
        element: &'static str,
        found: String,
        location: Location,
    },

    #[error("Unknown element '{tag}' at {location}")]
    UnknownElement { tag: String, location: Location },

    #[error("Invalid property on fo:{element} at {location}: {message}")]
    InvalidProperty {
        element: &'static str,
        message: String,
        location: Location,
    },

    #[error("fo:{element} requires attribute '{attribute}' at {location}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        location: Location,
    },
}

#[derive(Error, Debug)]
pub enum TreeError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Registry(#[from] RegistryInconsistency),

    #[error("Markup source error: {0}")]
    Source(String),
}
