use quire_types::Color;
use std::fmt;
use std::sync::Arc;

/// A computed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A length in points.
    Length(f32),
    Auto,
    Number(f32),
    Color(Color),
    /// One of the property's enumerated tokens.
    Keyword(&'static str),
    Text(Arc<str>),
}

impl PropertyValue {
    pub fn text(s: &str) -> Self {
        PropertyValue::Text(s.into())
    }

    pub fn as_length(&self) -> Option<f32> {
        match self {
            PropertyValue::Length(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&'static str> {
        match self {
            PropertyValue::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Length(v) => write!(f, "{}pt", v),
            PropertyValue::Auto => f.write_str("auto"),
            PropertyValue::Number(v) => write!(f, "{}", v),
            PropertyValue::Color(c) => write!(f, "{}", c),
            PropertyValue::Keyword(k) => f.write_str(k),
            PropertyValue::Text(t) => f.write_str(t),
        }
    }
}
