//! Newtype wrappers for cross-reference names and resource URIs.
//!
//! Both are cheap to clone (`Arc<str>`), which matters because identifier
//! names are copied into every queued page's unresolved-reference snapshot.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

macro_rules! shared_str_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(value: impl Into<Arc<str>>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

shared_str_newtype!(
    /// The name of a cross-reference target (an `id` / `ref-id` value).
    IdName
);

shared_str_newtype!(
    /// A URI for an external resource such as a raster image.
    ResourceUri
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equal_names_compare_equal() {
        let a = IdName::new("fn1");
        let b = IdName::from(String::from("fn1"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "fn1");
    }

    #[test]
    fn lookup_by_str_through_borrow() {
        let mut pages = HashMap::new();
        pages.insert(IdName::new("intro"), 3usize);
        assert_eq!(pages.get("intro"), Some(&3));
    }

    #[test]
    fn uri_displays_verbatim() {
        let uri = ResourceUri::new("images/logo.png");
        assert_eq!(uri.to_string(), "images/logo.png");
    }
}
