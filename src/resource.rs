//! Loading of external resources referenced by the tree (graphic sources).

use log::debug;
use quire_render_core::ImageData;
use quire_types::ResourceUri;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },
}

/// Source of resource bytes keyed by URI.
pub trait ResourceProvider: Send + Sync + Debug {
    fn load(&self, uri: &ResourceUri) -> Result<Arc<[u8]>, ResourceError>;

    fn name(&self) -> &'static str;

    /// Loads `uri` as image data. A failure is kept in the result as
    /// [`ImageData::Missing`] so the renderer can substitute the image.
    fn load_image(&self, uri: &ResourceUri) -> ImageData {
        match self.load(uri) {
            Ok(bytes) => ImageData::Encoded(bytes),
            Err(err) => {
                debug!("[{}] {}", self.name(), err);
                ImageData::Missing(err.to_string())
            }
        }
    }
}

/// Resources held in memory, added up front.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, uri: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Result<(), ResourceError> {
        let uri = uri.into();
        let mut resources = self.resources.write().map_err(|_| ResourceError::LoadFailed {
            path: uri.clone(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources.insert(uri, data.into());
        Ok(())
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, uri: &ResourceUri) -> Result<Arc<[u8]>, ResourceError> {
        let resources = self.resources.read().map_err(|_| ResourceError::LoadFailed {
            path: uri.to_string(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(uri.to_string()))
    }

    fn name(&self) -> &'static str {
        "MEMORY"
    }
}

/// Resources read from files under a base directory. Paths that would leave
/// the base directory are refused.
#[derive(Debug, Clone)]
pub struct FilesystemResourceProvider {
    base: PathBuf,
}

impl FilesystemResourceProvider {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let relative = uri
            .strip_prefix("url(")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(uri)
            .trim_matches(|c| c == '\'' || c == '"');
        let relative = relative.strip_prefix("file:").unwrap_or(relative);
        let path = Path::new(relative);
        if path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }
        Some(self.base.join(path))
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, uri: &ResourceUri) -> Result<Arc<[u8]>, ResourceError> {
        let path = self
            .resolve(uri.as_str())
            .ok_or_else(|| ResourceError::NotFound(format!("{uri} (outside the base directory)")))?;
        std::fs::read(&path).map(Arc::from).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(uri.to_string())
            } else {
                ResourceError::LoadFailed {
                    path: uri.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "FS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resources_become_missing_images() {
        let provider = InMemoryResourceProvider::new();
        provider.add("a.png", vec![1u8, 2, 3]).unwrap();
        assert!(matches!(
            provider.load_image(&ResourceUri::new("a.png")),
            ImageData::Encoded(_)
        ));
        assert!(matches!(
            provider.load_image(&ResourceUri::new("b.png")),
            ImageData::Missing(_)
        ));
    }

    #[test]
    fn traversal_is_refused() {
        let provider = FilesystemResourceProvider::new("/tmp/docs");
        assert!(provider.resolve("../etc/passwd").is_none());
        assert!(provider.resolve("/etc/passwd").is_none());
        assert_eq!(
            provider.resolve("url('img/logo.png')"),
            Some(PathBuf::from("/tmp/docs/img/logo.png"))
        );
    }

    #[test]
    fn files_are_read_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"bytes").unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());
        let data = provider.load(&ResourceUri::new("logo.png")).unwrap();
        assert_eq!(&data[..], b"bytes");
        assert!(matches!(
            provider.load(&ResourceUri::new("nope.png")),
            Err(ResourceError::NotFound(_))
        ));
    }
}
