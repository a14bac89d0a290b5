//! Loader interface shared by all scene formats.
//!
//! A loader turns one file format into a [`Scene`]. Loaders are stored
//! type-erased in the [`LoaderRegistry`](crate::LoaderRegistry), so the
//! trait is object safe: readers are passed as `&mut dyn Read`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use scenedump_core::Scene;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while loading a scene
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] scenedump_core::Error),

    #[error("No loader recognizes {}", .path.display())]
    NotRecognized { path: PathBuf },

    #[error("{context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<LoadError>,
    },
}

impl LoadError {
    /// Wrap this error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        LoadError::Nested {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether no loader claimed the input (as opposed to a loader failing on it)
    pub fn is_not_recognized(&self) -> bool {
        match self {
            LoadError::NotRecognized { .. } => true,
            LoadError::Nested { source, .. } => source.is_not_recognized(),
            _ => false,
        }
    }
}

/// Result type alias for loading operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Configuration options for loading
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Check buffer sizes and cross references before handing the scene out
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// Apply the post-load checks every loader shares
///
/// Structural problems fail the load when `options.validate` is set.
/// Undecodable textures are only reported; they are skipped at export time.
pub fn check_scene(scene: Scene, options: &LoadOptions) -> LoadResult<Scene> {
    if options.validate {
        scene.validate()?;
    }
    for (index, err) in scene.invalid_textures() {
        warn!("Texture {index} will not be exported: {err}");
    }
    Ok(scene)
}

/// Core trait for all scene loaders
pub trait SceneLoader: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &str;

    /// File extensions this loader handles, lowercase without the dot
    fn extensions(&self) -> &[&str];

    /// Leading bytes that identify the format, if any
    fn sniff(&self, _head: &[u8]) -> bool {
        false
    }

    /// Decode a scene from `reader`
    fn load_from_reader(&self, reader: &mut dyn Read, options: &LoadOptions) -> LoadResult<Scene>;

    /// Decode a scene from a file
    fn load_file(&self, path: &Path, options: &LoadOptions) -> LoadResult<Scene> {
        debug!(loader = self.name(), path = %path.display(), "Loading scene");

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        self.load_from_reader(&mut reader, options)
            .map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Check if this loader can handle the given file
    fn can_load(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if self.extensions().iter().any(|e| *e == ext) {
                return true;
            }
        }

        // Fall back to content sniffing
        let Ok(mut file) = File::open(path) else {
            return false;
        };
        let mut head = [0u8; 64];
        match file.read(&mut head) {
            Ok(n) => self.sniff(&head[..n]),
            Err(_) => false,
        }
    }
}
