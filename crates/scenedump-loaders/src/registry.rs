//! Loader registry for extension-based loader discovery.
//!
//! Loaders are registered with a priority; when several claim the same
//! extension the highest priority wins, ties going to the earliest
//! registration. Paths whose extension nobody claims are offered to every
//! loader's content sniffing in the same order.

use std::path::Path;
use std::sync::Arc;

use scenedump_core::Scene;
use tracing::{debug, info};

use crate::json::JsonSceneLoader;
use crate::traits::{LoadError, LoadOptions, LoadResult, SceneLoader};

/// Registration entry for a loader
struct Registration {
    priority: i32,
    loader: Arc<dyn SceneLoader>,
}

/// Loader information for display
#[derive(Debug, Clone)]
pub struct LoaderInfo {
    pub name: String,
    pub extensions: Vec<String>,
    pub priority: i32,
}

/// Ordered collection of scene loaders
#[derive(Default)]
pub struct LoaderRegistry {
    /// Sorted by priority, descending
    loaders: Vec<Registration>,
    options: LoadOptions,
}

impl LoaderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in loader
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(JsonSceneLoader::new(), 100);
        registry
    }

    /// Options passed to every loader
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Register a loader; higher priority is preferred on extension conflicts
    pub fn register(&mut self, loader: impl SceneLoader + 'static, priority: i32) {
        debug!(loader = loader.name(), priority, "Registering loader");

        // Stable position after every entry of equal or higher priority.
        let at = self
            .loaders
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(self.loaders.len());
        self.loaders.insert(
            at,
            Registration {
                priority,
                loader: Arc::new(loader),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// List all registered loaders in lookup order
    pub fn list(&self) -> Vec<LoaderInfo> {
        self.loaders
            .iter()
            .map(|r| LoaderInfo {
                name: r.loader.name().to_string(),
                extensions: r.loader.extensions().iter().map(|e| e.to_string()).collect(),
                priority: r.priority,
            })
            .collect()
    }

    /// Get a loader for a file extension (case-insensitive, leading dot allowed)
    pub fn find_for_extension(&self, ext: &str) -> Option<Arc<dyn SceneLoader>> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.loaders
            .iter()
            .find(|r| r.loader.extensions().iter().any(|e| *e == ext))
            .map(|r| Arc::clone(&r.loader))
    }

    /// Get a loader for a file path: extension first, then content sniffing
    pub fn find_for_path(&self, path: &Path) -> Option<Arc<dyn SceneLoader>> {
        if let Some(loader) = path
            .extension()
            .and_then(|ext| self.find_for_extension(&ext.to_string_lossy()))
        {
            return Some(loader);
        }

        self.loaders
            .iter()
            .find(|r| r.loader.can_load(path))
            .map(|r| Arc::clone(&r.loader))
    }

    /// Load the scene at `path` with the first loader that claims it
    pub fn load(&self, path: &Path) -> LoadResult<Scene> {
        let loader = self
            .find_for_path(path)
            .ok_or_else(|| LoadError::NotRecognized {
                path: path.to_path_buf(),
            })?;

        let scene = loader.load_file(path, &self.options)?;
        info!(
            loader = loader.name(),
            path = %path.display(),
            meshes = scene.meshes.len(),
            animations = scene.animations.len(),
            textures = scene.textures.len(),
            "Scene loaded"
        );
        Ok(scene)
    }
}
