//! scenedump-loaders
//!
//! Turns files on disk into [`Scene`](scenedump_core::Scene)s.
//!
//! # Supported Formats
//!
//! | Format | Extension | Description |
//! |--------|-----------|-------------|
//! | JSON   | `.json`   | serde form of the scene model |
//!
//! # Example
//!
//! ```rust,ignore
//! use scenedump_loaders::LoaderRegistry;
//!
//! let registry = LoaderRegistry::with_builtin();
//! let scene = registry.load(Path::new("scene.json"))?;
//! ```

pub mod json;
pub mod registry;
pub mod traits;

pub use json::JsonSceneLoader;
pub use registry::{LoaderInfo, LoaderRegistry};
pub use traits::{check_scene, LoadError, LoadOptions, LoadResult, SceneLoader};
