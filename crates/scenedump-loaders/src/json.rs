//! JSON scene loader
//!
//! Reads the serde form of [`Scene`]. Mostly useful for fixtures and for
//! scenes produced by other tools.

use std::io::Read;

use scenedump_core::Scene;
use tracing::debug;

use crate::traits::{check_scene, LoadOptions, LoadResult, SceneLoader};

/// Loader for `.json` scene documents
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSceneLoader;

impl JsonSceneLoader {
    pub fn new() -> Self {
        Self
    }
}

impl SceneLoader for JsonSceneLoader {
    fn name(&self) -> &str {
        "JSON Scene"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn sniff(&self, head: &[u8]) -> bool {
        head.iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'{')
    }

    fn load_from_reader(&self, reader: &mut dyn Read, options: &LoadOptions) -> LoadResult<Scene> {
        let scene: Scene = serde_json::from_reader(reader)?;
        debug!(
            meshes = scene.meshes.len(),
            animations = scene.animations.len(),
            textures = scene.textures.len(),
            "Decoded JSON scene"
        );
        check_scene(scene, options)
    }
}
