//! scenedump Export Pipeline
//!
//! Renders an already-loaded [`Scene`](scenedump_core::Scene) into:
//! - a line-oriented, tab-indented text document (meshes, animations,
//!   node graph, embedded texture descriptors)
//! - one standalone image file per embedded texture (TGA by default)

pub mod dump;
pub mod textures;

pub use dump::{DumpError, DumpOptions, DumpReport, DumpResult, SceneDumper};
pub use textures::{
    ExportOutcome, ImageFormat, SkipReason, TextureError, TextureExportOptions, TextureExporter,
};
