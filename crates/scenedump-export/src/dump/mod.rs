//! Scene text dump
//!
//! Document layout, in emission order:
//! - one `Mesh` block per mesh
//! - one `Animation` block per animation
//! - the `Nodegraph` section (node count, then the indented hierarchy)
//! - one `Emb. Texture` block per embedded texture, naming the image file
//!   the texture was exported to
//!
//! Only opening or writing the main document is fatal. Texture export
//! problems are logged, recorded in the [`DumpReport`] and skipped.

mod animation;
mod format;
mod mesh;
mod nodes;

pub use animation::write_animation;
pub use mesh::write_mesh;
pub use nodes::{count_nodes, print_nodes};

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use scenedump_core::logging::instrument_stage;
use scenedump_core::Scene;
use thiserror::Error;
use tracing::{debug, info};

use crate::textures::{ExportOutcome, SkipReason, TextureExportOptions, TextureExporter};

/// Dump errors
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Unable to open output file {}: {source}", .path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type DumpResult<T> = Result<T, DumpError>;

/// Dump options
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Image container and tweaks for embedded textures
    pub texture: TextureExportOptions,

    /// Write texture image files; descriptor lines are written either way
    pub export_textures: bool,

    /// Extension the output document carries (without the dot); it is
    /// replaced by `_tex<i>.<image ext>` to name texture files
    pub required_extension: String,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            texture: TextureExportOptions::default(),
            export_textures: true,
            required_extension: "txt".to_string(),
        }
    }
}

/// What a dump produced
#[derive(Debug, Default)]
pub struct DumpReport {
    pub meshes: usize,
    pub animations: usize,
    pub nodes: usize,
    /// One entry per embedded texture, in scene order
    pub textures: Vec<ExportOutcome>,
}

impl DumpReport {
    pub fn textures_written(&self) -> usize {
        self.textures.iter().filter(|t| t.is_written()).count()
    }

    pub fn textures_skipped(&self) -> usize {
        self.textures.len() - self.textures_written()
    }
}

/// Writes the text dump of a scene and exports its embedded textures
pub struct SceneDumper {
    options: DumpOptions,
    textures: TextureExporter,
}

impl SceneDumper {
    pub fn new(options: DumpOptions) -> Self {
        let textures = TextureExporter::with_options(options.texture.clone());
        Self { options, textures }
    }

    pub fn options(&self) -> &DumpOptions {
        &self.options
    }

    /// Create `output_path` and dump `scene` into it
    ///
    /// The file is flushed and closed before returning, also when a texture
    /// could not be exported.
    pub fn dump_to_path(&self, scene: &Scene, output_path: &Path) -> DumpResult<DumpReport> {
        let file = File::create(output_path).map_err(|source| DumpError::OpenOutput {
            path: output_path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let report = self.dump(scene, &mut writer, output_path)?;
        writer.flush()?;

        info!(
            path = %output_path.display(),
            textures_written = report.textures_written(),
            textures_skipped = report.textures_skipped(),
            "Dump complete"
        );
        Ok(report)
    }

    /// Dump `scene` into `writer`
    ///
    /// `output_path` is only used to derive texture file names.
    pub fn dump<W: Write>(
        &self,
        scene: &Scene,
        writer: &mut W,
        output_path: &Path,
    ) -> DumpResult<DumpReport> {
        info!(
            meshes = scene.meshes.len(),
            animations = scene.animations.len(),
            textures = scene.textures.len(),
            "Dumping scene"
        );

        instrument_stage("meshes", || -> io::Result<()> {
            for (i, mesh) in scene.meshes.iter().enumerate() {
                debug!(
                    index = i,
                    vertices = mesh.num_vertices,
                    faces = mesh.num_faces(),
                    weights = mesh.num_weights(),
                    "Writing mesh"
                );
                write_mesh(writer, mesh)?;
            }
            Ok(())
        })?;

        instrument_stage("animations", || -> io::Result<()> {
            for anim in &scene.animations {
                debug!(name = %anim.name, channels = anim.channels.len(), "Writing animation");
                write_animation(writer, anim)?;
            }
            Ok(())
        })?;

        let nodes = instrument_stage("nodegraph", || -> io::Result<usize> {
            let nodes = count_nodes(&scene.root);
            writeln!(writer, "Nodegraph")?;
            writeln!(writer, "\tNodes: {nodes}")?;
            writeln!(writer)?;
            print_nodes(&scene.root, writer, "\t")?;
            writeln!(writer)?;
            Ok(nodes)
        })?;

        let textures = instrument_stage("textures", || -> io::Result<Vec<ExportOutcome>> {
            let mut outcomes = Vec::with_capacity(scene.textures.len());
            for (i, texture) in scene.textures.iter().enumerate() {
                let path = self.texture_path(output_path, i);
                writeln!(writer, "Emb. Texture")?;
                writeln!(writer, "\tExportPath: {}", path.display())?;
                writeln!(writer)?;

                debug!(
                    index = i,
                    compressed = texture.is_compressed(),
                    dimensions = ?texture.dimensions(),
                    "Exporting texture"
                );
                let outcome = if self.options.export_textures {
                    self.textures.export(texture, &path)
                } else {
                    debug!(index = i, "Texture export disabled");
                    ExportOutcome::Skipped {
                        path,
                        reason: SkipReason::Disabled,
                    }
                };
                outcomes.push(outcome);
            }
            Ok(outcomes)
        })?;

        Ok(DumpReport {
            meshes: scene.meshes.len(),
            animations: scene.animations.len(),
            nodes,
            textures,
        })
    }

    /// Image file name for texture `index`: the output path with its
    /// required extension replaced by `_tex<index>.<image ext>`
    ///
    /// Works on the raw OS string, so non UTF-8 paths are kept intact.
    pub fn texture_path(&self, output_path: &Path, index: usize) -> PathBuf {
        let required = OsStr::new(&self.options.required_extension);
        let dotfile = format!(".{}", self.options.required_extension);

        let mut name: OsString = if output_path.extension() == Some(required) {
            output_path.with_extension("").into_os_string()
        } else if output_path.file_name() == Some(OsStr::new(&dotfile)) {
            // A bare ".txt" has no stem, only a directory.
            output_path.with_file_name("").into_os_string()
        } else {
            output_path.as_os_str().to_os_string()
        };

        name.push(format!(
            "_tex{index}.{}",
            self.options.texture.format.extension()
        ));
        PathBuf::from(name)
    }
}

impl Default for SceneDumper {
    fn default() -> Self {
        Self::new(DumpOptions::default())
    }
}
