//! In-memory scene model
//!
//! A [`Scene`] is built once (by a loader or by hand) and then only
//! borrowed by the exporters. Optional per-vertex attributes are modelled
//! as `Option`s rather than sentinel values, so "absent" and "empty" never
//! get confused.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result, ResultExt};
use crate::types::{Quat, Vec3};

/// Number of UV channel slots on a mesh
pub const MAX_UV_CHANNELS: usize = 4;

/// Number of vertex color set slots on a mesh
pub const MAX_COLOR_SETS: usize = 4;

/// Root aggregate of a loaded asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub animations: Vec<Animation>,
    /// Embedded textures, identified only by their position
    #[serde(default)]
    pub textures: Vec<Texture>,
    pub root: Node,
}

impl Scene {
    /// Create a scene with the given root node and nothing else
    pub fn new(root: Node) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Check buffer sizes and cross references of meshes and nodes
    ///
    /// Textures are left out: a broken texture only costs its own image
    /// file at export time. See [`Scene::invalid_textures`].
    pub fn validate(&self) -> Result<()> {
        for (i, mesh) in self.meshes.iter().enumerate() {
            mesh.validate().with_context(|| format!("mesh {i}"))?;
        }

        for (_, node) in self.root.walk() {
            if let Some(&index) = node.meshes.iter().find(|&&m| m as usize >= self.meshes.len()) {
                return Err(Error::invalid_scene(format!(
                    "node '{}' references mesh {} but the scene has {} meshes",
                    node.name,
                    index,
                    self.meshes.len()
                )));
            }
        }

        Ok(())
    }

    /// Textures whose data cannot describe an image, with the reason
    pub fn invalid_textures(&self) -> impl Iterator<Item = (usize, Error)> + '_ {
        self.textures
            .iter()
            .enumerate()
            .filter_map(|(i, texture)| texture.validate().err().map(|err| (i, err)))
    }
}

/// One entry of the node hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub name: String,
    /// Indices into [`Scene::meshes`]
    #[serde(default)]
    pub meshes: Vec<u32>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = u32>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first, pre-order walk over this node and all descendants.
    ///
    /// Yields `(depth, node)` with the receiver at depth 0. Siblings come out
    /// in stored order. Uses an explicit stack, so deep hierarchies do not
    /// grow the call stack.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

/// Iterator returned by [`Node::walk`]
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// Tangent and bitangent streams, always present together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TangentFrame {
    pub tangents: Vec<f32>,
    pub bitangents: Vec<f32>,
}

/// One texture coordinate channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvChannel {
    /// Components per vertex (2 or 3)
    pub components: u8,
    pub coords: Vec<f32>,
}

impl UvChannel {
    pub fn new(components: u8, coords: Vec<f32>) -> Self {
        Self { components, coords }
    }

    /// Coordinates of one vertex, `None` if out of range
    pub fn get(&self, vertex: usize) -> Option<&[f32]> {
        let n = usize::from(self.components);
        let start = vertex.checked_mul(n)?;
        self.coords.get(start..start.checked_add(n)?)
    }
}

/// Drawable geometry block: vertex streams, triangles and bones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub num_vertices: usize,
    /// 3 floats per vertex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<f32>>,
    /// 3 floats per vertex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangents_and_bitangents: Option<TangentFrame>,
    #[serde(default, deserialize_with = "slots")]
    pub uv_channels: [Option<UvChannel>; MAX_UV_CHANNELS],
    /// RGBA, 4 floats per vertex
    #[serde(default, deserialize_with = "slots")]
    pub color_sets: [Option<Vec<f32>>; MAX_COLOR_SETS],
    /// Triangles only
    #[serde(default)]
    pub faces: Vec<[u32; 3]>,
    #[serde(default)]
    pub bones: Vec<Bone>,
}

impl Mesh {
    /// Create a mesh with `num_vertices` vertices and no attributes
    pub fn new(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            ..Self::default()
        }
    }

    pub fn with_positions(mut self, positions: Vec<f32>) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_tangents(mut self, tangents: Vec<f32>, bitangents: Vec<f32>) -> Self {
        self.tangents_and_bitangents = Some(TangentFrame { tangents, bitangents });
        self
    }

    /// Fill UV slot `index`; indices past [`MAX_UV_CHANNELS`] are dropped
    pub fn with_uv_channel(mut self, index: usize, channel: UvChannel) -> Self {
        match self.uv_channels.get_mut(index) {
            Some(slot) => *slot = Some(channel),
            None => tracing::warn!(index, max = MAX_UV_CHANNELS, "Ignoring UV channel past the last slot"),
        }
        self
    }

    /// Fill color slot `index`; indices past [`MAX_COLOR_SETS`] are dropped
    pub fn with_color_set(mut self, index: usize, colors: Vec<f32>) -> Self {
        match self.color_sets.get_mut(index) {
            Some(slot) => *slot = Some(colors),
            None => tracing::warn!(index, max = MAX_COLOR_SETS, "Ignoring color set past the last slot"),
        }
        self
    }

    pub fn with_faces(mut self, faces: Vec<[u32; 3]>) -> Self {
        self.faces = faces;
        self
    }

    pub fn with_bone(mut self, bone: Bone) -> Self {
        self.bones.push(bone);
        self
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }

    pub fn has_positions(&self) -> bool {
        self.positions.is_some()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_tangents_and_bitangents(&self) -> bool {
        self.tangents_and_bitangents.is_some()
    }

    /// Whether UV slot `index` holds data (out of range is "absent")
    pub fn has_uv_coords(&self, index: usize) -> bool {
        matches!(self.uv_channels.get(index), Some(Some(_)))
    }

    /// Whether color slot `index` holds data (out of range is "absent")
    pub fn has_vertex_colors(&self, index: usize) -> bool {
        matches!(self.color_sets.get(index), Some(Some(_)))
    }

    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }

    /// UV channels counted from slot 0, stopping at the first empty slot.
    ///
    /// A channel stored behind an empty slot is never yielded.
    pub fn uv_channels(&self) -> impl Iterator<Item = (usize, &UvChannel)> + '_ {
        self.uv_channels.iter().map_while(Option::as_ref).enumerate()
    }

    /// Color sets counted from slot 0, stopping at the first empty slot
    pub fn color_sets(&self) -> impl Iterator<Item = (usize, &[f32])> + '_ {
        self.color_sets
            .iter()
            .map_while(|set| set.as_deref())
            .enumerate()
    }

    pub fn position(&self, vertex: usize) -> Option<[f32; 3]> {
        self.positions.as_deref().and_then(|p| element(p, vertex))
    }

    pub fn normal(&self, vertex: usize) -> Option<[f32; 3]> {
        self.normals.as_deref().and_then(|n| element(n, vertex))
    }

    pub fn tangent(&self, vertex: usize) -> Option<[f32; 3]> {
        self.tangents_and_bitangents
            .as_ref()
            .and_then(|frame| element(&frame.tangents, vertex))
    }

    pub fn bitangent(&self, vertex: usize) -> Option<[f32; 3]> {
        self.tangents_and_bitangents
            .as_ref()
            .and_then(|frame| element(&frame.bitangents, vertex))
    }

    /// Total number of (vertex, weight) pairs across all bones
    pub fn num_weights(&self) -> usize {
        self.bones.iter().map(|b| b.weights.len()).sum()
    }

    /// Check that every buffer matches the vertex/face counts and that all
    /// indices are in range
    pub fn validate(&self) -> Result<()> {
        let v = self.num_vertices;

        check_len("positions", self.positions.as_deref(), 3 * v)?;
        check_len("normals", self.normals.as_deref(), 3 * v)?;
        if let Some(frame) = &self.tangents_and_bitangents {
            check_len("tangents", Some(frame.tangents.as_slice()), 3 * v)?;
            check_len("bitangents", Some(frame.bitangents.as_slice()), 3 * v)?;
        }

        for (i, channel) in self.uv_channels.iter().enumerate() {
            let Some(channel) = channel else { continue };
            if !(2..=3).contains(&channel.components) {
                return Err(Error::invalid_scene(format!(
                    "uv{} has {} components per vertex, expected 2 or 3",
                    i, channel.components
                )));
            }
            let expected = usize::from(channel.components) * v;
            check_len(&format!("uv{i}"), Some(channel.coords.as_slice()), expected)?;
        }

        for (i, set) in self.color_sets.iter().enumerate() {
            check_len(&format!("col{i}"), set.as_deref(), 4 * v)?;
        }

        for (i, face) in self.faces.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&idx| idx as usize >= v) {
                return Err(Error::invalid_scene(format!(
                    "face {i} references vertex {index} of {v}"
                )));
            }
        }

        for bone in &self.bones {
            if let Some(w) = bone.weights.iter().find(|w| w.vertex as usize >= v) {
                return Err(Error::invalid_scene(format!(
                    "bone '{}' weights vertex {} of {}",
                    bone.name, w.vertex, v
                )));
            }
        }

        Ok(())
    }
}

/// Read up to `N` slots from a sequence; missing trailing slots are empty
fn slots<'de, D, T, const N: usize>(deserializer: D) -> std::result::Result<[Option<T>; N], D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Vec::<Option<T>>::deserialize(deserializer)?;
    if entries.len() > N {
        let expected = format!("at most {N} entries");
        return Err(D::Error::invalid_length(entries.len(), &expected.as_str()));
    }

    let mut slots: [Option<T>; N] = std::array::from_fn(|_| None);
    for (slot, entry) in slots.iter_mut().zip(entries) {
        *slot = entry;
    }
    Ok(slots)
}

fn element<const N: usize>(buffer: &[f32], index: usize) -> Option<[f32; N]> {
    let start = index.checked_mul(N)?;
    buffer.get(start..start.checked_add(N)?)?.try_into().ok()
}

fn check_len(what: &str, buffer: Option<&[f32]>, expected: usize) -> Result<()> {
    match buffer {
        Some(buffer) if buffer.len() != expected => Err(Error::invalid_scene(format!(
            "{what} holds {} floats, expected {expected}",
            buffer.len()
        ))),
        _ => Ok(()),
    }
}

/// Named skeletal influence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub weights: Vec<VertexWeight>,
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: Vec::new(),
        }
    }

    pub fn with_weight(mut self, vertex: u32, weight: f32) -> Self {
        self.weights.push(VertexWeight { vertex, weight });
        self
    }
}

/// Influence of a bone on one vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// Named, time-keyed set of per-bone transform tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    /// Duration in ticks
    pub duration: f64,
    pub ticks_per_second: f64,
    #[serde(default)]
    pub channels: Vec<BoneAnim>,
}

/// Keyframe tracks of a single bone.
///
/// The three tracks are sized and timed independently of each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneAnim {
    pub bone: String,
    #[serde(default)]
    pub rotation_keys: Vec<KeyFrame<Quat>>,
    #[serde(default)]
    pub scaling_keys: Vec<KeyFrame<Vec3>>,
    #[serde(default)]
    pub position_keys: Vec<KeyFrame<Vec3>>,
}

impl BoneAnim {
    pub fn new(bone: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            ..Self::default()
        }
    }
}

/// Value of a track at a given time (in ticks)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame<T> {
    pub time: f64,
    pub value: T,
}

impl<T> KeyFrame<T> {
    pub fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Embedded raster image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Texture {
    /// Raw RGBA8 pixels, row-major, `width * height * 4` bytes
    Texels {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
    /// An encoded image file (PNG, BMP, ...) stored verbatim
    Compressed {
        /// File extension of the encoded data, e.g. "png"; may be empty
        #[serde(default)]
        format_hint: String,
        data: Vec<u8>,
    },
}

impl Texture {
    pub fn texels(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Texture::Texels { width, height, rgba }
    }

    pub fn compressed(format_hint: impl Into<String>, data: Vec<u8>) -> Self {
        Texture::Compressed {
            format_hint: format_hint.into(),
            data,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Texture::Compressed { .. })
    }

    /// Pixel dimensions, known only for uncompressed textures
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Texture::Texels { width, height, .. } => Some((*width, *height)),
            Texture::Compressed { .. } => None,
        }
    }

    /// Check that raw pixel data matches the declared dimensions
    pub fn validate(&self) -> Result<()> {
        match self {
            Texture::Texels { width, height, rgba } => {
                let expected = u64::from(*width) * u64::from(*height) * 4;
                if rgba.len() as u64 != expected {
                    return Err(Error::invalid_scene(format!(
                        "{width}x{height} texture holds {} bytes, expected {expected}",
                        rgba.len()
                    )));
                }
                Ok(())
            }
            Texture::Compressed { data, .. } if data.is_empty() => {
                Err(Error::invalid_scene("compressed texture has no data"))
            }
            Texture::Compressed { .. } => Ok(()),
        }
    }
}
