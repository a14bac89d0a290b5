//! scenedump Core Library
//!
//! This crate provides the in-memory scene model, shared math types,
//! logging setup and error handling used by all scenedump components.

pub mod error;
pub mod logging;
pub mod scene;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use scene::{
    Animation, Bone, BoneAnim, KeyFrame, Mesh, Node, Scene, TangentFrame, Texture, UvChannel,
    VertexWeight, MAX_COLOR_SETS, MAX_UV_CHANNELS,
};
pub use types::{Quat, Vec3};
