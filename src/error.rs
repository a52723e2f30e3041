//! Error types.
//!
//! Precondition violations and malformed input surface as errors to the direct
//! caller. Degenerate geometry (zero-determinant matrices, empty caches) and
//! read-protected surfaces never do: those paths degrade to "not handled".

use thiserror::Error;

use crate::tree::NodeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("cache() must be called before update_cache()")]
    CacheNotInitialized,
    #[error("node {0:?} does not exist (stale or destroyed id)")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is not a container")]
    NotAContainer(NodeId),
    #[error("cannot add {child:?} to {parent:?}: it is the parent or one of its ancestors")]
    CyclicHierarchy { parent: NodeId, child: NodeId },
    #[error("child index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("failed to allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("color matrix needs 20 or 25 values, got {len}")]
    InvalidColorMatrix { len: usize },
    #[error("failed to decode image: {0}")]
    ImageDecode(String),
    #[error("failed to encode surface: {0}")]
    Encode(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Errors raised by [`Graphics::decode_path`](crate::graphics::Graphics::decode_path).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bad path data (@{offset}): {token}")]
    InvalidHeader { offset: usize, token: char },
    #[error("bad path data (@{offset}): {token} is not a base64 digit")]
    InvalidCharacter { offset: usize, token: char },
    #[error("bad path data (@{offset}): unexpected end of input")]
    UnexpectedEnd { offset: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("invalid color syntax: {0}")]
    Invalid(String),
    #[error("unknown color name: {0}")]
    UnknownName(String),
}

/// Pixel access failures on a [`Surface`](crate::surface::Surface).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface pixels are read-protected (a tainted image was drawn into it)")]
    ReadProtected,
    #[error("region {width}x{height} at ({x}, {y}) is outside the surface")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

pub type Result<T> = std::result::Result<T, SceneError>;
