//! Construction and configuration errors
//!
//! Geometric queries never fail: they report `Separated`/`Undecided` instead.
//! Errors only come from building shapes, wiring colliders to bodies, and
//! loading settings.

use thiserror::Error;

use crate::collide::BodyId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Polygon shape needs at least one vertex")]
    EmptyPolygon,

    #[error("Circle radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("Polygon vertex {0} is not finite")]
    NonFiniteVertex(usize),

    #[error("Unknown body {0:?}")]
    UnknownBody(BodyId),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization/Deserialization Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
