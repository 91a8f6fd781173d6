//! Errors raised while building scenes. Rendering itself cannot fail.

use orb_core::{Acceleration, TextureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Acceleration structure '{0}' is not implemented")]
    UnsupportedAcceleration(Acceleration),

    #[error("Sphere references unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("Sphere radius must be positive, got {radius}")]
    InvalidSphere { radius: f32 },

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),
}
