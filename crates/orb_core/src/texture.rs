//! Texture loading and caching for materials.
//!
//! Image decoding is delegated to a [`PixelSource`]. A [`Texture`] copies the
//! decoded pixels once at load time and never touches the decoder again, so
//! it can be sampled from any number of render threads without locking.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use orb_math::{from_srgb, Color, Interval, Vec3};
use thiserror::Error;

/// Gamma used to linearize texture pixels when none is given.
pub const DEFAULT_TEXTURE_GAMMA: f32 = 2.2;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image: a width x height grid of 8-bit sRGB samples.
///
/// This is the only thing textures need from an image decoder.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Raw (r, g, b) at integer coordinates, row 0 at the top.
    fn raw_pixel(&self, x: u32, y: u32) -> [u8; 3];
}

impl PixelSource for image::RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn raw_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.get_pixel(x, y).0
    }
}

/// An image projected onto a sphere.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Gamma used to convert pixels from sRGB to linear space
    pub gamma: f32,

    /// Horizontal rotation applied before projection, in radians
    pub rotation_offset: f32,

    /// Raw sRGB pixels, row-major
    pixels: Vec<[u8; 3]>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Copy all pixels out of a decoded image.
    pub fn from_source(
        source: &dyn PixelSource,
        gamma: f32,
        rotation_offset: f32,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        let (width, height) = (source.width(), source.height());
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }

        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| source.raw_pixel(x, y))
            .collect();

        Ok(Self {
            width,
            height,
            gamma,
            rotation_offset,
            pixels,
            path: path.into(),
        })
    }

    /// Decode an image file. Supports whatever formats the `image` crate
    /// was built with (PNG, JPEG, BMP, ...).
    pub fn load(path: impl AsRef<Path>, gamma: f32, rotation_offset: f32) -> TextureResult<Self> {
        let path = path.as_ref();
        let reader = image::io::Reader::open(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = reader.with_guessed_format().map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = reader.decode().map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_source(
            &img.to_rgb8(),
            gamma,
            rotation_offset,
            path.to_string_lossy(),
        )
    }

    /// Look up the pixel at texture coordinates (s, t) in linear colour space.
    ///
    /// Values outside [0, 1] wrap around. `s` runs left to right and is
    /// shifted by the rotation offset; `t` runs top to bottom.
    pub fn pixel(&self, s: f32, t: f32) -> Color {
        let s = wrap(s + self.rotation_offset / (2.0 * PI));
        let t = wrap(t);

        let x = (s * (self.width - 1) as f32) as u32;
        let y = (t * (self.height - 1) as f32) as u32;

        let [r, g, b] = self.raw(x.min(self.width - 1), y.min(self.height - 1));
        from_srgb(Vec3::new(r as f32, g as f32, b as f32), self.gamma)
    }

    /// Look up the colour seen at a point on a sphere with unit `normal`.
    pub fn sample_sphere(&self, normal: Vec3) -> Color {
        let (s, t) = sphere_uv(normal);
        self.pixel(s, t)
    }

    fn raw(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[u8; 3]>()
    }
}

/// Standard spherical mapping of a unit normal to texture coordinates.
///
/// `s = atan2(x, z) / 2π + 0.5`, `t = acos(y) / π`, so the north pole
/// (+Y) maps to the top row.
pub fn sphere_uv(normal: Vec3) -> (f32, f32) {
    let s = normal.x.atan2(normal.z) / (2.0 * PI) + 0.5;
    let t = normal.y.clamp(-1.0, 1.0).acos() / PI;
    (s, t)
}

/// Wrap into [0, 1], leaving values already in range (including 1) alone.
fn wrap(v: f32) -> f32 {
    if Interval::UNIT.contains(v) {
        v
    } else {
        v.rem_euclid(1.0)
    }
}

/// Cache for loaded textures.
///
/// Materials that reference the same file with the same settings share one
/// decoded copy.
pub struct TextureCache {
    /// Cached textures by (resolved path, gamma bits, rotation bits)
    textures: HashMap<(PathBuf, u32, u32), Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str, gamma: f32, rotation_offset: f32) -> TextureResult<Arc<Texture>> {
        let full_path = self.resolve_path(path);
        let key = (full_path, gamma.to_bits(), rotation_offset.to_bits());

        if let Some(texture) = self.textures.get(&key) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(Texture::load(&key.0, gamma, rotation_offset)?);

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        self.textures.insert(key, texture.clone());
        Ok(texture)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}
