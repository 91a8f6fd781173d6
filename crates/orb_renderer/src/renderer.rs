//! Render drivers.
//!
//! Both drivers split the image into rows and shade them in parallel with
//! rayon. Every row owns its own RNG, seeded from the render seed and the
//! row index, so a render is reproducible for a fixed seed no matter how
//! rows are scheduled across threads.

use std::time::Instant;

use orb_math::{encode_bgr, Color, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::{Camera, PathtracingScene, Scene};

/// Settings for Whitted ray tracing.
#[derive(Debug, Clone)]
pub struct RaytraceOptions {
    /// Eye rays averaged per pixel
    pub super_sampling: u32,
    /// Shadow feelers per disk light
    pub shadow_samples: u32,
    /// Mirror bounces after the primary hit
    pub reflection_depth: u32,
    /// Standard deviation of the pixel jitter, in pixels
    pub gauss_sigma: f32,
    /// Output encoding gamma
    pub gamma: f32,
    pub seed: u64,
}

impl Default for RaytraceOptions {
    fn default() -> Self {
        Self {
            super_sampling: 1,
            shadow_samples: 1,
            reflection_depth: 2,
            gauss_sigma: 0.5,
            gamma: 2.2,
            seed: 0,
        }
    }
}

impl RaytraceOptions {
    pub fn with_super_sampling(mut self, super_sampling: u32) -> Self {
        self.super_sampling = super_sampling;
        self
    }

    pub fn with_shadow_samples(mut self, shadow_samples: u32) -> Self {
        self.shadow_samples = shadow_samples;
        self
    }

    pub fn with_reflection_depth(mut self, reflection_depth: u32) -> Self {
        self.reflection_depth = reflection_depth;
        self
    }

    pub fn with_gauss_sigma(mut self, gauss_sigma: f32) -> Self {
        self.gauss_sigma = gauss_sigma;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Settings for path tracing.
#[derive(Debug, Clone)]
pub struct PathtraceOptions {
    /// Paths averaged per pixel
    pub samples: u32,
    /// Maximum number of surface interactions per path
    pub recursion_depth: u32,
    /// Standard deviation of the pixel jitter, in pixels
    pub gauss_sigma: f32,
    /// Output encoding gamma
    pub gamma: f32,
    pub seed: u64,
}

impl Default for PathtraceOptions {
    fn default() -> Self {
        Self {
            samples: 1,
            recursion_depth: 4,
            gauss_sigma: 0.5,
            gamma: 2.2,
            seed: 0,
        }
    }
}

impl PathtraceOptions {
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_recursion_depth(mut self, recursion_depth: u32) -> Self {
        self.recursion_depth = recursion_depth;
        self
    }

    pub fn with_gauss_sigma(mut self, gauss_sigma: f32) -> Self {
        self.gauss_sigma = gauss_sigma;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Linear colour image, row-major with row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Encode as 8-bit B, G, R triples with stride `width * 3`.
    pub fn to_bgr(&self, gamma: f32) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&color| encode_bgr(color, gamma))
            .collect()
    }
}

/// Normalized device coordinates of the center of pixel (x, y).
///
/// y points up, so row 0 maps to the top of the picture plane. x is scaled
/// by the aspect ratio so pixels stay square for non-square images.
pub fn pixel_ndc(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    let aspect = width as f32 / height as f32;
    let u = 2.0 * (x as f32 + 0.5) / width as f32 - 1.0;
    let v = 1.0 - 2.0 * (y as f32 + 0.5) / height as f32;
    Vec2::new(u * aspect, v)
}

/// Generator for one row of the image.
fn row_rng(seed: u64, row: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Shade every pixel in parallel, one rayon task per row.
fn shade_rows<F>(width: u32, height: u32, seed: u64, shade: F) -> ImageBuffer
where
    F: Fn(Vec2, &mut StdRng) -> Color + Sync,
{
    let mut image = ImageBuffer::new(width, height);
    if image.pixels.is_empty() {
        return image;
    }

    image
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let mut rng = row_rng(seed, y);
            for (x, pixel) in row.iter_mut().enumerate() {
                let ndc = pixel_ndc(x as u32, y as u32, width, height);
                *pixel = shade(ndc, &mut rng);
            }
        });

    image
}

/// Gaussian jitter in NDC units for a sigma given in pixels. x is aspect
/// scaled, so a pixel is `2 / height` wide on both axes.
fn jitter_sigma(gauss_sigma: f32, height: u32) -> f32 {
    2.0 * gauss_sigma / height as f32
}

/// Whitted ray tracing driver.
pub struct Raytracer<'a> {
    camera: &'a Camera,
    scene: &'a Scene,
    options: RaytraceOptions,
}

impl<'a> Raytracer<'a> {
    pub fn new(camera: &'a Camera, scene: &'a Scene, mut options: RaytraceOptions) -> Self {
        if options.super_sampling == 0 {
            log::warn!("super_sampling of 0 raised to 1");
            options.super_sampling = 1;
        }
        Self {
            camera,
            scene,
            options,
        }
    }

    pub fn options(&self) -> &RaytraceOptions {
        &self.options
    }

    /// Render into a linear colour buffer.
    pub fn calculate_pixels(&self, width: u32, height: u32) -> ImageBuffer {
        let start = Instant::now();
        log::info!(
            "Ray tracing {}x{} ({} eye rays, {} shadow rays, depth {})",
            width,
            height,
            self.options.super_sampling,
            self.options.shadow_samples,
            self.options.reflection_depth
        );

        let sigma = jitter_sigma(self.options.gauss_sigma, height);
        let image = shade_rows(width, height, self.options.seed, |ndc, rng| {
            self.shade_pixel(ndc, sigma, rng)
        });

        log::info!("Ray tracing finished in {:.2?}", start.elapsed());
        image
    }

    /// Render into sRGB encoded B, G, R bytes.
    pub fn calculate_pixels_bgr(&self, width: u32, height: u32) -> Vec<u8> {
        self.calculate_pixels(width, height).to_bgr(self.options.gamma)
    }

    fn shade_pixel(&self, ndc: Vec2, sigma: f32, rng: &mut StdRng) -> Color {
        let options = &self.options;

        // A single sample goes straight through the pixel center
        if options.super_sampling == 1 {
            let ray = self.camera.create_lens_ray(ndc, rng);
            return self
                .scene
                .calculate_colour(&ray, options.shadow_samples, rng, options.reflection_depth);
        }

        let rays = self
            .camera
            .create_eye_rays(ndc, options.super_sampling as usize, sigma, rng);
        let sum: Color = rays
            .iter()
            .map(|ray| {
                self.scene
                    .calculate_colour(ray, options.shadow_samples, rng, options.reflection_depth)
            })
            .sum();
        sum / rays.len() as f32
    }
}

/// Path tracing driver.
pub struct Pathtracer<'a> {
    camera: &'a Camera,
    scene: &'a PathtracingScene,
    options: PathtraceOptions,
}

impl<'a> Pathtracer<'a> {
    pub fn new(camera: &'a Camera, scene: &'a PathtracingScene, mut options: PathtraceOptions) -> Self {
        if options.samples == 0 {
            log::warn!("samples of 0 raised to 1");
            options.samples = 1;
        }
        Self {
            camera,
            scene,
            options,
        }
    }

    pub fn options(&self) -> &PathtraceOptions {
        &self.options
    }

    /// Render into a linear colour buffer.
    pub fn calculate_pixels(&self, width: u32, height: u32) -> ImageBuffer {
        let start = Instant::now();
        log::info!(
            "Path tracing {}x{} ({} samples, depth {})",
            width,
            height,
            self.options.samples,
            self.options.recursion_depth
        );

        let sigma = jitter_sigma(self.options.gauss_sigma, height);
        let samples = self.options.samples;
        let depth = self.options.recursion_depth;

        let image = shade_rows(width, height, self.options.seed, |ndc, rng| {
            let mut sum = Color::ZERO;
            for _ in 0..samples {
                let ray = self.camera.create_jittered_ray(ndc, sigma, rng);
                sum += self.scene.calculate_colour(&ray, rng, depth);
            }
            sum / samples as f32
        });

        log::info!("Path tracing finished in {:.2?}", start.elapsed());
        image
    }

    /// Render into sRGB encoded B, G, R bytes.
    pub fn calculate_pixels_bgr(&self, width: u32, height: u32) -> Vec<u8> {
        self.calculate_pixels(width, height).to_bgr(self.options.gamma)
    }
}

/// Ray trace `scene` into a `width * height * 3` byte buffer, B, G, R order.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    width: u32,
    height: u32,
    options: &RaytraceOptions,
) -> Vec<u8> {
    Raytracer::new(camera, scene, options.clone()).calculate_pixels_bgr(width, height)
}

/// Path trace `scene` into a `width * height * 3` byte buffer, B, G, R order.
pub fn render_pathtraced(
    camera: &Camera,
    scene: &PathtracingScene,
    width: u32,
    height: u32,
    options: &PathtraceOptions,
) -> Vec<u8> {
    Pathtracer::new(camera, scene, options.clone()).calculate_pixels_bgr(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LightSource, Material, SceneObject, Sphere};
    use orb_core::Acceleration;
    use orb_math::Vec3;
    use std::f32::consts::FRAC_PI_2;
    use std::sync::Arc;

    fn sphere(center: Vec3, radius: f32, material: Material) -> Box<dyn SceneObject> {
        Box::new(Sphere::new(center, radius, Arc::new(material)).unwrap())
    }

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, FRAC_PI_2)
    }

    /// Red sphere filling the middle of the view, lit from the camera.
    fn red_scene() -> Scene {
        let red = Material::new(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.3), Vec3::ZERO);
        Scene::new(
            vec![sphere(Vec3::ZERO, 1.5, red)],
            vec![LightSource::new(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE).with_radius(0.5)],
            Acceleration::Bvh,
        )
        .unwrap()
        .with_ambient_light(Vec3::new(0.0, 0.0, 0.2))
    }

    #[test]
    fn test_image_buffer_layout() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, Vec3::new(1.0, 0.0, 0.0));
        image.set(0, 0, Vec3::new(0.0, 0.0, 1.0));

        assert_eq!(image.get(2, 1), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(image.pixels[5], Vec3::new(1.0, 0.0, 0.0));

        let bytes = image.to_bgr(2.2);
        assert_eq!(bytes.len(), 3 * 2 * 3);
        // Blue pixel first, stored B, G, R
        assert_eq!(&bytes[0..3], &[255, 0, 0]);
        // Red pixel at row 1, column 2
        let offset = (1 * 3 + 2) * 3;
        assert_eq!(&bytes[offset..offset + 3], &[0, 0, 255]);
    }

    #[test]
    fn test_pixel_ndc() {
        let top_left = pixel_ndc(0, 0, 100, 100);
        assert!((top_left.x - -0.99).abs() < 1e-6);
        assert!((top_left.y - 0.99).abs() < 1e-6);

        let bottom_right = pixel_ndc(99, 99, 100, 100);
        assert!((bottom_right.x - 0.99).abs() < 1e-6);
        assert!((bottom_right.y - -0.99).abs() < 1e-6);

        // Wide image: x spans the aspect ratio
        let right = pixel_ndc(199, 50, 200, 100);
        assert!((right.x - 1.99).abs() < 1e-5);
    }

    #[test]
    fn test_jitter_sigma_is_one_pixel_on_both_axes() {
        // A 200x100 image: neighbouring pixel centers differ by the same
        // NDC step horizontally and vertically
        let step_x = pixel_ndc(1, 50, 200, 100).x - pixel_ndc(0, 50, 200, 100).x;
        let step_y = pixel_ndc(0, 50, 200, 100).y - pixel_ndc(0, 51, 200, 100).y;
        assert!((step_x - step_y).abs() < 1e-5);
        assert!((jitter_sigma(1.0, 100) - step_x).abs() < 1e-5);
        assert!((jitter_sigma(0.5, 100) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_render_buffer_size_and_center() {
        let scene = red_scene();
        let bytes = render(&camera(), &scene, 16, 12, &RaytraceOptions::default());
        assert_eq!(bytes.len(), 16 * 12 * 3);

        // Center pixel sees the lit red sphere, corners the blue ambient
        let center = (6 * 16 + 8) * 3;
        assert!(bytes[center + 2] > 200);
        assert_eq!(&bytes[0..2], &[to_byte(0.2), 0]);
        assert_eq!(bytes[2], 0);
    }

    fn to_byte(linear: f32) -> u8 {
        (255.0 * linear.powf(1.0 / 2.2)) as u8
    }

    #[test]
    fn test_render_is_deterministic() {
        let scene = red_scene();
        let options = RaytraceOptions::default()
            .with_super_sampling(4)
            .with_shadow_samples(4)
            .with_seed(7);

        let a = render(&camera(), &scene, 24, 24, &options);
        let b = render(&camera(), &scene, 24, 24, &options);
        assert_eq!(a, b);

        // Row seeds do not depend on how rows are spread over threads
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let single = pool.install(|| render(&camera(), &scene, 24, 24, &options));
        assert_eq!(a, single);

        let c = render(&camera(), &scene, 24, 24, &options.clone().with_seed(8));
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_super_sampling_raised() {
        let scene = red_scene();
        let camera = camera();
        let tracer = Raytracer::new(&camera, &scene, RaytraceOptions::default().with_super_sampling(0));
        assert_eq!(tracer.options().super_sampling, 1);
    }

    #[test]
    fn test_empty_image() {
        let scene = red_scene();
        assert!(render(&camera(), &scene, 0, 10, &RaytraceOptions::default()).is_empty());
    }

    #[test]
    fn test_pathtraced_light_source() {
        let glow = Material::diffuse(Vec3::ZERO).with_emissive(Vec3::ONE);
        let scene = PathtracingScene::new(vec![sphere(Vec3::ZERO, 1.5, glow)], Acceleration::None).unwrap();
        let camera = camera();
        // No jitter, so every sample of the center pixel hits the emitter
        let options = PathtraceOptions::default()
            .with_samples(4)
            .with_gauss_sigma(0.0)
            .with_seed(3);

        let tracer = Pathtracer::new(&camera, &scene, options.clone());
        let image = tracer.calculate_pixels(9, 9);
        assert_eq!(image.get(4, 4), Vec3::ONE);
        assert_eq!(image.get(0, 0), Vec3::ZERO);

        let bytes = render_pathtraced(&camera, &scene, 9, 9, &options);
        assert_eq!(bytes, image.to_bgr(2.2));
    }
}
