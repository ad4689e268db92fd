//! Skybox cubemap
//!
//! Faces are stored RGBA8 in wgpu layer order: +X, -X, +Y, -Y, +Z, -Z.

use std::path::{Path, PathBuf};

use glam::Vec3;

use super::{RenderError, RenderResult};

/// File stems of the six faces, in layer order
pub const FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

const FACE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

/// Six square RGBA8 images of equal size
#[derive(Clone)]
pub struct CubemapFaces {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl std::fmt::Debug for CubemapFaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CubemapFaces")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl CubemapFaces {
    /// Load faces from `dir`, or fall back to a gradient sky with a warning.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        match Self::try_load(dir) {
            Ok(faces) => {
                log::info!("Loaded skybox from {} ({}px faces)", dir.display(), faces.size);
                faces
            }
            Err(err) => {
                log::warn!("{err}; using a generated sky");
                Self::gradient(64)
            }
        }
    }

    pub fn try_load(dir: &Path) -> RenderResult<Self> {
        let mut size = None;
        let mut faces: [Vec<u8>; 6] = Default::default();

        for (slot, name) in faces.iter_mut().zip(FACE_NAMES) {
            let path = find_face(dir, name).ok_or_else(|| RenderError::Asset {
                path: dir.join(name),
                reason: "missing skybox face".to_string(),
            })?;
            let image = image::open(&path)
                .map_err(|err| RenderError::Asset {
                    path: path.clone(),
                    reason: err.to_string(),
                })?
                .to_rgba8();

            let (width, height) = image.dimensions();
            if width != height || size.is_some_and(|s| s != width) {
                return Err(RenderError::Asset {
                    path,
                    reason: format!("face is {width}x{height}, faces must be equal squares"),
                });
            }
            size = Some(width);
            *slot = image.into_raw();
        }

        Ok(Self {
            size: size.unwrap_or(1),
            faces,
        })
    }

    /// Procedural sky: blue overhead fading to a pale horizon and dark ground.
    pub fn gradient(size: u32) -> Self {
        let size = size.max(1);
        let zenith = Vec3::new(0.18, 0.36, 0.72);
        let horizon = Vec3::new(0.75, 0.82, 0.9);
        let ground = Vec3::new(0.2, 0.19, 0.18);

        let faces = std::array::from_fn(|face| {
            let mut pixels = Vec::with_capacity((size * size * 4) as usize);
            for y in 0..size {
                for x in 0..size {
                    let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
                    let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
                    let up = face_direction(face, u, v).normalize().y;
                    let color = if up >= 0.0 {
                        horizon.lerp(zenith, up.sqrt())
                    } else {
                        horizon.lerp(ground, (-up * 4.0).min(1.0))
                    };
                    let rgb = (color * 255.0).round().to_array();
                    pixels.extend_from_slice(&[rgb[0] as u8, rgb[1] as u8, rgb[2] as u8, 255]);
                }
            }
            pixels
        });

        Self { size, faces }
    }

    pub fn bytes_per_face(&self) -> usize {
        (self.size * self.size * 4) as usize
    }
}

fn find_face(dir: &Path, name: &str) -> Option<PathBuf> {
    FACE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|path| path.is_file())
}

/// Direction through texel `(u, v)` of a cube face, both in `-1..1`
fn face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mechanics_skybox_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn gradient_faces_are_full_size() {
        let sky = CubemapFaces::gradient(8);
        for face in &sky.faces {
            assert_eq!(face.len(), sky.bytes_per_face());
        }
        // Top face is bluer than the bottom one.
        assert!(sky.faces[2][2] > sky.faces[3][2]);
    }

    #[test]
    fn missing_directory_falls_back() {
        let sky = CubemapFaces::load("no/such/skybox");
        assert_eq!(sky.size, 64);
    }

    #[test]
    fn loads_png_faces() {
        let dir = temp_dir("png");
        for name in FACE_NAMES {
            image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]))
                .save(dir.join(format!("{name}.png")))
                .unwrap();
        }
        let sky = CubemapFaces::try_load(&dir).unwrap();
        assert_eq!(sky.size, 4);
        assert_eq!(&sky.faces[5][..4], &[10, 20, 30, 255]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let dir = temp_dir("mismatch");
        for (i, name) in FACE_NAMES.iter().enumerate() {
            let size = if i == 3 { 8 } else { 4 };
            image::RgbaImage::new(size, size)
                .save(dir.join(format!("{name}.png")))
                .unwrap();
        }
        assert!(matches!(
            CubemapFaces::try_load(&dir),
            Err(RenderError::Asset { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
