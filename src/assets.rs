use std::path::Path;

use anyhow::Context;
use image::{Rgba, RgbaImage};

use crate::mapper::Size;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceImage {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const REFERENCE_IMAGES: [ReferenceImage; 7] = [
    ReferenceImage { name: "grid_coords_426x240.png", width: 426, height: 240 },
    ReferenceImage { name: "grid_coords_640x360.png", width: 640, height: 360 },
    ReferenceImage { name: "grid_coords_854x480.png", width: 854, height: 480 },
    ReferenceImage { name: "grid_coords_1280x720.png", width: 1280, height: 720 },
    ReferenceImage { name: "grid_coords_1920x1080.png", width: 1920, height: 1080 },
    ReferenceImage { name: "grid_coords_2560x1440.png", width: 2560, height: 1440 },
    ReferenceImage { name: "grid_coords_3840x2160.png", width: 3840, height: 2160 },
];

pub const DEFAULT_IMAGE_INDEX: usize = 2;

const GRID_MINOR: u32 = 10;
const GRID_MAJOR: u32 = 50;

impl ReferenceImage {
    pub fn by_index(index: usize) -> anyhow::Result<Self> {
        REFERENCE_IMAGES.get(index).copied().with_context(|| {
            format!(
                "no reference image at index {index} (0..{})",
                REFERENCE_IMAGES.len()
            )
        })
    }

    pub fn original_size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Pixels for this entry, always at the table's native size. Falls back
    /// to a generated coordinate grid when the file is not in `dir`.
    pub fn load(&self, dir: &Path) -> anyhow::Result<RgbaImage> {
        let path = dir.join(self.name);
        if !path.exists() {
            log::warn!(
                "{} not found, generating a {}x{} grid",
                path.display(),
                self.width,
                self.height
            );
            return Ok(self.generate_grid());
        }
        let img = image::open(&path)
            .with_context(|| format!("decoding {}", path.display()))?
            .to_rgba8();
        if img.dimensions() != (self.width, self.height) {
            log::warn!(
                "{} is {}x{}, expected {}x{}; resizing",
                path.display(),
                img.width(),
                img.height(),
                self.width,
                self.height
            );
            return Ok(image::imageops::resize(
                &img,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            ));
        }
        Ok(img)
    }

    pub fn generate_grid(&self) -> RgbaImage {
        let minor = Rgba([210, 210, 210, 255]);
        let major = Rgba([120, 120, 120, 255]);
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if x % GRID_MAJOR == 0 || y % GRID_MAJOR == 0 {
                major
            } else if x % GRID_MINOR == 0 || y % GRID_MINOR == 0 {
                minor
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }
}
