use std::path::Path;

use image::{imageops, DynamicImage, Rgb, RgbImage};

use crate::shared::frame::Frame;
use crate::video::domain::surface::Surface;

/// An in-memory RGB canvas backed by the `image` crate.
///
/// Used by headless hosts to composite frames and write snapshots.
pub struct ImageSurface {
    canvas: RgbImage,
}

impl ImageSurface {
    /// A black canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbImage::from_pixel(width, height, Rgb([0, 0, 0])),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgb([0, 0, 0]);
        }
    }

    /// Writes the canvas to an image file, format chosen by extension.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.canvas.save(path)?;
        Ok(())
    }
}

impl Surface for ImageSurface {
    fn blit(&mut self, frame: &Frame, position: (i64, i64)) {
        let Some(image) = frame.to_dynamic_image() else {
            log::warn!(
                "Cannot draw frame with {} channels",
                frame.channels()
            );
            return;
        };
        let rgb = match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.into_rgb8(),
        };
        imageops::replace(&mut self.canvas, &rgb, position.0, position.1);
    }
}
