use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::shared::error::PlaybackError;
use crate::shared::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(value: ResizeFilter) -> Self {
        match value {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Fits decoded frames to the size the host wants to draw them at.
///
/// With `keep_aspect_ratio` the picture is scaled to fit inside the
/// display size and centred on black bars; otherwise it is stretched.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScaler {
    native: (u32, u32),
    size: (u32, u32),
    keep_aspect_ratio: bool,
    filter: ResizeFilter,
}

impl FrameScaler {
    pub fn new(native_width: u32, native_height: u32) -> Self {
        Self {
            native: (native_width, native_height),
            size: (native_width, native_height),
            keep_aspect_ratio: false,
            filter: ResizeFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_keep_aspect_ratio(mut self, keep: bool) -> Self {
        self.keep_aspect_ratio = keep;
        self
    }

    pub fn native_size(&self) -> (u32, u32) {
        self.native
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    /// Native width over native height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.native.1 == 0 {
            return 0.0;
        }
        self.native.0 as f64 / self.native.1 as f64
    }

    pub fn keep_aspect_ratio(&self) -> bool {
        self.keep_aspect_ratio
    }

    pub fn set_keep_aspect_ratio(&mut self, keep: bool) {
        self.keep_aspect_ratio = keep;
    }

    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: ResizeFilter) {
        self.filter = filter;
    }

    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), PlaybackError> {
        if width == 0 || height == 0 {
            return Err(PlaybackError::InvalidArgument(format!(
                "size must be positive, got {width}x{height}"
            )));
        }
        self.size = (width, height);
        Ok(())
    }

    pub fn set_width(&mut self, width: u32) -> Result<(), PlaybackError> {
        if width == 0 {
            return Err(PlaybackError::InvalidArgument(
                "width must be positive".to_string(),
            ));
        }
        self.size.0 = width;
        Ok(())
    }

    pub fn set_height(&mut self, height: u32) -> Result<(), PlaybackError> {
        if height == 0 {
            return Err(PlaybackError::InvalidArgument(
                "height must be positive".to_string(),
            ));
        }
        self.size.1 = height;
        Ok(())
    }

    /// Returns `frame` at display size, borrowing it when no scaling is
    /// needed.
    pub fn scale<'a>(&self, frame: &'a Frame) -> Cow<'a, Frame> {
        if frame.size() == self.size {
            return Cow::Borrowed(frame);
        }
        let Some(image) = frame.to_dynamic_image() else {
            log::warn!(
                "Cannot scale frame with {} channels, drawing at native size",
                frame.channels()
            );
            return Cow::Borrowed(frame);
        };

        let (width, height) = self.size;
        let filter = FilterType::from(self.filter);
        let scaled = if self.keep_aspect_ratio {
            letterbox(&image, width, height, filter)
        } else {
            image.resize_exact(width, height, filter)
        };
        Cow::Owned(Frame::from_dynamic_image(
            scaled,
            frame.channels(),
            frame.index(),
        ))
    }
}

/// Scales `image` to fit inside `width`x`height` and centres it on black.
fn letterbox(image: &DynamicImage, width: u32, height: u32, filter: FilterType) -> DynamicImage {
    let (fit_w, fit_h) = fit_inside(image.width(), image.height(), width, height);
    let scaled = image.resize_exact(fit_w, fit_h, filter).into_rgb8();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    let x = (width - fit_w) / 2;
    let y = (height - fit_h) / 2;
    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
    DynamicImage::ImageRgb8(canvas)
}

/// Largest size with the source's aspect ratio that fits the bounds.
fn fit_inside(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (max_w, max_h);
    }
    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn white(width: u32, height: u32) -> Frame {
        Frame::new(
            vec![255u8; (width * height * 3) as usize],
            width,
            height,
            3,
            42,
        )
    }

    #[test]
    fn test_starts_at_native_size() {
        let scaler = FrameScaler::new(640, 360);
        assert_eq!(scaler.size(), (640, 360));
        assert_eq!(scaler.native_size(), (640, 360));
        assert_relative_eq!(scaler.aspect_ratio(), 16.0 / 9.0);
        assert!(!scaler.keep_aspect_ratio());
    }

    #[test]
    fn test_native_size_borrows() {
        let scaler = FrameScaler::new(4, 2);
        let frame = white(4, 2);
        assert!(matches!(scaler.scale(&frame), Cow::Borrowed(_)));
    }

    #[test]
    fn test_stretch_resizes_exactly() {
        let mut scaler = FrameScaler::new(4, 2).with_filter(ResizeFilter::Nearest);
        scaler.set_size(8, 8).unwrap();
        let frame = white(4, 2);
        let scaled = scaler.scale(&frame);
        assert_eq!(scaled.size(), (8, 8));
        assert_eq!(scaled.index(), 42);
        assert!(scaled.data().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_letterbox_adds_bars_top_and_bottom() {
        let mut scaler = FrameScaler::new(4, 2)
            .with_keep_aspect_ratio(true)
            .with_filter(ResizeFilter::Nearest);
        scaler.set_size(8, 8).unwrap();
        let frame = white(4, 2);
        let scaled = scaler.scale(&frame);
        assert_eq!(scaled.size(), (8, 8));

        let image = scaled.to_dynamic_image().unwrap().into_rgb8();
        // 4x2 fits 8x8 as 8x4, centred with two black rows above and below
        assert_eq!(image.get_pixel(4, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(4, 4).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(4, 7).0, [0, 0, 0]);
    }

    #[test]
    fn test_pillarbox_adds_bars_left_and_right() {
        let mut scaler = FrameScaler::new(2, 4)
            .with_keep_aspect_ratio(true)
            .with_filter(ResizeFilter::Nearest);
        scaler.set_size(8, 4).unwrap();
        let frame = white(2, 4);
        let scaled = scaler.scale(&frame);

        let image = scaled.to_dynamic_image().unwrap().into_rgb8();
        assert_eq!(image.get_pixel(0, 2).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(4, 2).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(7, 2).0, [0, 0, 0]);
    }

    #[rstest]
    #[case(0, 10)]
    #[case(10, 0)]
    #[case(0, 0)]
    fn test_set_size_rejects_zero(#[case] w: u32, #[case] h: u32) {
        let mut scaler = FrameScaler::new(4, 2);
        assert!(matches!(
            scaler.set_size(w, h),
            Err(PlaybackError::InvalidArgument(_))
        ));
        assert_eq!(scaler.size(), (4, 2));
    }

    #[test]
    fn test_set_width_and_height() {
        let mut scaler = FrameScaler::new(4, 2);
        scaler.set_width(10).unwrap();
        scaler.set_height(6).unwrap();
        assert_eq!(scaler.size(), (10, 6));
        assert!(scaler.set_width(0).is_err());
        assert!(scaler.set_height(0).is_err());
        assert_eq!(scaler.size(), (10, 6));
    }

    #[rstest]
    #[case((1920, 1080), (800, 800), (800, 450))]
    #[case((1080, 1920), (800, 800), (450, 800))]
    #[case((640, 480), (320, 240), (320, 240))]
    fn test_fit_inside(
        #[case] src: (u32, u32),
        #[case] bounds: (u32, u32),
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(fit_inside(src.0, src.1, bounds.0, bounds.1), expected);
    }

    #[test]
    fn test_filter_maps_to_image_filter() {
        assert_eq!(FilterType::from(ResizeFilter::Lanczos3), FilterType::Lanczos3);
        assert_eq!(ResizeFilter::default(), ResizeFilter::Triangle);
    }
}
