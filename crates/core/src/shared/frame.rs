use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

/// A single decoded video frame: contiguous pixel bytes in row-major order.
///
/// Pixel format conversion happens at the decoder boundary; playback code
/// treats the buffer as opaque and only moves it around.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// An all-black RGB frame, shown before anything has been decoded.
    pub fn black(width: u32, height: u32) -> Self {
        Self::new(
            vec![0u8; (width as usize) * (height as usize) * 3],
            width,
            height,
            3,
            0,
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Zero-based position of this frame within its stream.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Views the frame as an `image` buffer. Returns `None` for channel
    /// layouts other than gray, RGB and RGBA.
    pub fn to_dynamic_image(&self) -> Option<DynamicImage> {
        let (w, h, data) = (self.width, self.height, self.data.clone());
        match self.channels {
            1 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            _ => None,
        }
    }

    /// Builds a frame from an `image` buffer, converting to `channels`
    /// (1, 3 or 4; anything else is treated as RGB).
    pub fn from_dynamic_image(image: DynamicImage, channels: u8, index: u64) -> Self {
        let (width, height) = (image.width(), image.height());
        match channels {
            1 => Self::new(image.into_luma8().into_raw(), width, height, 1, index),
            4 => Self::new(image.into_rgba8().into_raw(), width, height, 4, index),
            _ => Self::new(image.into_rgb8().into_raw(), width, height, 3, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.size(), (2, 2));
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_black_frame_is_zeroed_rgb() {
        let frame = Frame::black(4, 3);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data().len(), 4 * 3 * 3);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::new(vec![100u8; 12], 2, 2, 3, 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3, 0);
    }

    #[test]
    fn test_dynamic_image_preserves_pixels() {
        // 2x1 RGB: first pixel red, second blue
        let frame = Frame::new(vec![255, 0, 0, 0, 0, 255], 2, 1, 3, 7);
        let image = frame.to_dynamic_image().unwrap().into_rgb8();
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 255]);

        let back = Frame::from_dynamic_image(DynamicImage::ImageRgb8(image), 3, 7);
        assert_eq!(back, frame);
    }

    #[test]
    fn test_unsupported_channel_layout_has_no_image() {
        let frame = Frame::new(vec![0u8; 4], 2, 1, 2, 0);
        assert!(frame.to_dynamic_image().is_none());
    }
}
