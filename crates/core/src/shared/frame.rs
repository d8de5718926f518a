use ndarray::ArrayView3;

use crate::shared::region::Region;

/// A single captured frame: contiguous pixel bytes in row-major order.
///
/// Color frames are packed RGB (3 channels); grayscale frames carry a single
/// channel. The index is the capture order and carries no other identity.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
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

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// True when the frame covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels inside `rect` into a new frame.
    ///
    /// The rectangle is clipped to the frame; a rectangle that falls entirely
    /// outside yields an empty (zero-area) frame.
    pub fn crop(&self, rect: &Region) -> Frame {
        let clipped = rect.clip_to(self.width, self.height);
        let x = clipped.x as usize;
        let y = clipped.y as usize;
        let w = clipped.width as usize;
        let h = clipped.height as usize;
        let channels = self.channels as usize;
        let stride = self.width as usize * channels;

        let mut data = Vec::with_capacity(w * h * channels);
        for row in y..y + h {
            let start = row * stride + x * channels;
            data.extend_from_slice(&self.data[start..start + w * channels]);
        }

        Frame::new(data, w as u32, h as u32, self.channels, self.index)
    }

    /// Converts the frame to an 8-bit luma image.
    pub fn to_luma(&self) -> image::GrayImage {
        match self.channels {
            1 => image::GrayImage::from_raw(self.width, self.height, self.data.clone())
                .unwrap_or_else(|| image::GrayImage::new(self.width, self.height)),
            _ => {
                let channels = self.channels as usize;
                let luma = self
                    .data
                    .chunks_exact(channels)
                    .map(|px| luma_from_rgb(px[0], px[1], px[2]))
                    .collect();
                image::GrayImage::from_raw(self.width, self.height, luma)
                    .unwrap_or_else(|| image::GrayImage::new(self.width, self.height))
            }
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// ITU-R BT.601 luma, the same weights OpenCV uses for RGB→GRAY.
fn luma_from_rgb(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region::new(x, y, w, h)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new(Vec::new(), 0, 10, 3, 0);
        assert!(frame.is_empty());
        assert!(!Frame::new(vec![0; 3], 1, 1, 3, 0).is_empty());
    }

    #[test]
    fn test_crop_copies_expected_pixels() {
        // 4x3 single-channel frame with values 0..12
        let data: Vec<u8> = (0..12).collect();
        let frame = Frame::new(data, 4, 3, 1, 7);
        let crop = frame.crop(&region(1, 1, 2, 2));
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.data(), &[5, 6, 9, 10]);
        assert_eq!(crop.index(), 7);
    }

    #[test]
    fn test_crop_full_frame_keeps_dimensions() {
        let frame = Frame::new(vec![1u8; 6 * 4 * 3], 6, 4, 3, 0);
        let crop = frame.crop(&region(0, 0, 6, 4));
        assert_eq!((crop.width(), crop.height()), (6, 4));
        assert_eq!(crop.data(), frame.data());
    }

    #[test]
    fn test_crop_outside_frame_is_empty() {
        let frame = Frame::new(vec![1u8; 4 * 4 * 3], 4, 4, 3, 0);
        let crop = frame.crop(&region(10, 10, 5, 5));
        assert!(crop.is_empty());
        assert!(crop.data().is_empty());
    }

    #[test]
    fn test_to_luma_uses_bt601_weights() {
        let frame = Frame::new(vec![255, 0, 0, 0, 255, 0], 2, 1, 3, 0);
        let luma = frame.to_luma();
        assert_eq!(luma.get_pixel(0, 0).0[0], 76);
        assert_eq!(luma.get_pixel(1, 0).0[0], 150);
    }

    #[test]
    fn test_to_luma_passes_through_grayscale() {
        let frame = Frame::new(vec![10, 20, 30, 40], 2, 2, 1, 0);
        let luma = frame.to_luma();
        assert_eq!(luma.as_raw(), &vec![10, 20, 30, 40]);
    }
}
