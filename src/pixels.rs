//! Image normalizer: arbitrary upload bytes → canonical 3-channel RGB pixels.

use image::{DynamicImage, RgbImage};

use crate::error::ClassifyError;

/// Decoded request image, always RGB8 in (height, width, 3) order.
///
/// Grayscale sources are channel-replicated and alpha is dropped at decode
/// time, so every consumer can assume exactly three channels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelImage {
    rgb: RgbImage,
}

impl PixelImage {
    pub const CHANNELS: usize = 3;

    /// Decode PNG/JPEG/... bytes, sniffing the format from content.
    pub fn decode(bytes: &[u8]) -> Result<Self, ClassifyError> {
        if bytes.is_empty() {
            return Err(ClassifyError::Decode("empty upload".into()));
        }
        let dynamic = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(dynamic))
    }

    pub fn from_dynamic(img: DynamicImage) -> Self {
        Self { rgb: img.to_rgb8() }
    }

    pub fn from_rgb(rgb: RgbImage) -> Self {
        Self { rgb }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub fn channels(&self) -> usize {
        Self::CHANNELS
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.rgb.height() as usize,
            self.rgb.width() as usize,
            Self::CHANNELS,
        )
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.rgb
    }
}
