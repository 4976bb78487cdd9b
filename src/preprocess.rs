//! Per-model input preparation: resize, cast, scale, lay out as a batch of one.

use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::pixels::PixelImage;

/// ImageNet normalization mean values (RGB)
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet normalization std values (RGB)
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// [1, H, W, 3] (Keras / TF exports)
    Nhwc,
    /// [1, 3, H, W] (PyTorch exports)
    Nchw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    /// 0..255 as-is; the model rescales internally.
    Raw,
    /// x / 127.5 - 1, i.e. [-1, 1].
    MobileNet,
    /// (x / 255 - mean) / std per channel.
    ImageNet,
}

impl Scaling {
    fn apply(self, v: u8, channel: usize) -> f32 {
        let x = v as f32;
        match self {
            Self::Raw => x,
            Self::MobileNet => x / 127.5 - 1.0,
            Self::ImageNet => (x / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
        }
    }
}

/// What one model expects as input, and whether its output still needs softmax.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub input_size: u32,
    pub layout: Layout,
    pub scaling: Scaling,
    pub softmax: bool,
}

impl ModelSpec {
    /// General-purpose ImageNet classifier (MobileNetV2, 224², [-1,1]).
    pub fn mobilenet_v2() -> Self {
        Self {
            name: "plant-relevance".into(),
            input_size: 224,
            layout: Layout::Nhwc,
            scaling: Scaling::MobileNet,
            softmax: false,
        }
    }

    /// Potato disease model; rescaling is baked into the network.
    pub fn potato_disease(input_size: u32) -> Self {
        Self {
            name: "potato-disease".into(),
            input_size,
            layout: Layout::Nhwc,
            scaling: Scaling::Raw,
            softmax: false,
        }
    }
}

/// Resize (bilinear) to `spec.input_size`² and build the float batch tensor.
pub fn to_tensor(image: &PixelImage, spec: &ModelSpec) -> Array4<f32> {
    let size = spec.input_size;
    let resized;
    let rgb = if image.width() == size && image.height() == size {
        image.as_rgb()
    } else {
        resized = imageops::resize(image.as_rgb(), size, size, FilterType::Triangle);
        &resized
    };

    let s = size as usize;
    match spec.layout {
        Layout::Nhwc => Array4::from_shape_fn((1, s, s, 3), |(_, y, x, c)| {
            spec.scaling.apply(rgb.get_pixel(x as u32, y as u32)[c], c)
        }),
        Layout::Nchw => Array4::from_shape_fn((1, 3, s, s), |(_, c, y, x)| {
            spec.scaling.apply(rgb.get_pixel(x as u32, y as u32)[c], c)
        }),
    }
}
