// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detection models

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size of exported YOLO models
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Grey used to pad letterboxed images
pub const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale factor applied to the original image
    pub scale: f32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Side of the square canvas
    pub target_size: u32,
}

impl Letterbox {
    /// Compute the letterbox for an image of the given size
    pub fn new(orig_w: u32, orig_h: u32, target_size: u32) -> Self {
        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                target_size,
            };
        }

        let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
        let (new_w, new_h) = scaled_dims(orig_w, orig_h, scale);

        Self {
            scale,
            offset_x: (target_size - new_w) / 2,
            offset_y: (target_size - new_h) / 2,
            target_size,
        }
    }

    /// Map a point from model input space back to the original image
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.offset_x as f32) / self.scale,
            (y - self.offset_y as f32) / self.scale,
        )
    }
}

fn scaled_dims(orig_w: u32, orig_h: u32, scale: f32) -> (u32, u32) {
    let new_w = ((orig_w as f32 * scale).round() as u32).max(1);
    let new_h = ((orig_h as f32 * scale).round() as u32).max(1);
    (new_w, new_h)
}

/// Resize preserving aspect ratio and centre on a grey square canvas
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let geometry = Letterbox::new(orig_w, orig_h, target_size);

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    if orig_w == 0 || orig_h == 0 {
        return (canvas, geometry);
    }

    let (new_w, new_h) = scaled_dims(orig_w, orig_h, geometry.scale);
    let resized = image
        .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
        .to_rgb8();

    imageops::replace(
        &mut canvas,
        &resized,
        geometry.offset_x as i64,
        geometry.offset_y as i64,
    );

    (canvas, geometry)
}

/// Preprocess an image for YOLO detection
///
/// Steps:
/// 1. Letterbox to `target_size` x `target_size`
/// 2. Scale RGB values to [0, 1]
/// 3. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detection(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (canvas, geometry) = letterbox(image, target_size);
    let size = target_size as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, geometry)
}
