// src/ui/curve_cache.rs
use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bevy::log::warn;
use bevy::prelude::Resource;
use bevy_egui::egui;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CurveDecodeError {
    #[error("curve image is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("curve image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
}

pub fn decode_curve_image(base64_png: &str) -> Result<egui::ColorImage, CurveDecodeError> {
    let bytes = BASE64.decode(base64_png.trim())?;
    let rgba = image::load_from_memory(&bytes)?.into_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Textures for curve images of the current run. A failed decode is cached as
/// `None` so it is not retried every frame.
#[derive(Resource, Default)]
pub struct CurveTextureCache {
    run_id: Option<Uuid>,
    textures: HashMap<usize, Option<egui::TextureHandle>>,
}

impl CurveTextureCache {
    pub fn texture(
        &mut self,
        ctx: &egui::Context,
        run_id: Uuid,
        index: usize,
        base64_png: &str,
    ) -> Option<&egui::TextureHandle> {
        if self.run_id != Some(run_id) {
            self.textures.clear();
            self.run_id = Some(run_id);
        }
        self.textures
            .entry(index)
            .or_insert_with(|| match decode_curve_image(base64_png) {
                Ok(image) => Some(ctx.load_texture(
                    format!("curve-{}-{}", run_id, index),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    warn!("Component {} curve: {}", index + 1, e);
                    None
                }
            })
            .as_ref()
    }
}
