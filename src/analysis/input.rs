// src/analysis/input.rs
//! Input Normalizer
//!
//! Turns the free-text SMILES block and the uploaded structure images into the
//! ordered list of components analysed by one run.
//!
//! ## Ordering
//!
//! All SMILES lines come first (in the order typed), then all images (in the
//! order picked). The position in that concatenation is the component index for
//! the whole run, and the display id is derived from it.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bevy::log::{debug, warn};
use image::ImageFormat;
use unicode_normalization::UnicodeNormalization;

use super::error::AnalysisError;

/// Raw bytes of a picked structure image.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// An image converted to the portable encoding sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub name: String,
    pub mime_type: String,
    /// Standard base64, no data-URL prefix.
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Smiles,
    Image,
}

impl InputKind {
    pub fn label(self) -> &'static str {
        match self {
            InputKind::Smiles => "SMILES",
            InputKind::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSource {
    Smiles(String),
    Image(EncodedImage),
}

/// One component of a run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInput {
    pub source: ComponentSource,
    pub display_id: String,
}

impl ComponentInput {
    pub fn kind(&self) -> InputKind {
        match self.source {
            ComponentSource::Smiles(_) => InputKind::Smiles,
            ComponentSource::Image(_) => InputKind::Image,
        }
    }
}

pub fn display_id(index: usize, kind: InputKind) -> String {
    format!("Component {} ({})", index + 1, kind.label())
}

/// NFKC-folds the block (full-width characters from CJK input methods become
/// ASCII), trims every line and drops blank ones.
pub fn smiles_lines(text: &str) -> Vec<String> {
    let folded: String = text.nfkc().collect();
    folded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Display ids of the components a run will have, without needing the encoded
/// images. Used to seed the aggregate before anything is sent.
pub fn plan_components(smiles_block: &str, image_count: usize) -> Result<Vec<String>, AnalysisError> {
    let smiles_count = smiles_lines(smiles_block).len();
    if smiles_count == 0 && image_count == 0 {
        return Err(AnalysisError::no_input());
    }
    let ids = (0..smiles_count)
        .map(|i| display_id(i, InputKind::Smiles))
        .chain((0..image_count).map(|i| display_id(smiles_count + i, InputKind::Image)))
        .collect();
    Ok(ids)
}

pub fn normalize_inputs(
    smiles_block: &str,
    images: &[EncodedImage],
) -> Result<Vec<ComponentInput>, AnalysisError> {
    let lines = smiles_lines(smiles_block);
    if lines.is_empty() && images.is_empty() {
        return Err(AnalysisError::no_input());
    }

    let mut inputs = Vec::with_capacity(lines.len() + images.len());
    for smiles in lines {
        let index = inputs.len();
        inputs.push(ComponentInput {
            source: ComponentSource::Smiles(smiles),
            display_id: display_id(index, InputKind::Smiles),
        });
    }
    for image in images {
        let index = inputs.len();
        inputs.push(ComponentInput {
            source: ComponentSource::Image(image.clone()),
            display_id: display_id(index, InputKind::Image),
        });
    }
    debug!("Normalized {} component input(s)", inputs.len());
    Ok(inputs)
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

pub fn encode_image(blob: ImageBlob) -> Result<EncodedImage, AnalysisError> {
    let mime_type = image::guess_format(&blob.bytes)
        .ok()
        .and_then(mime_for)
        .ok_or_else(|| {
            AnalysisError::Validation(format!(
                "{} is not a PNG, JPEG, GIF or WebP image.",
                blob.name
            ))
        })?;
    Ok(EncodedImage {
        data: BASE64.encode(&blob.bytes),
        mime_type: mime_type.to_string(),
        name: blob.name,
    })
}

/// Encodes every blob on the blocking pool. Files are processed in parallel;
/// the result keeps the input order.
pub async fn encode_images(blobs: Vec<ImageBlob>) -> Result<Vec<EncodedImage>, AnalysisError> {
    let handles: Vec<_> = blobs
        .into_iter()
        .map(|blob| {
            let name = blob.name.clone();
            (name, tokio::task::spawn_blocking(move || encode_image(blob)))
        })
        .collect();

    let mut encoded = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        match handle.await {
            Ok(result) => encoded.push(result?),
            Err(e) => {
                warn!("Image encoding task for '{}' failed: {}", name, e);
                return Err(AnalysisError::Validation(format!("Could not encode {}.", name)));
            }
        }
    }
    Ok(encoded)
}

/// Reads picked files concurrently, keeping the pick order.
pub async fn read_image_files(paths: Vec<PathBuf>) -> Result<Vec<ImageBlob>, AnalysisError> {
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            tokio::spawn(async move {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                match tokio::fs::read(&path).await {
                    Ok(bytes) => Ok(ImageBlob { name, bytes }),
                    Err(e) => {
                        warn!("Failed to read image {:?}: {}", path, e);
                        Err(AnalysisError::Validation(format!("Could not read {}.", name)))
                    }
                }
            })
        })
        .collect();

    let mut blobs = Vec::with_capacity(handles.len());
    for handle in handles {
        let blob = handle
            .await
            .map_err(|e| AnalysisError::Validation(format!("Image read task failed: {}", e)))??;
        blobs.push(blob);
    }
    Ok(blobs)
}

pub async fn load_images(paths: Vec<PathBuf>) -> Result<Vec<EncodedImage>, AnalysisError> {
    let blobs = read_image_files(paths).await?;
    encode_images(blobs).await
}
