//! Artwork loading.
//!
//! `resolve` turns an artwork reference into a decoded bitmap. It never
//! fails: a missing reference is `Absent`, anything that goes wrong while
//! opening or decoding is `DecodeFailed`.

mod content;
mod decode;

pub use content::{ContentResolver, FsContentResolver};
pub use decode::decode;

use std::io::Read;
use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported locator scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    #[error("artwork exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("audio container error: {0}")]
    Container(#[from] lofty::error::LoftyError),

    #[error("no image in content")]
    NoImage,
}

/// Artwork for a single tick.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedArtwork {
    Bitmap(Arc<RgbaImage>),
    /// No reference was supplied.
    Absent,
    DecodeFailed,
}

impl DecodedArtwork {
    /// The bitmap, if it is present and has pixels.
    pub fn bitmap(&self) -> Option<&RgbaImage> {
        match self {
            DecodedArtwork::Bitmap(img) if img.width() > 0 && img.height() > 0 => Some(img),
            _ => None,
        }
    }
}

/// Load and decode `art_ref` through `resolver`, reading at most `max_bytes`.
pub fn resolve<R: ContentResolver + ?Sized>(
    resolver: &R,
    art_ref: Option<&str>,
    max_bytes: u64,
) -> DecodedArtwork {
    let Some(locator) = art_ref.filter(|r| !r.is_empty()) else {
        return DecodedArtwork::Absent;
    };

    match load(resolver, locator, max_bytes) {
        Ok(img) => {
            debug!(locator, width = img.width(), height = img.height(), "artwork decoded");
            DecodedArtwork::Bitmap(Arc::new(img))
        }
        Err(e) => {
            warn!(locator, "artwork unavailable: {e}");
            DecodedArtwork::DecodeFailed
        }
    }
}

fn load<R: ContentResolver + ?Sized>(
    resolver: &R,
    locator: &str,
    max_bytes: u64,
) -> Result<RgbaImage, ArtworkError> {
    // The stream is dropped at the end of this block, before decoding.
    let bytes = {
        let stream = resolver.open(locator)?;
        read_capped(stream, max_bytes)?
    };
    decode(&bytes)
}

fn read_capped(stream: impl Read, max_bytes: u64) -> Result<Vec<u8>, ArtworkError> {
    let mut buf = Vec::new();
    stream
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut buf)?;
    if buf.len() as u64 > max_bytes {
        return Err(ArtworkError::TooLarge { limit: max_bytes });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests;
