use std::io::Cursor;

use image::{DynamicImage, RgbaImage};
use lofty::prelude::*;
use lofty::probe::Probe;

use super::ArtworkError;

/// Decode image bytes, or the cover picture embedded in an audio file.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, ArtworkError> {
    let img = match image::guess_format(bytes) {
        Ok(_) => image::load_from_memory(bytes)?,
        Err(_) => embedded_cover(bytes)?,
    };
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ArtworkError::NoImage);
    }
    Ok(rgba)
}

fn embedded_cover(bytes: &[u8]) -> Result<DynamicImage, ArtworkError> {
    let tagged = Probe::new(Cursor::new(bytes)).guess_file_type()?.read()?;
    let tag = tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .ok_or(ArtworkError::NoImage)?;
    let picture = tag.pictures().first().ok_or(ArtworkError::NoImage)?;
    Ok(image::load_from_memory(picture.data())?)
}
