//! Raster intake: pasted or dropped image bytes become Image items.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageReader;
use kurbo::{Point, Vec2};
use thiserror::Error;

use super::{BoardRef, Height, Item, ItemKind, ItemType};
use crate::config::EngineConfig;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Unrecognized image format")]
    UnknownFormat,
    #[error("Image has zero size")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// Build an Image item from encoded raster bytes.
///
/// The item is `min(natural width, image_max_width)` wide, keeps the source
/// aspect ratio, and is centred on `center`. The bytes are embedded as a
/// base64 `data:` URL.
pub fn image_item_from_bytes(
    bytes: &[u8],
    center: Point,
    parent: BoardRef,
    config: &EngineConfig,
) -> Result<Item, IntakeError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format().ok_or(IntakeError::UnknownFormat)?;
    let (natural_w, natural_h) = reader.into_dimensions()?;
    if natural_w == 0 || natural_h == 0 {
        return Err(IntakeError::Empty);
    }

    let natural_w = f64::from(natural_w);
    let natural_h = f64::from(natural_h);
    let width = natural_w.min(config.image_max_width);
    let height = width * natural_h / natural_w;

    let src = format!("data:{};base64,{}", format.to_mime_type(), STANDARD.encode(bytes));
    log::debug!("image intake: {natural_w}x{natural_h} placed at {width}x{height}");

    let mut item = Item::create(ItemType::Image, center - Vec2::new(width / 2.0, height / 2.0), parent, config)
        .with_size(width, Height::Fixed(height));
    item.kind = ItemKind::Image { src };
    Ok(item)
}
