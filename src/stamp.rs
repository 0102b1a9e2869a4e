use image::{DynamicImage, GenericImageView, Rgba};
use log::debug;

use crate::errors::Result;
use crate::placement::{self, Margins, OverflowPolicy, Placement};
use crate::traits::TextRenderer;

/// How the counter text is laid out on every image.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub color: Rgba<u8>,
    pub margins: Margins,
    pub overflow: OverflowPolicy,
}

/// A working image carrying one counter, ready to be written.
#[derive(Debug, Clone)]
pub struct StampedImage {
    pub counter: u32,
    pub image: DynamicImage,
    pub placement: Placement,
}

/// Copies `source` and draws `counter` near its bottom-right corner.
///
/// The source is only borrowed, so every counter starts from the same
/// untouched pixels.
pub fn stamp_counter<R: TextRenderer>(
    source: &DynamicImage,
    renderer: &R,
    counter: u32,
    style: &TextStyle,
) -> Result<StampedImage> {
    let text = counter.to_string();
    let placement = placement::bottom_right(
        source.dimensions(),
        renderer.measure(&text),
        style.margins,
    );
    let placement = placement::resolve(placement, style.overflow, counter)?;
    debug!(
        "counter {}: text {}x{} at ({}, {})",
        counter, placement.text_width, placement.text_height, placement.x, placement.y
    );

    let mut image = source.clone();
    if placement.x + i64::from(placement.text_width) > 0
        && placement.y + i64::from(placement.text_height) > 0
    {
        renderer.draw(
            &mut image,
            saturate(placement.x),
            saturate(placement.y),
            style.color,
            &text,
        );
    } else {
        debug!("counter {}: text lies entirely outside the image", counter);
    }

    Ok(StampedImage {
        counter,
        image,
        placement,
    })
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
