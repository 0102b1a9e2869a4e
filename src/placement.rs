use clap::ValueEnum;

use crate::errors::{Result, StampError};

/// Distance kept between the text and the right and bottom image edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub right: u32,
    pub bottom: u32,
}

/// テキストが画像内に収まらない場合の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OverflowPolicy {
    /// Keep negative coordinates; the part outside the canvas is clipped
    #[default]
    Allow,
    /// Pull negative coordinates back to the image edge
    Clamp,
    /// Fail the counter
    Error,
}

/// Where one counter's text ends up on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub text_width: u32,
    pub text_height: u32,
    pub x: i64,
    pub y: i64,
}

impl Placement {
    /// Whether the text box starts inside the image.
    pub const fn fits(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }
}

/// Anchors a `text_width` x `text_height` box to the bottom-right corner of
/// the image, offset by the margins. Coordinates are signed so that text
/// wider than the image yields a negative `x` instead of wrapping.
pub fn bottom_right(
    image_size: (u32, u32),
    text_size: (u32, u32),
    margins: Margins,
) -> Placement {
    let (width, height) = image_size;
    let (text_width, text_height) = text_size;

    Placement {
        text_width,
        text_height,
        x: i64::from(width) - i64::from(text_width) - i64::from(margins.right),
        y: i64::from(height) - i64::from(text_height) - i64::from(margins.bottom),
    }
}

/// Applies the overflow policy to a computed placement.
pub fn resolve(placement: Placement, policy: OverflowPolicy, counter: u32) -> Result<Placement> {
    match policy {
        OverflowPolicy::Allow => Ok(placement),
        OverflowPolicy::Clamp => Ok(Placement {
            x: placement.x.max(0),
            y: placement.y.max(0),
            ..placement
        }),
        OverflowPolicy::Error if !placement.fits() => Err(StampError::TextOverflow {
            counter,
            x: placement.x,
            y: placement.y,
        }),
        OverflowPolicy::Error => Ok(placement),
    }
}
