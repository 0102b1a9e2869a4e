use std::fs;
use std::mem;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgba};
use imageproc::drawing::{draw_text_mut, text_size, Blend};

use crate::errors::{Result, StampError};
use crate::traits::TextRenderer;

/// Font file loaded once and rendered at a fixed pixel size.
pub struct GlyphRenderer {
    font: FontVec,
    scale: PxScale,
}

impl GlyphRenderer {
    pub fn new(font_path: &Path, font_size: f32) -> Result<Self> {
        let data = fs::read(font_path).map_err(|e| StampError::FileSystem {
            path: font_path.to_path_buf(),
            operation: "フォント読み込み".to_string(),
            source: e,
        })?;

        let font = FontVec::try_from_vec(data).map_err(|e| StampError::Font {
            path: font_path.to_path_buf(),
            source: Box::new(e),
        })?;

        Ok(Self::from_font(font, font_size))
    }

    pub fn from_font(font: FontVec, font_size: f32) -> Self {
        Self {
            font,
            scale: PxScale::from(font_size),
        }
    }
}

impl TextRenderer for GlyphRenderer {
    fn measure(&self, text: &str) -> (u32, u32) {
        text_size(self.scale, &self.font, text)
    }

    fn draw(&self, image: &mut DynamicImage, x: i32, y: i32, color: Rgba<u8>, text: &str) {
        blend_onto(image, |canvas| {
            draw_text_mut(canvas, color, x, y, self.scale, &self.font, text)
        });
    }
}

/// Runs `draw` on an alpha-blending canvas over `image`.
///
/// The image stays in its own colour type; only the pixels `draw` touches are
/// converted through `Rgba<u8>`.
pub(crate) fn blend_onto(image: &mut DynamicImage, draw: impl FnOnce(&mut Blend<DynamicImage>)) {
    let mut canvas = Blend(mem::take(image));
    draw(&mut canvas);
    *image = canvas.0;
}
