use image::{DynamicImage, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::renderer::blend_onto;
use crate::traits::TextRenderer;

/// テスト用のテキストレンダラー
///
/// 1文字ごとに固定サイズの塗りつぶし矩形を描くので、フォントファイルなしで
/// 配置と出力を検証できる
#[derive(Debug, Clone)]
pub struct BlockRenderer {
    pub char_width: u32,
    pub char_height: u32,
}

impl BlockRenderer {
    pub const fn new(char_width: u32, char_height: u32) -> Self {
        Self {
            char_width,
            char_height,
        }
    }
}

impl TextRenderer for BlockRenderer {
    fn measure(&self, text: &str) -> (u32, u32) {
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return (0, 0);
        }
        (chars * self.char_width, self.char_height)
    }

    fn draw(&self, image: &mut DynamicImage, x: i32, y: i32, color: Rgba<u8>, text: &str) {
        // 文字間に1pxの隙間を空ける
        let block_width = self.char_width.saturating_sub(1).max(1);
        blend_onto(image, |canvas| {
            for i in 0..text.chars().count() as i32 {
                let rect = Rect::at(x + i * self.char_width as i32, y)
                    .of_size(block_width, self.char_height.max(1));
                draw_filled_rect_mut(canvas, rect, color);
            }
        });
    }
}

/// テスト用のファクトリー関数
pub const fn create_block_renderer() -> BlockRenderer {
    BlockRenderer::new(20, 30)
}
