use image::{DynamicImage, Rgba};

/// テキスト描画の抽象化
///
/// フォント実装に依存せず、スタンプ処理をテストできるようにする
pub trait TextRenderer: Send + Sync {
    /// 描画した場合のテキストの幅と高さ（ピクセル）
    fn measure(&self, text: &str) -> (u32, u32);

    /// 左上を (x, y) としてテキストを描画する。画像外の部分は切り捨てられる
    fn draw(&self, image: &mut DynamicImage, x: i32, y: i32, color: Rgba<u8>, text: &str);
}
