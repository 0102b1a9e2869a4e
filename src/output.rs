use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::errors::{Result, StampError};

/// Creates `dir` and its parents if needed. Existing directories are left as is.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| StampError::FileSystem {
        path: dir.to_path_buf(),
        operation: "出力ディレクトリ作成".to_string(),
        source: e,
    })
}

/// `<dir>/<prefix>_<counter>.<extension>`
pub fn output_path(dir: &Path, prefix: &str, counter: u32, extension: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, counter, extension))
}

/// Encodes `image` to `path`, replacing any existing file.
pub fn write_image(image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    image
        .save_with_format(path, format)
        .map_err(|e| StampError::ImageProcessing {
            path: path.display().to_string(),
            operation: "画像保存".to_string(),
            source: Box::new(e),
        })
}
