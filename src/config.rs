use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use image::{ImageFormat, Rgba};

use crate::errors::{Result, StampError};
use crate::placement::{Margins, OverflowPolicy};

pub const DEFAULT_SOURCE_IMAGE: &str = "PixSol_logo.png";
pub const DEFAULT_OUTPUT_DIR: &str = "PixSol_images";
pub const DEFAULT_FONT_PATH: &str = "arial.ttf";
/// 36 の4倍
pub const DEFAULT_FONT_SIZE: f32 = 144.0;
pub const DEFAULT_START: u32 = 1;
pub const DEFAULT_END: u32 = 100;
pub const DEFAULT_MARGIN_RIGHT: u32 = 40;
pub const DEFAULT_MARGIN_BOTTOM: u32 = 50;
pub const DEFAULT_PREFIX: &str = "pixel";
pub const DEFAULT_FORMAT: &str = "png";
/// 描画座標は i32 なので、それを超える余白は受け付けない
pub const MAX_MARGIN: u32 = i32::MAX as u32;

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Image every counter is stamped onto
    #[arg(short, long, default_value = DEFAULT_SOURCE_IMAGE)]
    pub source_image: PathBuf,

    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// TrueType or OpenType font used for the counter text
    #[arg(long, default_value = DEFAULT_FONT_PATH)]
    pub font_path: PathBuf,

    /// Font size in pixels
    #[arg(long, default_value_t = DEFAULT_FONT_SIZE)]
    pub font_size: f32,

    /// First counter (inclusive)
    #[arg(long, default_value_t = DEFAULT_START)]
    pub start: u32,

    /// Last counter (inclusive)
    #[arg(long, default_value_t = DEFAULT_END)]
    pub end: u32,

    #[arg(long, default_value_t = DEFAULT_MARGIN_RIGHT)]
    pub margin_right: u32,

    #[arg(long, default_value_t = DEFAULT_MARGIN_BOTTOM)]
    pub margin_bottom: u32,

    /// Text colour as `RRGGBB` or `RRGGBBAA`
    #[arg(long, default_value = "000000", value_parser = parse_color)]
    pub color: Rgba<u8>,

    /// What to do when the text does not fit inside the margins
    #[arg(long, value_enum, default_value_t = OverflowPolicy::Allow)]
    pub overflow: OverflowPolicy,

    /// Output file names are `<prefix>_<counter>.<format>`
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    #[arg(short, long, default_value = DEFAULT_FORMAT, value_parser = check_format)]
    pub format: String,

    /// Worker threads; 1 writes the files strictly in counter order
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Continue with the remaining counters when one of them fails
    #[arg(long)]
    pub keep_going: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_image: PathBuf::from(DEFAULT_SOURCE_IMAGE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: DEFAULT_FONT_SIZE,
            start: DEFAULT_START,
            end: DEFAULT_END,
            margin_right: DEFAULT_MARGIN_RIGHT,
            margin_bottom: DEFAULT_MARGIN_BOTTOM,
            color: Rgba([0, 0, 0, 255]),
            overflow: OverflowPolicy::Allow,
            prefix: DEFAULT_PREFIX.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            jobs: 1,
            keep_going: false,
            no_progress: false,
            verbose: Verbosity::new(0, 0),
        }
    }
}

impl Config {
    pub const fn counter_range(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    pub const fn margins(&self) -> Margins {
        Margins {
            right: self.margin_right,
            bottom: self.margin_bottom,
        }
    }

    /// Output format for `format`. Fails for extensions `validate` rejects.
    pub fn output_format(&self) -> Result<ImageFormat> {
        check_format(&self.format)
            .ok()
            .and_then(ImageFormat::from_extension)
            .ok_or_else(|| {
                StampError::validation("format", format!("{} is not a writable format", self.format))
            })
    }

    /// Checks the constraints clap cannot express per field.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(StampError::validation(
                "counter range",
                format!("start ({}) is greater than end ({})", self.start, self.end),
            ));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(StampError::validation(
                "font_size",
                format!("must be a positive number, got {}", self.font_size),
            ));
        }
        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(StampError::validation(
                "prefix",
                "must be a non-empty file name component",
            ));
        }
        if self.jobs == 0 {
            return Err(StampError::validation("jobs", "must be at least 1"));
        }
        check_format(&self.format).map_err(|reason| StampError::validation("format", reason))?;
        for (field, margin) in [
            ("margin_right", self.margin_right),
            ("margin_bottom", self.margin_bottom),
        ] {
            if margin > MAX_MARGIN {
                return Err(StampError::validation(
                    field,
                    format!("must not exceed {}, got {}", MAX_MARGIN, margin),
                ));
            }
        }
        Ok(())
    }
}

fn check_format(s: &str) -> std::result::Result<String, String> {
    let supported: Vec<_> = ImageFormat::all()
        .filter(|f| f.writing_enabled())
        .flat_map(|f| f.extensions_str())
        .map(|s| format!("`{}`", s))
        .collect();
    let supported_message = format!("Supported formats: {}", supported.join(", "));

    let format = ImageFormat::from_extension(s)
        .ok_or(format!("{} is not supported. {}", s, supported_message))?;
    if !format.writing_enabled() {
        return Err(format!("{} is not supported. {}", s, supported_message));
    }

    Ok(s.to_string())
}

fn parse_color(s: &str) -> std::result::Result<Rgba<u8>, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{} is not a `RRGGBB` or `RRGGBBAA` colour", s));
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
