pub mod config;
pub mod errors;
pub mod output;
pub mod placement;
pub mod renderer;
pub mod stamp;
pub mod traits;

pub mod mocks;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::{prelude::*, ThreadPoolBuilder};

pub use config::Config;
pub use errors::{Result, StampError};
pub use placement::{Margins, OverflowPolicy, Placement};
pub use renderer::GlyphRenderer;
pub use stamp::{stamp_counter, StampedImage, TextStyle};
pub use traits::*;

/// 1枚の元画像から連番入り画像を生成する
pub struct Generator<R: TextRenderer> {
    renderer: R,
    config: Config,
}

impl<R: TextRenderer> Generator<R> {
    pub const fn new(renderer: R, config: Config) -> Self {
        Self { renderer, config }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the output directory, loads the source image and writes one
    /// image per counter. Returns the written paths in counter order.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        self.config.validate()?;
        output::ensure_output_dir(&self.config.output_dir)?;
        let source = load_source_image(&self.config.source_image)?;
        self.generate(&source)
    }

    /// Stamps every counter of the configured range onto copies of `source`.
    ///
    /// The output directory must already exist.
    pub fn generate(&self, source: &DynamicImage) -> Result<Vec<PathBuf>> {
        let counters = self.config.counter_range();
        let total = counters.clone().count();
        info!(
            "generating {} images from {} into {}",
            total,
            self.config.source_image.display(),
            self.config.output_dir.display()
        );

        let progress_bar = if self.config.no_progress {
            ProgressBar::hidden()
        } else {
            new_progress_bar(total as u64)
        };

        let step = |counter: u32| {
            let outcome = self.stamp_and_write(source, counter);
            progress_bar.inc(1);
            (counter, outcome)
        };
        let fail_fast = |counter: u32| step(counter).1;

        let pool = match self.config.jobs {
            jobs if jobs > 1 => Some(ThreadPoolBuilder::new().num_threads(jobs).build()?),
            _ => None,
        };

        let result: Result<Vec<PathBuf>> = if self.config.keep_going {
            let outcomes: Vec<(u32, Result<PathBuf>)> = match &pool {
                Some(pool) => pool.install(|| counters.into_par_iter().map(step).collect()),
                None => counters.map(step).collect(),
            };
            summarize(outcomes)
        } else {
            // 最初の失敗で残りのカウンターを打ち切る
            match &pool {
                Some(pool) => pool.install(|| counters.into_par_iter().map(fail_fast).collect()),
                None => counters.map(fail_fast).collect(),
            }
        };

        progress_bar.finish();
        result
    }

    fn stamp_and_write(&self, source: &DynamicImage, counter: u32) -> Result<PathBuf> {
        let style = TextStyle {
            color: self.config.color,
            margins: self.config.margins(),
            overflow: self.config.overflow,
        };
        let stamped = stamp_counter(source, &self.renderer, counter, &style)?;

        let path = output::output_path(
            &self.config.output_dir,
            &self.config.prefix,
            counter,
            &self.config.format,
        );
        output::write_image(&stamped.image, &path, self.config.output_format()?)?;
        Ok(path)
    }
}

impl Generator<GlyphRenderer> {
    /// Loads the configured font file at the configured size.
    pub fn with_font_file(config: Config) -> Result<Self> {
        let renderer = GlyphRenderer::new(&config.font_path, config.font_size)?;
        Ok(Self::new(renderer, config))
    }
}

pub fn load_source_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| StampError::ImageProcessing {
        path: path.display().to_string(),
        operation: "画像読み込み".to_string(),
        source: Box::new(e),
    })
}

/// Keeps the written paths and turns any skipped counter into a run failure.
fn summarize(outcomes: Vec<(u32, Result<PathBuf>)>) -> Result<Vec<PathBuf>> {
    let total = outcomes.len();
    let mut written = Vec::with_capacity(total);
    let mut failed = 0;
    for (counter, outcome) in outcomes {
        match outcome {
            Ok(path) => written.push(path),
            Err(e) => {
                warn!("counter {} skipped: {}", counter, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(StampError::PartialFailure { failed, total });
    }
    Ok(written)
}

fn new_progress_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(style);
    progress_bar
}
