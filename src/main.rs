use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::debug;

use counter_stamp::{Config, Generator};

fn main() -> Result<()> {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.verbose.log_level_filter())
        .init();

    debug!("Config: {:?}", config);

    config.validate()?;
    ensure!(
        config.source_image.exists(),
        "Source image does not exist: {}",
        config.source_image.display()
    );
    ensure!(
        config.font_path.exists(),
        "Font file does not exist: {}",
        config.font_path.display()
    );

    let generator = Generator::with_font_file(config).context("Failed to load font")?;
    let written = generator.run().with_context(|| {
        format!(
            "Failed to generate images into {}",
            generator.config().output_dir.display()
        )
    })?;

    println!(
        "全ての画像生成が完了しました: {} 枚 ({})",
        written.len(),
        generator.config().output_dir.display()
    );

    Ok(())
}
