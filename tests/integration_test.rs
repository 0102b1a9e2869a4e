use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba};
use tempfile::TempDir;

use counter_stamp::mocks::{create_block_renderer, BlockRenderer};
use counter_stamp::{Config, Generator, OverflowPolicy, StampError, TextRenderer};

fn write_source(dir: &Path, width: u32, height: u32) -> DynamicImage {
    // 市松模様にして差分が分かりやすいようにする
    let image = RgbImage::from_fn(width, height, |x, y| {
        if (x / 10 + y / 10) % 2 == 0 {
            Rgb([250, 240, 230])
        } else {
            Rgb([30, 60, 90])
        }
    });
    let image = DynamicImage::ImageRgb8(image);
    image.save(dir.join("source.png")).unwrap();
    image
}

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        source_image: temp_dir.path().join("source.png"),
        output_dir: temp_dir.path().join("PixSol_images"),
        no_progress: true,
        ..Config::default()
    }
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_default_range_writes_one_file_per_counter() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), 500, 500);
    let config = test_config(&temp_dir);

    let generator = Generator::new(create_block_renderer(), config.clone());
    let written = generator.run().unwrap();

    assert_eq!(written.len(), 100);
    let expected: BTreeSet<_> = (1..=100).map(|i| format!("pixel_{}.png", i)).collect();
    assert_eq!(file_names(&config.output_dir), expected);

    for path in &written {
        let output = image::open(path).unwrap();
        assert_eq!(output.dimensions(), source.dimensions());
    }
}

#[test]
fn test_counter_seven_placement_on_500px_source() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), 500, 500);
    let config = Config {
        start: 7,
        end: 7,
        ..test_config(&temp_dir)
    };

    let renderer = create_block_renderer();
    let (text_width, text_height) = renderer.measure("7");
    Generator::new(renderer, config.clone()).run().unwrap();

    let output = image::open(config.output_dir.join("pixel_7.png")).unwrap();
    let x = 500 - text_width - 40;
    let y = 500 - text_height - 50;

    // 描画領域の左上は黒、その外側は元画像のまま
    assert_eq!(output.get_pixel(x, y), Rgba([0, 0, 0, 255]));
    assert_eq!(output.get_pixel(x - 1, y), source.get_pixel(x - 1, y));
    assert_eq!(output.get_pixel(x, y - 1), source.get_pixel(x, y - 1));
    assert_eq!(
        output.get_pixel(x + text_width, y + text_height),
        source.get_pixel(x + text_width, y + text_height)
    );
}

#[test]
fn test_only_text_region_differs_from_source() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), 320, 240);
    let config = Config {
        start: 1,
        end: 12,
        ..test_config(&temp_dir)
    };

    let renderer = create_block_renderer();
    let written = Generator::new(renderer.clone(), config).run().unwrap();

    for (counter, path) in (1..=12u32).zip(&written) {
        let (text_width, text_height) = renderer.measure(&counter.to_string());
        let left = 320 - text_width - 40;
        let top = 240 - text_height - 50;

        let output = image::open(path).unwrap();
        for (x, y, pixel) in output.pixels() {
            let inside =
                x >= left && x < left + text_width && y >= top && y < top + text_height;
            if !inside {
                assert_eq!(
                    pixel,
                    source.get_pixel(x, y),
                    "counter {counter} changed pixel ({x}, {y})"
                );
            }
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    write_source(first_dir.path(), 200, 200);
    write_source(second_dir.path(), 200, 200);

    let first = Generator::new(create_block_renderer(), test_config(&first_dir))
        .run()
        .unwrap();
    let second = Generator::new(create_block_renderer(), test_config(&second_dir))
        .run()
        .unwrap();

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn test_parallel_run_matches_sequential_run() {
    let sequential_dir = TempDir::new().unwrap();
    let parallel_dir = TempDir::new().unwrap();
    write_source(sequential_dir.path(), 240, 180);
    write_source(parallel_dir.path(), 240, 180);

    let sequential = Generator::new(create_block_renderer(), test_config(&sequential_dir))
        .run()
        .unwrap();
    let parallel_config = Config {
        jobs: 4,
        ..test_config(&parallel_dir)
    };
    let parallel = Generator::new(create_block_renderer(), parallel_config)
        .run()
        .unwrap();

    assert_eq!(sequential.len(), parallel.len());
    for (a, b) in sequential.iter().zip(&parallel) {
        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn test_existing_output_is_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), 200, 200);
    let config = Config {
        start: 1,
        end: 3,
        ..test_config(&temp_dir)
    };
    fs::create_dir_all(&config.output_dir).unwrap();
    fs::write(config.output_dir.join("pixel_2.png"), b"stale").unwrap();

    Generator::new(create_block_renderer(), config.clone())
        .run()
        .unwrap();

    let output = image::open(config.output_dir.join("pixel_2.png")).unwrap();
    assert_eq!(output.dimensions(), (200, 200));
}

#[test]
fn test_overflow_policies_on_narrow_source() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), 60, 200);
    let wide = BlockRenderer::new(30, 30);

    // "100" は 90px 幅なので x = 60 - 90 - 40 = -70
    let allow = Config {
        start: 100,
        end: 100,
        ..test_config(&temp_dir)
    };
    Generator::new(wide.clone(), allow.clone()).run().unwrap();
    let clipped = image::open(allow.output_dir.join("pixel_100.png")).unwrap();
    assert_eq!(clipped.dimensions(), (60, 200));

    let clamp = Config {
        overflow: OverflowPolicy::Clamp,
        ..allow.clone()
    };
    Generator::new(wide.clone(), clamp.clone()).run().unwrap();
    let clamped = image::open(clamp.output_dir.join("pixel_100.png")).unwrap();
    assert_eq!(clamped.get_pixel(0, 125), Rgba([0, 0, 0, 255]));

    let error = Config {
        overflow: OverflowPolicy::Error,
        ..allow
    };
    let result = Generator::new(wide, error).run();
    assert!(matches!(
        result,
        Err(StampError::TextOverflow { counter: 100, x: -70, .. })
    ));
}

#[test]
fn test_keep_going_reports_partial_failure() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), 90, 200);
    let renderer = create_block_renderer();

    // 2桁までは収まり、3桁だけがはみ出す
    let config = Config {
        start: 98,
        end: 101,
        overflow: OverflowPolicy::Error,
        keep_going: true,
        ..test_config(&temp_dir)
    };

    let result = Generator::new(renderer, config.clone()).run();
    assert!(matches!(
        result,
        Err(StampError::PartialFailure {
            failed: 2,
            total: 4
        })
    ));
    assert_eq!(
        file_names(&config.output_dir),
        BTreeSet::from(["pixel_98.png".to_string(), "pixel_99.png".to_string()])
    );
}

#[test]
fn test_fail_fast_stops_at_first_failure() {
    let temp_dir = TempDir::new().unwrap();
    write_source(temp_dir.path(), 90, 200);

    let config = Config {
        start: 98,
        end: 101,
        overflow: OverflowPolicy::Error,
        ..test_config(&temp_dir)
    };

    let result = Generator::new(create_block_renderer(), config.clone()).run();
    assert!(matches!(
        result,
        Err(StampError::TextOverflow { counter: 100, .. })
    ));
    assert!(!config.output_dir.join("pixel_101.png").exists());
}
