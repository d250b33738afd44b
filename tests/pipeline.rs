use std::fs;
use std::path::PathBuf;

use generic_imaging_lib::{
    get_png_files_in_dir, load_image, process_image, BinarizationMethod, Config, Connectivity,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("generic_imaging_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Black canvas with two bright 10x10 squares.
fn write_two_squares(path: &PathBuf) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let in_a = (10..20).contains(&x) && (10..20).contains(&y);
        let in_b = (40..50).contains(&x) && (40..50).contains(&y);
        if in_a || in_b {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([0, 0, 0])
        }
    });
    img.save(path).unwrap();
}

fn test_config(input: &PathBuf, output: &PathBuf) -> Config {
    Config {
        input_path: input.display().to_string(),
        output_base_dir: output.display().to_string(),
        blur_sigma: 1.0,
        binarization: BinarizationMethod::Otsu,
        connectivity: Connectivity::Four,
        cross_size: 4,
        ..Config::default()
    }
}

#[test]
fn pipeline_finds_both_squares_and_writes_outputs() {
    init_logging();
    let dir = scratch_dir("pipeline");
    let input = dir.join("squares.png");
    let output = dir.join("out");
    write_two_squares(&input);

    let config = test_config(&input, &output);
    config.validate().unwrap();

    let summary = process_image(load_image(&input).unwrap(), &config, true).unwrap();
    assert_eq!(summary.filename, "squares");
    assert_eq!((summary.width, summary.height), (64, 64));
    assert_eq!(summary.clusters, 2);
    assert!(summary.threshold.is_some());

    assert!(output.join("annotated/squares.png").is_file());
    assert!(output.join("binary/squares.png").is_file());
    for suffix in ["gray", "blurred", "adjusted", "sobel", "canny", "rotated"] {
        assert!(output.join(format!("debug/squares_{}.png", suffix)).is_file(), "{}", suffix);
    }

    let csv = fs::read_to_string(output.join("clusters/squares.csv")).unwrap();
    let rows: Vec<Vec<String>> = csv
        .lines()
        .skip(1)
        .map(|l| l.split(',').map(str::to_string).collect())
        .collect();
    assert_eq!(rows.len(), 2);
    let cx: u32 = rows[0][4].parse().unwrap();
    let cy: u32 = rows[0][5].parse().unwrap();
    assert!((13..=16).contains(&cx), "cx {}", cx);
    assert!((13..=16).contains(&cy), "cy {}", cy);
    let cx: u32 = rows[1][4].parse().unwrap();
    assert!((43..=46).contains(&cx), "cx {}", cx);

    // Crosses are drawn in red over the white square.
    let annotated = image::open(output.join("annotated/squares.png")).unwrap().to_rgb8();
    assert_eq!(annotated.get_pixel(cx, rows[1][5].parse().unwrap()), &image::Rgb([255, 0, 0]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn merge_distance_joins_the_squares() {
    init_logging();
    let dir = scratch_dir("merge");
    let input = dir.join("squares.png");
    let output = dir.join("out");
    write_two_squares(&input);

    let config = Config {
        merge_distance: Some(100.0),
        ..test_config(&input, &output)
    };
    let summary = process_image(load_image(&input).unwrap(), &config, false).unwrap();
    assert_eq!(summary.clusters, 1);
    assert!(!output.join("debug").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn directory_scan_is_recursive_and_sorted() {
    let dir = scratch_dir("scan");
    fs::create_dir_all(dir.join("nested")).unwrap();
    write_two_squares(&dir.join("b.png"));
    write_two_squares(&dir.join("nested/a.PNG"));
    fs::write(dir.join("notes.txt"), "skip me").unwrap();

    let files = get_png_files_in_dir(&dir).unwrap();
    assert_eq!(files, vec![dir.join("b.png"), dir.join("nested/a.PNG")]);

    let _ = fs::remove_dir_all(&dir);
}
