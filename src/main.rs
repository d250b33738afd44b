use std::path::PathBuf;
use std::time::Instant;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, LevelFilter};
use rayon::prelude::*;

use generic_imaging_lib::{
    get_png_files_in_dir, load_image, process_image, BinarizationMethod, Config,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Generic imaging - binarize, cluster and annotate PNG images")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Binarization method (overwrites config)
    #[clap(short, long)]
    binarization: Option<BinarizationArg>,

    /// Enable debug mode (save intermediate images and log more)
    #[clap(short, long)]
    debug: bool,

    /// Write a default configuration to the config path and exit
    #[clap(long)]
    write_default_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BinarizationArg {
    Otsu,
    Niblack,
    Sauvola,
    BoxMean,
    Threshold,
}

impl From<BinarizationArg> for BinarizationMethod {
    fn from(arg: BinarizationArg) -> Self {
        match arg {
            BinarizationArg::Otsu => BinarizationMethod::Otsu,
            BinarizationArg::Niblack => BinarizationMethod::Niblack,
            BinarizationArg::Sauvola => BinarizationMethod::Sauvola,
            BinarizationArg::BoxMean => BinarizationMethod::BoxMean,
            BinarizationArg::Threshold => BinarizationMethod::Threshold,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if args.write_default_config {
        Config::default()
            .save_to_file(&args.config)
            .with_context(|| format!("writing default configuration to {}", args.config))?;
        info!("Default configuration written to {}", args.config);
        return Ok(());
    }

    // Load configuration
    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("loading configuration {}", args.config))?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(method) = args.binarization {
        config.binarization = method.into();
    }

    config.validate().context("invalid configuration")?;

    let start_time = Instant::now();
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        info!("Processing single file: {}", input_path.display());
        let input_image = load_image(&input_path)
            .with_context(|| format!("loading {}", input_path.display()))?;
        let summary = process_image(input_image, &config, args.debug)?;
        info!("{}: {} clusters", summary.filename, summary.clusters);
    } else if input_path.is_dir() {
        info!("Processing directory: {}", input_path.display());
        let png_files = get_png_files_in_dir(&input_path)?;
        info!("Found {} PNG files", png_files.len());

        let run = |path: &PathBuf| {
            load_image(path)
                .and_then(|input_image| process_image(input_image, &config, args.debug))
                .map_err(|e| {
                    error!("Error processing {}: {}", path.display(), e);
                    e
                })
        };

        let failures = if config.use_parallel {
            png_files.par_iter().map(run).filter(|r| r.is_err()).count()
        } else {
            png_files.iter().map(run).filter(|r| r.is_err()).count()
        };

        if failures > 0 {
            bail!("{} of {} files failed", failures, png_files.len());
        }
    } else {
        bail!("input path {} is neither a file nor a directory", input_path.display());
    }

    info!("Processing completed in {:.2} seconds", start_time.elapsed().as_secs_f64());

    Ok(())
}
