use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cluster::Connectivity;
use crate::errors::{ImagingError, Result};

/// Configuration for the batch pipeline
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    // Pre-processing
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f64,

    #[serde(default = "default_blur_passes")]
    pub blur_passes: usize,

    #[serde(default = "default_adjust_gain")]
    pub adjust_gain: f64,

    #[serde(default = "default_adjust_offset")]
    pub adjust_offset: f64,

    // Binarization
    #[serde(default)]
    pub binarization: BinarizationMethod,

    #[serde(default = "default_window_size")]
    pub window_size: u32,

    #[serde(default = "default_window_k")]
    pub window_k: f64,

    #[serde(default = "default_fixed_threshold")]
    pub fixed_threshold: u8,

    // Clustering
    #[serde(default)]
    pub connectivity: Connectivity,

    /// Centroids closer than this are merged after labelling.
    #[serde(default)]
    pub merge_distance: Option<f64>,

    // Debug outputs
    #[serde(default = "default_canny_low")]
    pub canny_low: i32,

    #[serde(default = "default_canny_high")]
    pub canny_high: i32,

    #[serde(default = "default_rotation_degrees")]
    pub rotation_degrees: f64,

    #[serde(default = "default_autofit")]
    pub autofit: bool,

    #[serde(default = "default_cross_size")]
    pub cross_size: u32,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,
}

/// Binarization applied to the adjusted gray image
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BinarizationMethod {
    #[default]
    Otsu,
    Niblack,
    Sauvola,
    BoxMean,
    /// Fixed `fixed_threshold`
    Threshold,
}

fn default_blur_sigma() -> f64 {
    4.0
}

fn default_blur_passes() -> usize {
    3
}

fn default_adjust_gain() -> f64 {
    1.5
}

fn default_adjust_offset() -> f64 {
    -250.0
}

fn default_window_size() -> u32 {
    150
}

fn default_window_k() -> f64 {
    1.5
}

fn default_fixed_threshold() -> u8 {
    128
}

fn default_canny_low() -> i32 {
    100
}

fn default_canny_high() -> i32 {
    300
}

fn default_rotation_degrees() -> f64 {
    30.0
}

fn default_autofit() -> bool {
    true
}

fn default_cross_size() -> u32 {
    20
}

fn default_parallel() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            blur_sigma: default_blur_sigma(),
            blur_passes: default_blur_passes(),
            adjust_gain: default_adjust_gain(),
            adjust_offset: default_adjust_offset(),
            binarization: BinarizationMethod::default(),
            window_size: default_window_size(),
            window_k: default_window_k(),
            fixed_threshold: default_fixed_threshold(),
            connectivity: Connectivity::default(),
            merge_distance: None,
            canny_low: default_canny_low(),
            canny_high: default_canny_high(),
            rotation_degrees: default_rotation_degrees(),
            autofit: default_autofit(),
            cross_size: default_cross_size(),
            use_parallel: default_parallel(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ImagingError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|source| ImagingError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(ImagingError::InvalidPath(input_path));
        }

        if self.blur_sigma < 0.0 {
            return Err(ImagingError::Config("blur_sigma must be >= 0.0".to_string()));
        }

        if self.blur_passes == 0 {
            return Err(ImagingError::Config("blur_passes must be > 0".to_string()));
        }

        if self.window_size == 0 {
            return Err(ImagingError::Config("window_size must be > 0".to_string()));
        }

        if self.binarization == BinarizationMethod::Sauvola && self.window_size < 2 {
            return Err(ImagingError::Config(
                "window_size must be >= 2 for sauvola binarization".to_string(),
            ));
        }

        if self.canny_low > self.canny_high {
            return Err(ImagingError::Config(
                "canny_low must be <= canny_high".to_string(),
            ));
        }

        if let Some(distance) = self.merge_distance {
            if !distance.is_finite() || distance < 0.0 {
                return Err(ImagingError::Config(
                    "merge_distance must be a finite value >= 0.0".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_path = "in"
            output_base_dir = "out"
            binarization = "box_mean"
            connectivity = "eight"
            merge_distance = 12.5
            "#,
        )
        .unwrap();
        assert_eq!(config.binarization, BinarizationMethod::BoxMean);
        assert_eq!(config.connectivity, Connectivity::Eight);
        assert_eq!(config.merge_distance, Some(12.5));
        assert_eq!(config.blur_passes, 3);
        assert_eq!(config.window_size, 150);
        assert!(config.use_parallel);
    }

    #[test]
    fn nan_merge_distance_from_toml_is_rejected() {
        let config: Config = toml::from_str(&format!(
            "input_path = \"{}\"\noutput_base_dir = \"out\"\nmerge_distance = nan\n",
            std::env::temp_dir().display().to_string().replace('\\', "/")
        ))
        .unwrap();
        assert!(config.merge_distance.map_or(false, f64::is_nan));
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.merge_distance = Some(3.0);
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config {
            input_path: std::env::temp_dir().display().to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        config.canny_low = 500;
        assert!(matches!(config.validate(), Err(ImagingError::Config(_))));
        config.canny_low = 100;

        config.merge_distance = Some(-1.0);
        assert!(config.validate().is_err());
        config.merge_distance = Some(f64::NAN);
        assert!(matches!(config.validate(), Err(ImagingError::Config(_))));
        config.merge_distance = Some(f64::INFINITY);
        assert!(config.validate().is_err());
        config.merge_distance = None;

        config.input_path = "/definitely/not/here".to_string();
        assert!(matches!(config.validate(), Err(ImagingError::InvalidPath(_))));
    }
}
