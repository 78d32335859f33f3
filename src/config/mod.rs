//! Parameters of a mapping run, readable from a toml file of the form
//!
//! ```toml
//! [onset_detection]
//! sampling_rate = 10000.0
//! digitize_threshold = 0.9
//! filter_size = 0.01
//! segment_threshold = 0.02
//! smallest_interval = 10.0
//!
//! [mapping]
//! temporal_downsample_rate = 1
//! fft_mode = "peak"
//! cycles = 1
//! rectify = false
//! strict_sweep_count = false
//! ```
//!
//! Every key is optional and falls back to its default.

use std::{fs::read_to_string, path::Path, str::FromStr};
use log::debug;
use toml::{from_str, Value};
use crate::error::{ConfigurationError, MappingError};
use crate::phase_map::FftMode;
use crate::timing::OnsetDetectionParameters;


/// Parameters of a full mapping run
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Parameters used to segment the photodiode trace
    pub onset_detection: OnsetDetectionParameters,
    /// Temporal decimation applied to the movie after recording
    pub temporal_downsample_rate: usize,
    /// Whether responses are detected as peaks or valleys
    pub fft_mode: FftMode,
    /// Number of stimulus cycles within each averaged chunk
    pub cycles: usize,
    /// Compute phase maps on the rectified dF/F movie instead of the raw average
    pub rectify: bool,
    /// Fail instead of dropping sweeps that have no detected onset
    pub strict_sweep_count: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            onset_detection: OnsetDetectionParameters::default(),
            temporal_downsample_rate: 1,
            fft_mode: FftMode::Peak,
            cycles: 1,
            rectify: false,
            strict_sweep_count: false,
        }
    }
}

fn parse_bool(value: &Value, field_name: &str) -> Result<bool, ConfigurationError> {
    value
        .as_bool()
        .ok_or_else(|| ConfigurationError::MalformedConfig(format!("Cannot parse {} as boolean", field_name)))
}

fn parse_usize(value: &Value, field_name: &str) -> Result<usize, ConfigurationError> {
    value
        .as_integer()
        .filter(|v| *v >= 0)
        .ok_or_else(|| ConfigurationError::MalformedConfig(format!("Cannot parse {} as unsigned integer", field_name)))
        .map(|v| v as usize)
}

fn parse_f64(value: &Value, field_name: &str) -> Result<f64, ConfigurationError> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|v| v as f64))
        .ok_or_else(|| ConfigurationError::MalformedConfig(format!("Cannot parse {} as float", field_name)))
}

fn parse_string(value: &Value, field_name: &str) -> Result<String, ConfigurationError> {
    value
        .as_str()
        .ok_or_else(|| ConfigurationError::MalformedConfig(format!("Cannot parse {} as string", field_name)))
        .map(String::from)
}

fn parse_value_with_default<T>(
    table: Option<&Value>,
    key: &str,
    parser: impl Fn(&Value, &str) -> Result<T, ConfigurationError>,
    default: T,
) -> Result<T, ConfigurationError> {
    table
        .and_then(|table| table.get(key))
        .map_or(Ok(default), |value| parser(value, key))
}

fn get_onset_detection_params(table: Option<&Value>) -> Result<OnsetDetectionParameters, ConfigurationError> {
    let defaults = OnsetDetectionParameters::default();

    let params = OnsetDetectionParameters {
        sampling_rate: parse_value_with_default(table, "sampling_rate", parse_f64, defaults.sampling_rate)?,
        digitize_threshold: parse_value_with_default(table, "digitize_threshold", parse_f64, defaults.digitize_threshold)?,
        filter_size: parse_value_with_default(table, "filter_size", parse_f64, defaults.filter_size)?,
        segment_threshold: parse_value_with_default(table, "segment_threshold", parse_f64, defaults.segment_threshold)?,
        smallest_interval: parse_value_with_default(table, "smallest_interval", parse_f64, defaults.smallest_interval)?,
    };
    debug!("onset_detection: {:?}", params);

    Ok(params)
}

impl MappingConfig {
    /// Reads the configuration from a toml string, see the module documentation for the keys
    pub fn from_toml_str(content: &str) -> Result<MappingConfig, MappingError> {
        let config: Value = from_str(content)?;
        let defaults = MappingConfig::default();

        let onset_detection = get_onset_detection_params(config.get("onset_detection"))?;

        let mapping_table = config.get("mapping");

        let temporal_downsample_rate = parse_value_with_default(
            mapping_table, "temporal_downsample_rate", parse_usize, defaults.temporal_downsample_rate
        )?;
        debug!("temporal_downsample_rate: {}", temporal_downsample_rate);

        let fft_mode: String = parse_value_with_default(mapping_table, "fft_mode", parse_string, String::from("peak"))?;
        let fft_mode = FftMode::from_str(&fft_mode)?;
        debug!("fft_mode: {:?}", fft_mode);

        let cycles = parse_value_with_default(mapping_table, "cycles", parse_usize, defaults.cycles)?;
        debug!("cycles: {}", cycles);

        let rectify = parse_value_with_default(mapping_table, "rectify", parse_bool, defaults.rectify)?;
        debug!("rectify: {}", rectify);

        let strict_sweep_count = parse_value_with_default(
            mapping_table, "strict_sweep_count", parse_bool, defaults.strict_sweep_count
        )?;
        debug!("strict_sweep_count: {}", strict_sweep_count);

        let config = MappingConfig {
            onset_detection,
            temporal_downsample_rate,
            fft_mode,
            cycles,
            rectify,
            strict_sweep_count,
        };
        config.validate()?;

        Ok(config)
    }

    /// Reads the configuration from a toml file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<MappingConfig, MappingError> {
        let content = read_to_string(path)?;

        MappingConfig::from_toml_str(&content)
    }

    /// Checks that every parameter is within its valid range
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let params = &self.onset_detection;

        if !params.sampling_rate.is_finite() || params.sampling_rate <= 0. {
            return Err(ConfigurationError::InvalidParameter(
                format!("sampling_rate must be positive, got {}", params.sampling_rate)
            ));
        }
        if !params.filter_size.is_finite() || params.filter_size < 0. {
            return Err(ConfigurationError::InvalidParameter(
                format!("filter_size must not be negative, got {}", params.filter_size)
            ));
        }
        if !params.smallest_interval.is_finite() || params.smallest_interval < 0. {
            return Err(ConfigurationError::InvalidParameter(
                format!("smallest_interval must not be negative, got {}", params.smallest_interval)
            ));
        }
        if self.temporal_downsample_rate < 1 {
            return Err(ConfigurationError::InvalidParameter(
                String::from("temporal_downsample_rate must be at least 1")
            ));
        }
        if self.cycles < 1 {
            return Err(ConfigurationError::InvalidParameter(String::from("cycles must be at least 1")));
        }

        Ok(())
    }
}
