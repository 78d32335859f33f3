use std::fmt::{Display, Debug, Formatter, Result};
use crate::display_log::SweepDirection;


/// Error set for malformed or unsupported inputs and configurations
pub enum ConfigurationError {
    /// Display log was generated by a stimulus other than the all-direction sweep
    UnknownStimulus(String),
    /// Display log was presented in reversed order
    ReversedDisplayOrder,
    /// Display order is neither `1` nor `-1`
    UnsupportedDisplayOrder(i64),
    /// Number of display timestamps does not match number of display frames
    FrameTimestampMismatch { frames: usize, timestamps: usize },
    /// Display frames cannot be split evenly into display iterations
    UnevenDisplayIterations { frames: usize, display_iteration: usize },
    /// Frames of a direction cannot be split evenly into its repeated sweeps
    UnevenSweepRepeats { direction: SweepDirection, frames: usize, iteration: usize },
    /// Neither pre gap duration nor pre gap frame number is present
    MissingPreGap,
    /// Direction never presented in the display log
    MissingDirection(SweepDirection),
    /// Sweep index of a display frame is not in the sweep table
    SweepIndexOutOfRange { index: usize, table_len: usize },
    /// Phase position equation cannot be fit for the given direction
    DegenerateCalibration(SweepDirection),
    /// A parameter is out of its valid range
    InvalidParameter(String),
    /// Display log could not be deserialized
    MalformedLog(String),
    /// Configuration could not be read
    MalformedConfig(String),
    /// Number of movie frames does not match number of frame timestamps
    MovieTimestampMismatch { frames: usize, timestamps: usize },
    /// Raw movie file does not hold a whole number of frames
    IncompleteRawMovie { payload_bytes: usize, frame_bytes: usize },
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ConfigurationError::UnknownStimulus(name) => write!(
                f, "Stimulus '{}' is not supported (expected KSstimAllDir)", name
            ),
            ConfigurationError::ReversedDisplayOrder => write!(f, "Display order is -1 (should be 1)"),
            ConfigurationError::UnsupportedDisplayOrder(order) => write!(
                f, "Display order must be 1 or -1, got {}", order
            ),
            ConfigurationError::FrameTimestampMismatch { frames, timestamps } => write!(
                f, "Display log has {} frames but {} timestamps", frames, timestamps
            ),
            ConfigurationError::UnevenDisplayIterations { frames, display_iteration } => write!(
                f, "{} display frames cannot be split into {} display iterations", frames, display_iteration
            ),
            ConfigurationError::UnevenSweepRepeats { direction, frames, iteration } => write!(
                f, "{} frames of direction {} cannot be split into {} sweeps", frames, direction, iteration
            ),
            ConfigurationError::MissingPreGap => write!(
                f, "Display log has neither preGapDur nor preGapFrameNum"
            ),
            ConfigurationError::MissingDirection(direction) => write!(
                f, "Direction {} was never presented", direction
            ),
            ConfigurationError::SweepIndexOutOfRange { index, table_len } => write!(
                f, "Sweep index {} is outside of sweep table of length {}", index, table_len
            ),
            ConfigurationError::DegenerateCalibration(direction) => write!(
                f, "Cannot fit phase position equation for direction {}", direction
            ),
            ConfigurationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ConfigurationError::MalformedLog(msg) => write!(f, "Malformed display log: {}", msg),
            ConfigurationError::MalformedConfig(msg) => write!(f, "Malformed configuration: {}", msg),
            ConfigurationError::MovieTimestampMismatch { frames, timestamps } => write!(
                f, "Movie has {} frames but {} frame timestamps", frames, timestamps
            ),
            ConfigurationError::IncompleteRawMovie { payload_bytes, frame_bytes } => write!(
                f, "Raw movie payload of {} bytes is not a multiple of frame size {}", payload_bytes, frame_bytes
            ),
        }
    }
}

impl Debug for ConfigurationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for inconsistent timing of display frames, imaging frames or sweeps
pub enum TimingError {
    /// Mean visual display frame interval is more than 1% above the refresh interval
    DisplayIntervalTooLong { interval: f64, expected: f64 },
    /// Mean visual display frame interval is more than 1% below the refresh interval
    DisplayIntervalTooShort { interval: f64, expected: f64 },
    /// Sweep expected from the display log has no detected onset
    OnsetCountMismatch { direction: SweepDirection, index: usize, onsets: usize },
    /// Not enough timestamps to estimate a frame interval
    TooFewTimestamps(usize),
    /// Timestamps are not strictly increasing at the given index
    NonIncreasingTimestamps(usize),
}

impl Display for TimingError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            TimingError::DisplayIntervalTooLong { interval, expected } => write!(
                f, "Mean visual display too long: {} sec (expected {} sec)", interval, expected
            ),
            TimingError::DisplayIntervalTooShort { interval, expected } => write!(
                f, "Mean visual display too short: {} sec (expected {} sec)", interval, expected
            ),
            TimingError::OnsetCountMismatch { direction, index, onsets } => write!(
                f, "Sweep {} of direction {} has no onset ({} onsets detected)", index, direction, onsets
            ),
            TimingError::TooFewTimestamps(n) => write!(
                f, "At least 2 timestamps are required, got {}", n
            ),
            TimingError::NonIncreasingTimestamps(i) => write!(
                f, "Timestamps are not strictly increasing at index {}", i
            ),
        }
    }
}

impl Debug for TimingError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for degenerate numeric inputs
pub enum ArithmeticError {
    /// Power map has no positive maximum and cannot be normalized
    AllZeroPowerMap(String),
    /// Average over zero movie chunks
    EmptyAverage,
    /// Averaged movie has no baseline picture to normalize against
    MissingBaseline,
    /// Baseline picture has a zero pixel
    ZeroBaseline,
}

impl Display for ArithmeticError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ArithmeticError::AllZeroPowerMap(name) => write!(
                f, "Power map '{}' has no positive maximum", name
            ),
            ArithmeticError::EmptyAverage => write!(f, "Cannot average zero movie chunks"),
            ArithmeticError::MissingBaseline => write!(f, "Averaged movie has no baseline picture"),
            ArithmeticError::ZeroBaseline => write!(f, "Baseline picture contains zero pixels"),
        }
    }
}

impl Debug for ArithmeticError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// Error set for malformed arguments
pub enum ValueError {
    /// Temporal downsample rate must be at least 1
    InvalidDownsampleRate(usize),
    /// Number of cycles must address a non zero frequency within the movie
    InvalidCycles { cycles: usize, frames: usize },
    /// Movie has no frames or no pixels
    EmptyMovie,
    /// Movie array is not 3 dimensional
    NotThreeDimensional(usize),
    /// Arrays that must match in shape do not
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },
    /// Sampling rate must be positive and finite
    InvalidSamplingRate(f64),
    /// A duration or interval is out of range
    InvalidDuration { name: &'static str, value: f64 },
    /// Requested frames are outside of the movie
    FrameRangeOutOfBounds { start: usize, end: usize, frames: usize },
    /// Map for the given direction was not provided
    MissingDirection(SweepDirection),
}

impl Display for ValueError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ValueError::InvalidDownsampleRate(rate) => write!(
                f, "Temporal downsample rate can not be less than 1, got {}", rate
            ),
            ValueError::InvalidCycles { cycles, frames } => write!(
                f, "Cycles must be within 1..{}, got {}", frames, cycles
            ),
            ValueError::EmptyMovie => write!(f, "Movie is empty"),
            ValueError::NotThreeDimensional(ndim) => write!(
                f, "Movie must be 3 dimensional (frames, height, width), got {} dimensions", ndim
            ),
            ValueError::ShapeMismatch { expected, found } => write!(
                f, "Expected shape {:?}, found {:?}", expected, found
            ),
            ValueError::InvalidSamplingRate(rate) => write!(
                f, "Sampling rate must be positive and finite, got {}", rate
            ),
            ValueError::InvalidDuration { name, value } => write!(
                f, "Invalid value for {}: {}", name, value
            ),
            ValueError::FrameRangeOutOfBounds { start, end, frames } => write!(
                f, "Frames {}..{} are outside of movie with {} frames", start, end, frames
            ),
            ValueError::MissingDirection(direction) => write!(
                f, "No map provided for direction {}", direction
            ),
        }
    }
}

impl Debug for ValueError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

/// A set of errors that may occur when running the mapping pipeline
pub enum MappingError {
    /// Errors related to log structure or configuration
    ConfigurationRelatedError(ConfigurationError),
    /// Errors related to frame or sweep timing
    TimingRelatedError(TimingError),
    /// Errors related to degenerate numeric inputs
    ArithmeticRelatedError(ArithmeticError),
    /// Errors related to malformed arguments
    ValueRelatedError(ValueError),
    /// Errors from reading or mapping files
    Io(std::io::Error),
    /// Errors from writing `.npy` arrays
    NpyWrite(ndarray_npy::WriteNpyError),
    /// Errors from reading `.npy` arrays
    NpyRead(ndarray_npy::ReadNpyError),
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            MappingError::ConfigurationRelatedError(err) => write!(f, "{}", err),
            MappingError::TimingRelatedError(err) => write!(f, "{}", err),
            MappingError::ArithmeticRelatedError(err) => write!(f, "{}", err),
            MappingError::ValueRelatedError(err) => write!(f, "{}", err),
            MappingError::Io(err) => write!(f, "IO error: {}", err),
            MappingError::NpyWrite(err) => write!(f, "Cannot write npy file: {}", err),
            MappingError::NpyRead(err) => write!(f, "Cannot read npy file: {}", err),
        }
    }
}

impl Debug for MappingError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}

impl std::error::Error for MappingError {}

impl From<ConfigurationError> for MappingError {
    fn from(err: ConfigurationError) -> MappingError {
        MappingError::ConfigurationRelatedError(err)
    }
}

impl From<TimingError> for MappingError {
    fn from(err: TimingError) -> MappingError {
        MappingError::TimingRelatedError(err)
    }
}

impl From<ArithmeticError> for MappingError {
    fn from(err: ArithmeticError) -> MappingError {
        MappingError::ArithmeticRelatedError(err)
    }
}

impl From<ValueError> for MappingError {
    fn from(err: ValueError) -> MappingError {
        MappingError::ValueRelatedError(err)
    }
}

impl From<std::io::Error> for MappingError {
    fn from(err: std::io::Error) -> MappingError {
        MappingError::Io(err)
    }
}

impl From<ndarray_npy::WriteNpyError> for MappingError {
    fn from(err: ndarray_npy::WriteNpyError) -> MappingError {
        MappingError::NpyWrite(err)
    }
}

impl From<ndarray_npy::ReadNpyError> for MappingError {
    fn from(err: ndarray_npy::ReadNpyError) -> MappingError {
        MappingError::NpyRead(err)
    }
}

impl From<serde_json::Error> for MappingError {
    fn from(err: serde_json::Error) -> MappingError {
        MappingError::ConfigurationRelatedError(ConfigurationError::MalformedLog(err.to_string()))
    }
}

impl From<toml::de::Error> for MappingError {
    fn from(err: toml::de::Error) -> MappingError {
        MappingError::ConfigurationRelatedError(ConfigurationError::MalformedConfig(err.to_string()))
    }
}
