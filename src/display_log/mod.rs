//! Typed visual display log of a retinotopic mapping session and the analysis that
//! turns it into per direction sweep information.
//!
//! The log is written by the stimulus display software at the end of a session. Each
//! displayed frame records the sweep direction and the index into the sweep table
//! (the visual field position, in degrees, of the bar center) shown on that frame.

use std::{
    collections::BTreeMap,
    f64::consts::PI,
    fmt::{Display, Formatter},
    fs::read_to_string,
    path::Path,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use crate::error::{ConfigurationError, MappingError, TimingError};
use crate::fitting::{linear_regression, pearsonr, LinearEquation};


/// Name of the only stimulus whose display log can be analyzed
pub const ALL_DIRECTION_SWEEP_STIMULUS: &str = "KSstimAllDir";

/// Allowed relative deviation of the mean display frame interval from the refresh interval
pub const DISPLAY_INTERVAL_TOLERANCE: f64 = 0.01;

/// Minimum absolute correlation between phase and position before a warning is logged
pub const CALIBRATION_CORRELATION_WARNING: f64 = 0.99;

/// Scan direction of the moving bar stimulus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SweepDirection {
    #[serde(rename = "B2U")]
    BottomToUp,
    #[serde(rename = "U2B")]
    UpToBottom,
    #[serde(rename = "L2R")]
    LeftToRight,
    #[serde(rename = "R2L")]
    RightToLeft,
}

impl SweepDirection {
    /// Every direction, altitude directions first
    pub const ALL: [SweepDirection; 4] = [
        SweepDirection::BottomToUp,
        SweepDirection::UpToBottom,
        SweepDirection::LeftToRight,
        SweepDirection::RightToLeft,
    ];

    /// Label used in display logs and output file names
    pub fn label(&self) -> &'static str {
        match self {
            SweepDirection::BottomToUp => "B2U",
            SweepDirection::UpToBottom => "U2B",
            SweepDirection::LeftToRight => "L2R",
            SweepDirection::RightToLeft => "R2L",
        }
    }
}

impl Display for SweepDirection {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single displayed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFrame {
    /// `1` if the sweep is on screen, `0` during gray gap periods
    #[serde(default)]
    pub is_display: i32,
    /// Phase of the flickering checkerboard inside the bar
    #[serde(default)]
    pub square_polarity: f64,
    /// Index into the sweep table, `None` during gap periods
    #[serde(default)]
    pub sweep_index: Option<usize>,
    /// Color of the photodiode indicator patch
    #[serde(default)]
    pub indicator_color: f64,
    /// Direction of the sweep this frame belongs to
    pub direction: SweepDirection,
}

fn default_iteration() -> usize {
    1
}

/// Stimulus parameters recorded in the display log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stimulation {
    pub stim_name: String,
    /// Gray period before each sweep (seconds)
    #[serde(default)]
    pub pre_gap_dur: Option<f64>,
    /// Gray period before each sweep (frames), used when `pre_gap_dur` is absent
    #[serde(default)]
    pub pre_gap_frame_num: Option<u64>,
    /// Number of consecutive repeats of every direction within one display iteration
    #[serde(default = "default_iteration")]
    pub iteration: usize,
    /// Visual field position (degrees) of the bar center for each sweep index
    pub sweep_table: Vec<f64>,
}

/// Presentation record of the display log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// `1` for forward presentation, `-1` for reversed presentation
    pub display_order: i64,
    /// Number of times the whole frame sequence was displayed
    pub display_iteration: usize,
    /// Time of each displayed frame (seconds)
    pub time_stamp: Vec<f64>,
    /// Every displayed frame, all display iterations concatenated
    pub display_frames: Vec<DisplayFrame>,
}

/// Monitor used for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    /// Refresh rate (Hz)
    pub refresh_rate: f64,
}

/// Visual display log of a mapping session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayLog {
    pub stimulation: Stimulation,
    pub presentation: Presentation,
    pub monitor: Monitor,
}

impl DisplayLog {
    /// Reads a display log from a json string
    pub fn from_json_str(content: &str) -> Result<DisplayLog, MappingError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads a display log from a json file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<DisplayLog, MappingError> {
        let content = read_to_string(path)?;

        DisplayLog::from_json_str(&content)
    }
}

/// Sweep information of one direction
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionInfo {
    /// Indices of the sweeps of this direction in the whole session
    pub sweep_indices: Vec<usize>,
    /// Chunk start time relative to sweep onset (seconds), negative for a pre onset baseline
    pub start_time_offset: f64,
    /// Duration of a single sweep (seconds)
    pub sweep_duration: f64,
    /// Linear relationship between fourier phase (radians) and visual field position (degrees)
    pub phase_to_position: LinearEquation,
}

/// Sweep information for every direction
pub type DisplayInfo = BTreeMap<SweepDirection, DirectionInfo>;

fn check_display_interval(time_stamp: &[f64], refresh_rate: f64) -> Result<(), MappingError> {
    if time_stamp.len() < 2 {
        return Err(TimingError::TooFewTimestamps(time_stamp.len()).into());
    }

    let n = time_stamp.len();
    let interval = (time_stamp[n - 1] - time_stamp[0]) / (n - 1) as f64;
    let expected = 1. / refresh_rate;

    if interval > (1. + DISPLAY_INTERVAL_TOLERANCE) * expected {
        return Err(TimingError::DisplayIntervalTooLong { interval, expected }.into());
    }
    if interval < (1. - DISPLAY_INTERVAL_TOLERANCE) * expected {
        return Err(TimingError::DisplayIntervalTooShort { interval, expected }.into());
    }

    Ok(())
}

fn get_start_time(stimulation: &Stimulation, refresh_rate: f64) -> Result<f64, ConfigurationError> {
    match (stimulation.pre_gap_dur, stimulation.pre_gap_frame_num) {
        (Some(duration), _) => Ok(-duration),
        (None, Some(frame_num)) => Ok(-(frame_num as f64) / refresh_rate),
        (None, None) => Err(ConfigurationError::MissingPreGap),
    }
}

/// Fits the linear relationship between phase and visual field position from the frames of
/// one direction, frame `j` of a sweep of `n` frames has phase `2 * pi * j / n` and every frame
/// with a sweep index contributes the position of that index in the sweep table
pub fn get_phase_position_equation(
    direction: SweepDirection,
    frames: &[&DisplayFrame],
    sweep_table: &[f64],
    iteration: usize,
) -> Result<LinearEquation, MappingError> {
    let iteration = iteration.max(1);
    if frames.len() % iteration != 0 {
        return Err(ConfigurationError::UnevenSweepRepeats { direction, frames: frames.len(), iteration }.into());
    }

    let sweep_frame_num = frames.len() / iteration;
    if sweep_frame_num == 0 {
        return Err(ConfigurationError::DegenerateCalibration(direction).into());
    }

    let mut phases: Vec<f64> = Vec::new();
    let mut positions: Vec<f64> = Vec::new();

    for (j, frame) in frames.iter().enumerate() {
        if let Some(index) = frame.sweep_index {
            let position = sweep_table.get(index)
                .ok_or(ConfigurationError::SweepIndexOutOfRange { index, table_len: sweep_table.len() })?;

            phases.push(2. * PI * (j % sweep_frame_num) as f64 / sweep_frame_num as f64);
            positions.push(*position);
        }
    }

    let equation = linear_regression(&phases, &positions)?
        .ok_or(ConfigurationError::DegenerateCalibration(direction))?;

    let r = pearsonr(&phases, &positions)?;
    debug!("{} phase position correlation: {}", direction, r);
    if !(r.abs() >= CALIBRATION_CORRELATION_WARNING) {
        warn!("Phase position correlation for {} sweeps is only {}", direction, r);
    }

    Ok(equation)
}

/// Generates the sweep information for every direction of a mapping display log
///
/// The log must come from the all direction sweep stimulus, must have been presented in
/// forward order, and its mean display frame interval must be within 1% of the monitor
/// refresh interval.
pub fn parse_display_log(log: &DisplayLog) -> Result<DisplayInfo, MappingError> {
    let stimulation = &log.stimulation;
    let presentation = &log.presentation;

    if stimulation.stim_name != ALL_DIRECTION_SWEEP_STIMULUS {
        return Err(ConfigurationError::UnknownStimulus(stimulation.stim_name.clone()).into());
    }

    match presentation.display_order {
        1 => {},
        -1 => { return Err(ConfigurationError::ReversedDisplayOrder.into()) },
        order => { return Err(ConfigurationError::UnsupportedDisplayOrder(order).into()) },
    }

    let refresh_rate = log.monitor.refresh_rate;
    if !refresh_rate.is_finite() || refresh_rate <= 0. {
        return Err(ConfigurationError::InvalidParameter(format!("refresh rate {}", refresh_rate)).into());
    }
    if presentation.display_iteration == 0 {
        return Err(ConfigurationError::InvalidParameter(String::from("display iteration must be at least 1")).into());
    }
    if stimulation.iteration == 0 {
        return Err(ConfigurationError::InvalidParameter(String::from("iteration must be at least 1")).into());
    }

    let frames = &presentation.display_frames;
    if frames.len() % presentation.display_iteration != 0 {
        return Err(
            ConfigurationError::UnevenDisplayIterations {
                frames: frames.len(),
                display_iteration: presentation.display_iteration,
            }.into()
        );
    }
    if presentation.time_stamp.len() != frames.len() {
        return Err(
            ConfigurationError::FrameTimestampMismatch {
                frames: frames.len(),
                timestamps: presentation.time_stamp.len(),
            }.into()
        );
    }

    check_display_interval(&presentation.time_stamp, refresh_rate)?;

    let start_time = get_start_time(stimulation, refresh_rate)?;
    info!("Movie chunk start time relative to sweep onset: {} sec", start_time);

    let iteration_frames = &frames[..frames.len() / presentation.display_iteration];

    let mut dir_list: Vec<SweepDirection> = Vec::new();
    let mut direction_frames: BTreeMap<SweepDirection, Vec<&DisplayFrame>> = BTreeMap::new();

    for frame in iteration_frames {
        if !dir_list.contains(&frame.direction) {
            dir_list.push(frame.direction);
        }
        direction_frames.entry(frame.direction).or_default().push(frame);
    }

    // every direction is repeated `iteration` times in a row, then the whole sequence repeats
    let iteration = stimulation.iteration;
    let sweep_order: Vec<SweepDirection> = (0..presentation.display_iteration)
        .flat_map(|_| {
            dir_list.iter()
                .flat_map(move |direction| std::iter::repeat(*direction).take(iteration))
        })
        .collect();

    let mut display_info = DisplayInfo::new();

    for direction in SweepDirection::ALL {
        let current_frames = direction_frames.get(&direction)
            .ok_or(ConfigurationError::MissingDirection(direction))?;

        let sweep_indices: Vec<usize> = sweep_order.iter()
            .enumerate()
            .filter(|(_, dir)| **dir == direction)
            .map(|(ind, _)| ind)
            .collect();
        info!("{} sweep order indices: {:?}", direction, sweep_indices);

        let sweep_duration = current_frames.len() as f64 / (stimulation.iteration as f64 * refresh_rate);
        info!("Chunk duration for {} sweeps: {} sec", direction, sweep_duration);

        let phase_to_position = get_phase_position_equation(
            direction,
            current_frames,
            &stimulation.sweep_table,
            stimulation.iteration,
        )?;
        info!(
            "{} phase position equation: slope {}, intercept {}",
            direction, phase_to_position.slope, phase_to_position.intercept,
        );

        display_info.insert(
            direction,
            DirectionInfo {
                sweep_indices,
                start_time_offset: start_time,
                sweep_duration,
                phase_to_position,
            }
        );
    }

    Ok(display_info)
}
