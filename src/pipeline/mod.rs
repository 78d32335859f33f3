//! Full retinotopic mapping run of one session, from photodiode trace and display log
//! to altitude and azimuth maps.

use std::collections::BTreeMap;
use log::{info, warn};
use crate::averaging::{average_chunks, rectify, AveragedMovie};
use crate::combine::{calibrations_from, combine_direction_maps, DirectionMaps, RetinotopicMaps};
use crate::config::MappingConfig;
use crate::display_log::{parse_display_log, DirectionInfo, DisplayInfo, DisplayLog, SweepDirection};
use crate::error::{ConfigurationError, MappingError, TimingError};
use crate::movie::MovieSource;
use crate::phase_map::phase_map;
use crate::timing::detect_sweep_onsets;


/// Everything produced by a mapping run
#[derive(Debug, Clone, PartialEq)]
pub struct MappingResult {
    /// Combined altitude and azimuth maps
    pub maps: RetinotopicMaps,
    /// Phase and power map of every direction before calibration
    pub direction_maps: BTreeMap<SweepDirection, DirectionMaps>,
    /// Averaged movie of every direction
    pub averaged_movies: BTreeMap<SweepDirection, AveragedMovie>,
}

/// Onset times of the sweeps of one direction, sweeps without a detected onset were not
/// displayed and are dropped, or are an error if `strict` is set
pub fn select_onsets(
    direction: SweepDirection,
    info: &DirectionInfo,
    onsets: &[f64],
    strict: bool,
) -> Result<Vec<f64>, MappingError> {
    let mut selected = Vec::with_capacity(info.sweep_indices.len());

    for &index in info.sweep_indices.iter() {
        match onsets.get(index) {
            Some(onset) => selected.push(*onset),
            None if strict => {
                return Err(TimingError::OnsetCountMismatch { direction, index, onsets: onsets.len() }.into());
            },
            None => warn!(
                "Visual stimulation direction: {} index: {} was not displayed, removed from averaging",
                direction, index,
            ),
        }
    }

    Ok(selected)
}

/// Averages the movie around the sweeps of every direction, generates a phase map and power map
/// for each, and combines them into altitude and azimuth maps
///
/// A direction without any displayed sweep aborts the run.
pub fn run_mapping<M: MovieSource + ?Sized>(
    movie: &M,
    frame_timestamps: &[f64],
    onsets: &[f64],
    display_info: &DisplayInfo,
    config: &MappingConfig,
) -> Result<MappingResult, MappingError> {
    config.validate()?;

    let mut direction_maps: BTreeMap<SweepDirection, DirectionMaps> = BTreeMap::new();
    let mut averaged_movies: BTreeMap<SweepDirection, AveragedMovie> = BTreeMap::new();

    for direction in SweepDirection::ALL {
        info!("Analyzing sweeps with direction: {}", direction);

        let direction_info = display_info.get(&direction)
            .ok_or(ConfigurationError::MissingDirection(direction))?;

        let direction_onsets = select_onsets(direction, direction_info, onsets, config.strict_sweep_count)?;

        let averaged = average_chunks(
            movie,
            frame_timestamps,
            &direction_onsets,
            direction_info.sweep_duration,
            direction_info.start_time_offset,
            config.temporal_downsample_rate,
        )?;

        let (phase, power) = if config.rectify {
            let rectified = rectify(&averaged.df_over_f()?);
            phase_map(&rectified, config.cycles, config.fft_mode.reverse_polarity())?
        } else {
            phase_map(&averaged.movie, config.cycles, config.fft_mode.reverse_polarity())?
        };

        direction_maps.insert(direction, DirectionMaps { phase, power });
        averaged_movies.insert(direction, averaged);
    }

    let maps = combine_direction_maps(&direction_maps, &calibrations_from(display_info))?;

    Ok(
        MappingResult {
            maps,
            direction_maps,
            averaged_movies,
        }
    )
}

/// Detects sweep onsets in the photodiode trace, analyzes the display log and runs
/// [`run_mapping`]
pub fn analyze_session<M: MovieSource + ?Sized>(
    movie: &M,
    frame_timestamps: &[f64],
    photodiode: &[f64],
    display_log: &DisplayLog,
    config: &MappingConfig,
) -> Result<MappingResult, MappingError> {
    config.validate()?;

    let onsets = detect_sweep_onsets(photodiode, &config.onset_detection)?;
    let display_info = parse_display_log(display_log)?;

    run_mapping(movie, frame_timestamps, &onsets, &display_info, config)
}
