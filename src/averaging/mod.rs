//! Averaging of movie chunks aligned to sweep onsets.

use log::{info, warn};
use ndarray::{s, Array2, Array3, Axis};
use crate::error::{ArithmeticError, ConfigurationError, MappingError, TimingError, ValueError};
use crate::movie::MovieSource;


/// Average of movie chunks aligned to a set of onsets
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedMovie {
    /// Averaged frames, `(time, height, width)`
    pub movie: Array3<f64>,
    /// Time of each averaged frame relative to the onsets (seconds)
    pub timestamps: Vec<f64>,
    /// Number of chunks that were averaged
    pub chunk_count: usize,
    /// Mean of the averaged frames before the onset, only present for a negative start offset
    pub baseline: Option<Array2<f64>>,
}

impl AveragedMovie {
    /// Change of every frame relative to the baseline picture, `(F - F0) / F0`
    pub fn df_over_f(&self) -> Result<Array3<f64>, MappingError> {
        let baseline = self.baseline.as_ref().ok_or(ArithmeticError::MissingBaseline)?;

        if baseline.iter().any(|x| *x == 0.) {
            return Err(ArithmeticError::ZeroBaseline.into());
        }

        Ok((&self.movie - baseline) / baseline)
    }
}

/// Sets every negative value to zero
pub fn rectify(movie: &Array3<f64>) -> Array3<f64> {
    movie.mapv(|x| x.max(0.))
}

/// Keeps every `rate`-th timestamp starting with the first, a rate below 1 is an error
pub fn downsample_timestamps(frame_timestamps: &[f64], rate: usize) -> Result<Vec<f64>, ValueError> {
    if rate < 1 {
        return Err(ValueError::InvalidDownsampleRate(rate));
    }

    Ok(frame_timestamps.iter().step_by(rate).copied().collect())
}

fn check_increasing(timestamps: &[f64]) -> Result<(), TimingError> {
    if timestamps.len() < 2 {
        return Err(TimingError::TooFewTimestamps(timestamps.len()));
    }

    match timestamps.windows(2).position(|w| !(w[1] > w[0])) {
        Some(i) => Err(TimingError::NonIncreasingTimestamps(i + 1)),
        None => Ok(()),
    }
}

/// Averages the chunks of `movie` that start at each onset plus `start_offset` and
/// last `chunk_duration` seconds
///
/// - `movie` : movie with one frame per (downsampled) timestamp
///
/// - `frame_timestamps` : time of every frame of the raw recording (seconds)
///
/// - `onset_times` : onset of each sweep (seconds)
///
/// - `chunk_duration` : length of each chunk (seconds)
///
/// - `start_offset` : chunk start relative to the onset (seconds), negative to include a baseline
///
/// - `downsample_rate` : temporal decimation applied to the movie after recording
///
/// Chunks that do not lie within the recording are skipped, every other chunk is
/// truncated to the length of the shortest one. Frames are read one chunk at a time.
pub fn average_chunks<M: MovieSource + ?Sized>(
    movie: &M,
    frame_timestamps: &[f64],
    onset_times: &[f64],
    chunk_duration: f64,
    start_offset: f64,
    downsample_rate: usize,
) -> Result<AveragedMovie, MappingError> {
    let timestamps = downsample_timestamps(frame_timestamps, downsample_rate)?;

    if !chunk_duration.is_finite() || chunk_duration <= 0. {
        return Err(ValueError::InvalidDuration { name: "chunk_duration", value: chunk_duration }.into());
    }
    if !start_offset.is_finite() {
        return Err(ValueError::InvalidDuration { name: "start_offset", value: start_offset }.into());
    }

    check_increasing(&timestamps)?;

    let (frames, height, width) = movie.shape();
    if frames == 0 || height == 0 || width == 0 {
        return Err(ValueError::EmptyMovie.into());
    }
    // decimation may leave one timestamp without a frame
    if frames != timestamps.len() && frames + 1 != timestamps.len() {
        return Err(
            ConfigurationError::MovieTimestampMismatch { frames, timestamps: timestamps.len() }.into()
        );
    }

    if onset_times.is_empty() {
        return Err(ArithmeticError::EmptyAverage.into());
    }

    let mean_frame_duration = (timestamps[timestamps.len() - 1] - timestamps[0])
        / (timestamps.len() - 1) as f64;
    let timestamps = &timestamps[..frames];
    let tolerance = mean_frame_duration * 1e-6;

    let recording_start = timestamps[0];
    let recording_end = timestamps[frames - 1] + mean_frame_duration;

    let mut windows: Vec<(usize, usize)> = Vec::with_capacity(onset_times.len());

    for onset in onset_times {
        let chunk_start = onset + start_offset;
        let chunk_end = chunk_start + chunk_duration;

        if chunk_start < recording_start - tolerance || chunk_end > recording_end + tolerance {
            warn!("Chunk at onset {} sec is outside of the recording, skipping", onset);
            continue;
        }

        let first = timestamps.partition_point(|t| *t < chunk_start - tolerance);
        let last = timestamps.partition_point(|t| *t < chunk_end - tolerance);

        windows.push((first, last - first));
    }

    let chunk_frames = windows.iter()
        .map(|(_, length)| *length)
        .min()
        .unwrap_or(0);

    if chunk_frames == 0 {
        return Err(ArithmeticError::EmptyAverage.into());
    }

    let mut sum_movie: Array3<f64> = Array3::zeros((chunk_frames, height, width));
    for (first, _) in windows.iter() {
        let chunk = movie.read_frames(*first..(*first + chunk_frames))?;
        sum_movie += &chunk;
    }

    let chunk_count = windows.len();
    let average = sum_movie / chunk_count as f64;
    info!("Averaged {} chunks of {} frames", chunk_count, chunk_frames);

    let chunk_timestamps: Vec<f64> = (0..chunk_frames)
        .map(|k| start_offset + k as f64 * mean_frame_duration)
        .collect();

    let baseline = if start_offset < 0. {
        let baseline_frames = chunk_timestamps.iter()
            .filter(|t| **t < 0.)
            .count();

        if baseline_frames > 0 {
            average.slice(s![..baseline_frames, .., ..]).mean_axis(Axis(0))
        } else {
            None
        }
    } else {
        None
    };

    Ok(
        AveragedMovie {
            movie: average,
            timestamps: chunk_timestamps,
            chunk_count,
            baseline,
        }
    )
}
