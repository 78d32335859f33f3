//! Tools to segment a photodiode recording into stimulus sweep onsets.
//!
//! The photodiode signal is first digitized, then smoothed with a gaussian filter, and
//! the rising edges of the smoothed signal (gated by the digitized signal) are taken
//! as the onsets of each sweep.

use log::{debug, info};
use rayon::prelude::*;
use crate::error::{MappingError, ValueError};


/// Value assigned to photodiode samples below the digitizing threshold
pub const DIGITIZED_LOW: f64 = 0.;
/// Value assigned to photodiode samples at or above the digitizing threshold
pub const DIGITIZED_HIGH: f64 = 5.;

/// Direction of threshold crossing to detect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnsetType {
    /// Signal goes from below the threshold to at or above it
    Rising,
    /// Signal goes from at or above the threshold to below it
    Falling,
}

/// Parameters used to detect sweep onsets from a photodiode trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnsetDetectionParameters {
    /// Sampling rate of the photodiode trace (Hz)
    pub sampling_rate: f64,
    /// Threshold used to digitize the raw photodiode reading
    pub digitize_threshold: f64,
    /// Standard deviation of the smoothing gaussian (seconds)
    pub filter_size: f64,
    /// Threshold on the gated derivative used to detect each sweep onset
    pub segment_threshold: f64,
    /// Smallest interval allowed between two consecutive onsets (seconds)
    pub smallest_interval: f64,
}

impl Default for OnsetDetectionParameters {
    fn default() -> Self {
        OnsetDetectionParameters {
            sampling_rate: 10000.,
            digitize_threshold: 0.9,
            filter_size: 0.01,
            segment_threshold: 0.02,
            smallest_interval: 10.,
        }
    }
}

fn check_sampling_rate(sampling_rate: f64) -> Result<(), ValueError> {
    if !sampling_rate.is_finite() || sampling_rate <= 0. {
        return Err(ValueError::InvalidSamplingRate(sampling_rate));
    }

    Ok(())
}

/// Binarizes the trace, samples below `threshold` become [`DIGITIZED_LOW`]
/// and every other sample becomes [`DIGITIZED_HIGH`]
pub fn digitize(trace: &[f64], threshold: f64) -> Vec<f64> {
    trace.iter()
        .map(|&x| if x < threshold { DIGITIZED_LOW } else { DIGITIZED_HIGH })
        .collect()
}

// half sample symmetric reflection, (d c b a | a b c d | d c b a)
fn reflect_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period);

    if m >= n as isize {
        (period - 1 - m) as usize
    } else {
        m as usize
    }
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4. * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();

    weights.iter().map(|w| w / total).collect()
}

/// Smooths the trace with a gaussian of standard deviation `sigma` (samples),
/// the kernel is truncated at 4 standard deviations and the trace is reflected
/// about its edges, a `sigma` of zero returns the trace unchanged
pub fn gaussian_filter1d(trace: &[f64], sigma: f64) -> Vec<f64> {
    if sigma <= 0. || trace.is_empty() {
        return trace.to_vec();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let n = trace.len();

    (0..n).into_par_iter()
        .map(|i| {
            kernel.iter()
                .enumerate()
                .map(|(k, w)| {
                    let j = i as isize + k as isize - radius;
                    w * trace[reflect_index(j, n)]
                })
                .sum::<f64>()
        })
        .collect()
}

/// First difference of the trace with a zero prepended so the output
/// has the same length as the input
pub fn diff_prepend_zero(trace: &[f64]) -> Vec<f64> {
    if trace.is_empty() {
        return Vec::new();
    }

    std::iter::once(0.)
        .chain(trace.windows(2).map(|w| w[1] - w[0]))
        .collect()
}

/// Returns the time (seconds) of every crossing of `threshold` in the given direction,
/// the crossing time is the index of the first sample past the threshold divided by the
/// sampling rate
pub fn get_onset_timestamps(
    trace: &[f64],
    sampling_rate: f64,
    threshold: f64,
    onset_type: OnsetType,
) -> Result<Vec<f64>, MappingError> {
    check_sampling_rate(sampling_rate)?;

    let onsets = trace.windows(2)
        .enumerate()
        .filter(|(_, w)| match onset_type {
            OnsetType::Rising => w[0] < threshold && w[1] >= threshold,
            OnsetType::Falling => w[0] >= threshold && w[1] < threshold,
        })
        .map(|(i, _)| (i + 1) as f64 / sampling_rate)
        .collect();

    Ok(onsets)
}

/// Drops every onset that comes less than `smallest_interval` after the previously kept onset
pub fn remove_close_onsets(onsets: &[f64], smallest_interval: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::with_capacity(onsets.len());

    for &onset in onsets {
        match kept.last() {
            Some(&last) if onset - last < smallest_interval => {},
            _ => kept.push(onset),
        }
    }

    kept
}

/// Detects the onset time (seconds) of each stimulus sweep in a photodiode trace
///
/// - `trace` : photodiode readings
///
/// - `sampling_rate` : sampling rate of the trace (Hz)
///
/// - `digitize_threshold` : threshold used to binarize the raw readings
///
/// - `filter_size` : standard deviation of the smoothing gaussian (seconds)
///
/// - `segment_threshold` : threshold on the gated derivative marking an onset
///
/// - `smallest_interval` : minimum time between two kept onsets (seconds)
///
/// An empty trace returns no onsets, so does a `digitize_threshold` at or below the trace
/// minimum since every sample digitizes high.
pub fn detect_onsets(
    trace: &[f64],
    sampling_rate: f64,
    digitize_threshold: f64,
    filter_size: f64,
    segment_threshold: f64,
    smallest_interval: f64,
) -> Result<Vec<f64>, MappingError> {
    check_sampling_rate(sampling_rate)?;
    if !filter_size.is_finite() || filter_size < 0. {
        return Err(ValueError::InvalidDuration { name: "filter_size", value: filter_size }.into());
    }
    if !smallest_interval.is_finite() || smallest_interval < 0. {
        return Err(ValueError::InvalidDuration { name: "smallest_interval", value: smallest_interval }.into());
    }

    if trace.is_empty() {
        info!("Number of photodiode onsets: 0");
        return Ok(Vec::new());
    }

    let digitized = digitize(trace, digitize_threshold);

    let filter_points = (filter_size * sampling_rate).floor();
    let filtered = gaussian_filter1d(&digitized, filter_points);

    // gate derivative by the digitized trace so falling edges during the off phase are ignored
    let signal: Vec<f64> = diff_prepend_zero(&filtered).iter()
        .zip(digitized.iter())
        .map(|(d, x)| d * x)
        .collect();

    let onsets = get_onset_timestamps(&signal, sampling_rate, segment_threshold, OnsetType::Rising)?;
    let onsets = remove_close_onsets(&onsets, smallest_interval);

    info!("Number of photodiode onsets: {}", onsets.len());
    for onset in onsets.iter() {
        debug!("Display onset: {} sec", onset);
    }

    Ok(onsets)
}

/// Detects sweep onsets with a parameter set from the mapping configuration,
/// see [`detect_onsets`]
pub fn detect_sweep_onsets(
    trace: &[f64],
    params: &OnsetDetectionParameters,
) -> Result<Vec<f64>, MappingError> {
    detect_onsets(
        trace,
        params.sampling_rate,
        params.digitize_threshold,
        params.filter_size,
        params.segment_threshold,
        params.smallest_interval,
    )
}
