//! Fourier phase and power maps of averaged movies.

use std::{f64::consts::PI, str::FromStr};
use ndarray::{Array2, Array3, Axis, Zip};
use num_complex::Complex;
use rustfft::FftPlanner;
use crate::error::{ConfigurationError, MappingError, ValueError};


/// Whether the response is detected as a peak or as a valley of the pixel time course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftMode {
    Peak,
    Valley,
}

impl FftMode {
    /// Valley detection reverses the polarity of the phase
    pub fn reverse_polarity(&self) -> bool {
        matches!(self, FftMode::Valley)
    }
}

impl FromStr for FftMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "peak" => Ok(FftMode::Peak),
            "valley" => Ok(FftMode::Valley),
            _ => Err(ConfigurationError::InvalidParameter(
                format!("fft mode should be either \"peak\" or \"valley\", got \"{}\"", s)
            )),
        }
    }
}

/// Generates the phase map and power map of a `(time, height, width)` movie at the
/// frequency of `cycles` repetitions over the movie
///
/// The power of a pixel is `2 * |X[cycles]| / N` and its phase is `-arg(X[cycles])`
/// wrapped into `[0, 2 * pi)`, where `X` is the discrete fourier transform of the
/// pixel time course of length `N`. With `reverse_polarity` the phase is negated.
/// Pixels are processed in parallel.
pub fn phase_map(
    movie: &Array3<f64>,
    cycles: usize,
    reverse_polarity: bool,
) -> Result<(Array2<f64>, Array2<f64>), MappingError> {
    let (frames, height, width) = movie.dim();
    if frames == 0 || height == 0 || width == 0 {
        return Err(ValueError::EmptyMovie.into());
    }
    if cycles == 0 || cycles >= frames {
        return Err(ValueError::InvalidCycles { cycles, frames }.into());
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(frames);

    let mut phase: Array2<f64> = Array2::zeros((height, width));
    let mut power: Array2<f64> = Array2::zeros((height, width));

    Zip::from(&mut phase)
        .and(&mut power)
        .and(movie.lanes(Axis(0)))
        .par_for_each(|pixel_phase, pixel_power, trace| {
            let mut spectrum: Vec<Complex<f64>> = trace.iter()
                .map(|x| Complex::new(*x, 0.))
                .collect();
            fft.process(&mut spectrum);

            let value = spectrum[cycles];

            *pixel_power = 2. * value.norm() / frames as f64;

            let mut wrapped = (-value.arg()).rem_euclid(2. * PI);
            if wrapped >= 2. * PI {
                wrapped = 0.;
            }

            *pixel_phase = if reverse_polarity { -wrapped } else { wrapped };
        });

    Ok((phase, power))
}
