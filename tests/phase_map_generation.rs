#[cfg(test)]
mod tests {
    use std::{f64::consts::PI, str::FromStr};
    use ndarray::{Array2, Array3};
    use cortical_mapping::{
        error::{ConfigurationError, MappingError, ValueError},
        phase_map::{phase_map, FftMode},
    };


    // every pixel follows `offset + amplitude * cos(2 pi cycles t / n - phase)`
    fn cosine_movie(frames: usize, cycles: usize, phases: &Array2<f64>, amplitude: f64, offset: f64) -> Array3<f64> {
        let (height, width) = phases.dim();

        Array3::from_shape_fn((frames, height, width), |(t, i, j)| {
            let angle = 2. * PI * (cycles * t) as f64 / frames as f64 - phases[[i, j]];
            offset + amplitude * angle.cos()
        })
    }

    fn test_phases() -> Array2<f64> {
        Array2::from_shape_vec((2, 3), vec![0.3, 1., 2., 3., 4.5, 6.]).unwrap()
    }

    #[test]
    pub fn test_recovers_phase_and_power() -> Result<(), MappingError> {
        let phases = test_phases();
        let movie = cosine_movie(32, 1, &phases, 3., 100.);

        let (phase, power) = phase_map(&movie, 1, false)?;

        for (found, expected) in phase.iter().zip(phases.iter()) {
            assert!((found - expected).abs() < 1e-9, "phase {} expected {}", found, expected);
        }
        for value in power.iter() {
            assert!((value - 3.).abs() < 1e-9);
        }

        Ok(())
    }

    #[test]
    pub fn test_multiple_cycles() -> Result<(), MappingError> {
        let phases = test_phases();
        let movie = cosine_movie(40, 3, &phases, 1., 0.);

        let (phase, power) = phase_map(&movie, 3, false)?;

        for (found, expected) in phase.iter().zip(phases.iter()) {
            assert!((found - expected).abs() < 1e-9);
        }
        assert!(power.iter().all(|x| (x - 1.).abs() < 1e-9));

        // nothing happens at the first harmonic
        let (_, first_harmonic_power) = phase_map(&movie, 1, false)?;
        assert!(first_harmonic_power.iter().all(|x| x.abs() < 1e-9));

        Ok(())
    }

    #[test]
    pub fn test_reversed_polarity() -> Result<(), MappingError> {
        let phases = test_phases();
        let movie = cosine_movie(16, 1, &phases, 1., 0.);

        let (peak, _) = phase_map(&movie, 1, FftMode::Peak.reverse_polarity())?;
        let (valley, _) = phase_map(&movie, 1, FftMode::Valley.reverse_polarity())?;

        for (p, v) in peak.iter().zip(valley.iter()) {
            assert!((p + v).abs() < 1e-12);
        }

        Ok(())
    }

    #[test]
    pub fn test_phase_range_and_power_sign() -> Result<(), MappingError> {
        let movie = Array3::from_shape_fn((25, 4, 4), |(t, i, j)| {
            ((t * 7 + i * 3 + j * 11) % 13) as f64 - 6.
        });

        let (phase, power) = phase_map(&movie, 2, false)?;

        assert!(phase.iter().all(|x| *x >= 0. && *x < 2. * PI));
        assert!(power.iter().all(|x| *x >= 0.));

        Ok(())
    }

    #[test]
    pub fn test_constant_movie_has_no_power() -> Result<(), MappingError> {
        let movie = Array3::from_elem((10, 2, 2), 7.);

        let (_, power) = phase_map(&movie, 1, false)?;

        assert!(power.iter().all(|x| x.abs() < 1e-12));

        Ok(())
    }

    #[test]
    pub fn test_invalid_cycles() {
        let movie = Array3::from_elem((10, 2, 2), 1.);

        assert!(matches!(
            phase_map(&movie, 0, false),
            Err(MappingError::ValueRelatedError(ValueError::InvalidCycles { .. }))
        ));
        assert!(matches!(
            phase_map(&movie, 10, false),
            Err(MappingError::ValueRelatedError(ValueError::InvalidCycles { .. }))
        ));
    }

    #[test]
    pub fn test_empty_movie() {
        let movie: Array3<f64> = Array3::zeros((0, 2, 2));

        assert!(matches!(
            phase_map(&movie, 1, false),
            Err(MappingError::ValueRelatedError(ValueError::EmptyMovie))
        ));
    }

    #[test]
    pub fn test_fft_mode_names() {
        assert_eq!(FftMode::from_str("peak").ok(), Some(FftMode::Peak));
        assert_eq!(FftMode::from_str("valley").ok(), Some(FftMode::Valley));
        assert!(matches!(FftMode::from_str("trough"), Err(ConfigurationError::InvalidParameter(_))));
    }
}
