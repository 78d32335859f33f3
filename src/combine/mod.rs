//! Conversion of phase maps into visual field position maps and merging of
//! opposite sweep directions into altitude and azimuth maps.

use std::collections::BTreeMap;
use ndarray::Array2;
use crate::display_log::{DisplayInfo, SweepDirection};
use crate::error::{ArithmeticError, MappingError, ValueError};
use crate::fitting::LinearEquation;


/// Phase map and power map of a single sweep direction
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionMaps {
    pub phase: Array2<f64>,
    pub power: Array2<f64>,
}

/// Final retinotopic maps of a session
#[derive(Debug, Clone, PartialEq)]
pub struct RetinotopicMaps {
    /// Elevation in degrees, mean of bottom to up and up to bottom sweeps
    pub altitude_position: Array2<f64>,
    /// Azimuth in degrees, mean of left to right and right to left sweeps
    pub azimuth_position: Array2<f64>,
    /// Altitude response strength, unit maximum
    pub altitude_power: Array2<f64>,
    /// Azimuth response strength, unit maximum
    pub azimuth_power: Array2<f64>,
}

/// Collects the phase position equation of every direction
pub fn calibrations_from(display_info: &DisplayInfo) -> BTreeMap<SweepDirection, LinearEquation> {
    display_info.iter()
        .map(|(direction, info)| (*direction, info.phase_to_position))
        .collect()
}

/// Divides a power map by its maximum, fails if the map has no positive finite maximum
pub fn normalize_power(power: &Array2<f64>, name: &str) -> Result<Array2<f64>, MappingError> {
    let max = power.iter().fold(f64::NEG_INFINITY, |acc, x| acc.max(*x));

    if !(max > 0.) || !max.is_finite() || power.iter().any(|x| x.is_nan()) {
        return Err(ArithmeticError::AllZeroPowerMap(String::from(name)).into());
    }

    Ok(power / max)
}

fn check_shape(expected: &Array2<f64>, found: &Array2<f64>) -> Result<(), ValueError> {
    if expected.shape() != found.shape() {
        return Err(
            ValueError::ShapeMismatch { expected: expected.shape().to_vec(), found: found.shape().to_vec() }
        );
    }

    Ok(())
}

fn mean_of_pair(first: &Array2<f64>, second: &Array2<f64>) -> Result<Array2<f64>, ValueError> {
    check_shape(first, second)?;

    Ok((first + second) / 2.)
}

/// Calibrated position map and unit maximum power map of one direction
fn direction_position_and_power(
    direction: SweepDirection,
    maps: &BTreeMap<SweepDirection, DirectionMaps>,
    calibrations: &BTreeMap<SweepDirection, LinearEquation>,
) -> Result<(Array2<f64>, Array2<f64>), MappingError> {
    let direction_maps = maps.get(&direction).ok_or(ValueError::MissingDirection(direction))?;
    let equation = calibrations.get(&direction).ok_or(ValueError::MissingDirection(direction))?;

    check_shape(&direction_maps.phase, &direction_maps.power)?;

    let position = equation.apply(&direction_maps.phase);
    let power = normalize_power(&direction_maps.power, &format!("power map {}", direction))?;

    Ok((position, power))
}

/// Converts the phase map of each direction into a position map with the phase position
/// equation of that direction, normalizes each power map to unit maximum, averages opposite
/// directions into altitude and azimuth maps, and normalizes the combined power maps
pub fn combine_direction_maps(
    maps: &BTreeMap<SweepDirection, DirectionMaps>,
    calibrations: &BTreeMap<SweepDirection, LinearEquation>,
) -> Result<RetinotopicMaps, MappingError> {
    let (b2u_position, b2u_power) = direction_position_and_power(SweepDirection::BottomToUp, maps, calibrations)?;
    let (u2b_position, u2b_power) = direction_position_and_power(SweepDirection::UpToBottom, maps, calibrations)?;
    let (l2r_position, l2r_power) = direction_position_and_power(SweepDirection::LeftToRight, maps, calibrations)?;
    let (r2l_position, r2l_power) = direction_position_and_power(SweepDirection::RightToLeft, maps, calibrations)?;

    check_shape(&b2u_position, &l2r_position)?;

    let altitude_position = mean_of_pair(&b2u_position, &u2b_position)?;
    let azimuth_position = mean_of_pair(&l2r_position, &r2l_position)?;

    let altitude_power = normalize_power(&mean_of_pair(&b2u_power, &u2b_power)?, "altitude power map")?;
    let azimuth_power = normalize_power(&mean_of_pair(&l2r_power, &r2l_power)?, "azimuth power map")?;

    Ok(
        RetinotopicMaps {
            altitude_position,
            azimuth_position,
            altitude_power,
            azimuth_power,
        }
    )
}
