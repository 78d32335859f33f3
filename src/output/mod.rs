//! Saving of mapping results as `.npy` arrays.

use std::{
    collections::BTreeMap,
    fs::create_dir_all,
    path::{Path, PathBuf},
};
use log::info;
use ndarray::Array1;
use ndarray_npy::write_npy;
use crate::averaging::AveragedMovie;
use crate::combine::RetinotopicMaps;
use crate::display_log::SweepDirection;
use crate::error::MappingError;


fn output_path(folder: &Path, prefix: &str, name: &str) -> PathBuf {
    if prefix.is_empty() {
        folder.join(format!("{}.npy", name))
    } else {
        folder.join(format!("{}_{}.npy", prefix, name))
    }
}

/// Writes the altitude and azimuth position and power maps into `folder`, file names are
/// preceded by `prefix` and an underscore unless the prefix is empty, returns the written paths
pub fn save_maps<P: AsRef<Path>>(
    maps: &RetinotopicMaps,
    folder: P,
    prefix: &str,
) -> Result<Vec<PathBuf>, MappingError> {
    let folder = folder.as_ref();
    create_dir_all(folder)?;

    let named_maps = [
        ("altitude_position", &maps.altitude_position),
        ("azimuth_position", &maps.azimuth_position),
        ("altitude_power", &maps.altitude_power),
        ("azimuth_power", &maps.azimuth_power),
    ];

    let mut paths = Vec::with_capacity(named_maps.len());
    for (name, map) in named_maps {
        let path = output_path(folder, prefix, name);
        write_npy(&path, map)?;
        info!("Saved {}", path.display());

        paths.push(path);
    }

    Ok(paths)
}

/// Writes the averaged movie of every direction as `aveMov_<direction>.npy` along with its
/// frame timestamps, and the dF/F movie as `aveMovNor_<direction>.npy` when the average has
/// a baseline, returns the written paths
pub fn save_averaged_movies<P: AsRef<Path>>(
    averaged_movies: &BTreeMap<SweepDirection, AveragedMovie>,
    folder: P,
    prefix: &str,
) -> Result<Vec<PathBuf>, MappingError> {
    let folder = folder.as_ref();
    create_dir_all(folder)?;

    let mut paths = Vec::new();

    for (direction, averaged) in averaged_movies {
        let path = output_path(folder, prefix, &format!("aveMov_{}", direction));
        write_npy(&path, &averaged.movie)?;
        paths.push(path);

        let path = output_path(folder, prefix, &format!("aveMovTimestamps_{}", direction));
        write_npy(&path, &Array1::from_vec(averaged.timestamps.clone()))?;
        paths.push(path);

        if averaged.baseline.is_some() {
            let path = output_path(folder, prefix, &format!("aveMovNor_{}", direction));
            write_npy(&path, &averaged.df_over_f()?)?;
            paths.push(path);
        }

        info!("Saved averaged movies of direction {}", direction);
    }

    Ok(paths)
}
