//! # Cortical Mapping
//!
//! `cortical_mapping` turns a widefield imaging session of drifting bar stimuli into
//! retinotopic maps of visual cortex. Sweep onsets are detected in the photodiode trace
//! recorded alongside the imaging, the visual display log is analyzed to find which sweeps
//! belong to each of the four sweep directions, the movie is averaged around the onsets of
//! each direction, and the fourier phase of every pixel is converted into a visual field
//! position. Opposite directions are combined into an altitude and an azimuth map, each with
//! a power map describing the strength of the response.
//!
//! ## Example Code
//!
//! ### Mapping a session stored on disk
//!
//! ```rust,no_run
//! use cortical_mapping::{
//!     config::MappingConfig,
//!     display_log::DisplayLog,
//!     error::MappingError,
//!     movie::{MappedMovie, RawDtype, RawMovieLayout},
//!     output::{save_averaged_movies, save_maps},
//!     pipeline::analyze_session,
//! };
//!
//!
//! fn main() -> Result<(), MappingError> {
//!     let config = MappingConfig::from_toml_file("mapping.toml")?;
//!     let display_log = DisplayLog::from_json_file("display_log.json")?;
//!
//!     // photodiode trace and imaging frame times stored as npy arrays
//!     let photodiode: Vec<f64> = ndarray_npy::read_npy::<_, ndarray::Array1<f64>>("photodiode.npy")?
//!         .to_vec();
//!     let frame_timestamps: Vec<f64> = ndarray_npy::read_npy::<_, ndarray::Array1<f64>>("frame_timestamps.npy")?
//!         .to_vec();
//!
//!     let layout = RawMovieLayout {
//!         dtype: RawDtype::U16,
//!         header_length: 116,
//!         tailer_length: 452,
//!         height: 512,
//!         width: 512,
//!     };
//!     let movie = MappedMovie::open("session.dcimg", layout)?;
//!
//!     let result = analyze_session(&movie, &frame_timestamps, &photodiode, &display_log, &config)?;
//!
//!     save_maps(&result.maps, "results", "session")?;
//!     save_averaged_movies(&result.averaged_movies, "results", "session")?;
//!
//!     Ok(())
//! }
//! ```

pub mod averaging;
pub mod combine;
pub mod config;
pub mod display_log;
pub mod error;
pub mod fitting;
pub mod movie;
pub mod output;
pub mod phase_map;
pub mod pipeline;
pub mod timing;
