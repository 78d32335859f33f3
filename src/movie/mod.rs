//! Frame level access to imaging movies, either held in memory or memory mapped
//! from raw files that are too large to load at once.

use std::{fs::File, ops::Range, path::Path};
use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use ndarray::{Array3, ArrayBase, ArrayD, Data, Ix3};
use crate::error::{ConfigurationError, MappingError, ValueError};


/// A movie with `(frames, height, width)` shape that can be read a range of frames at a time
pub trait MovieSource {
    /// Shape of the movie as `(frames, height, width)`
    fn shape(&self) -> (usize, usize, usize);
    /// Reads the given frames as floating point values
    fn read_frames(&self, frames: Range<usize>) -> Result<Array3<f64>, MappingError>;
    /// Number of frames in the movie
    fn frame_count(&self) -> usize {
        self.shape().0
    }
}

fn check_frame_range(frames: &Range<usize>, frame_count: usize) -> Result<(), ValueError> {
    if frames.start > frames.end || frames.end > frame_count {
        return Err(
            ValueError::FrameRangeOutOfBounds { start: frames.start, end: frames.end, frames: frame_count }
        );
    }

    Ok(())
}

impl<A, S> MovieSource for ArrayBase<S, Ix3>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
{
    fn shape(&self) -> (usize, usize, usize) {
        self.dim()
    }

    fn read_frames(&self, frames: Range<usize>) -> Result<Array3<f64>, MappingError> {
        check_frame_range(&frames, self.dim().0)?;

        Ok(self.slice(ndarray::s![frames, .., ..]).mapv(|x| x.into()))
    }
}

/// Converts a movie of unknown dimensionality into a `(frames, height, width)` movie
pub fn into_movie_array(movie: ArrayD<f64>) -> Result<Array3<f64>, MappingError> {
    let ndim = movie.ndim();

    movie.into_dimensionality::<Ix3>()
        .map_err(|_| ValueError::NotThreeDimensional(ndim).into())
}

/// Reads a movie stored as a `.npy` array of 64 bit floats
pub fn read_npy_movie<P: AsRef<Path>>(path: P) -> Result<Array3<f64>, MappingError> {
    let movie: ArrayD<f64> = ndarray_npy::read_npy(path)?;

    into_movie_array(movie)
}

/// Element type of a raw movie file, always little endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDtype {
    U16,
    F32,
    F64,
}

impl RawDtype {
    /// Size of one element in bytes
    pub fn byte_size(&self) -> usize {
        match self {
            RawDtype::U16 => 2,
            RawDtype::F32 => 4,
            RawDtype::F64 => 8,
        }
    }

    fn decode(&self, bytes: &[u8]) -> Vec<f64> {
        match self {
            RawDtype::U16 => {
                let mut values = vec![0u16; bytes.len() / 2];
                LittleEndian::read_u16_into(bytes, &mut values);
                values.into_iter().map(f64::from).collect()
            },
            RawDtype::F32 => {
                let mut values = vec![0f32; bytes.len() / 4];
                LittleEndian::read_f32_into(bytes, &mut values);
                values.into_iter().map(f64::from).collect()
            },
            RawDtype::F64 => {
                let mut values = vec![0f64; bytes.len() / 8];
                LittleEndian::read_f64_into(bytes, &mut values);
                values
            },
        }
    }
}

/// Layout of a raw movie file, a header, frames stored row major one after another, and a tailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMovieLayout {
    pub dtype: RawDtype,
    /// Bytes before the first frame
    pub header_length: usize,
    /// Bytes after the last frame
    pub tailer_length: usize,
    pub height: usize,
    pub width: usize,
}

impl RawMovieLayout {
    /// Size of one frame in bytes
    pub fn frame_bytes(&self) -> usize {
        self.height * self.width * self.dtype.byte_size()
    }
}

/// Read only, memory mapped raw movie, frames are only decoded when read
pub struct MappedMovie {
    mmap: Mmap,
    layout: RawMovieLayout,
    frames: usize,
}

impl MappedMovie {
    /// Maps the given file, fails if the payload between header and tailer
    /// is not a whole number of frames
    pub fn open<P: AsRef<Path>>(path: P, layout: RawMovieLayout) -> Result<MappedMovie, MappingError> {
        let frame_bytes = layout.frame_bytes();
        if frame_bytes == 0 {
            return Err(ValueError::EmptyMovie.into());
        }

        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let payload_bytes = mmap.len()
            .checked_sub(layout.header_length + layout.tailer_length)
            .ok_or(ConfigurationError::IncompleteRawMovie { payload_bytes: 0, frame_bytes })?;

        if payload_bytes % frame_bytes != 0 {
            return Err(ConfigurationError::IncompleteRawMovie { payload_bytes, frame_bytes }.into());
        }

        Ok(MappedMovie { mmap, layout, frames: payload_bytes / frame_bytes })
    }
}

impl MovieSource for MappedMovie {
    fn shape(&self) -> (usize, usize, usize) {
        (self.frames, self.layout.height, self.layout.width)
    }

    fn read_frames(&self, frames: Range<usize>) -> Result<Array3<f64>, MappingError> {
        check_frame_range(&frames, self.frames)?;

        let frame_bytes = self.layout.frame_bytes();
        let start = self.layout.header_length + frames.start * frame_bytes;
        let end = self.layout.header_length + frames.end * frame_bytes;

        let values = self.layout.dtype.decode(&self.mmap[start..end]);

        Array3::from_shape_vec((frames.len(), self.layout.height, self.layout.width), values)
            .map_err(|_| {
                ValueError::ShapeMismatch {
                    expected: vec![frames.len(), self.layout.height, self.layout.width],
                    found: vec![(end - start) / self.layout.dtype.byte_size()],
                }.into()
            })
    }
}
