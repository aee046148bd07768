use crate::{
    enums::GeometryCheck,
    slice::{RawSlice, SliceFile},
    volume::{Spacing, Volume},
};

use ndarray::{Array3, Axis, parallel::prelude::*};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("Not a valid DICOM image: {}", filename.display())]
    InvalidInput { filename: PathBuf },

    #[error("No valid DICOM images found")]
    NoValidInput,

    #[error("Missing or invalid {attribute} in {}", filename.display())]
    InvalidAttribute {
        filename: PathBuf,
        attribute: &'static str,
    },

    #[error("Geometry of {} differs from the first slice", filename.display())]
    InconsistentGeometry { filename: PathBuf },

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from every file matching a glob pattern, such as
    /// `"series/*"`.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be decoded, or if no file carries
    /// a slice location.
    pub fn load(pattern: &str) -> Result<Volume, VolumeLoaderError> {
        Self::load_with(pattern, GeometryCheck::default())
    }

    /// Like [`VolumeLoader::load`], with an explicit geometry check.
    #[instrument(skip(check), err)]
    pub fn load_with(pattern: &str, check: GeometryCheck) -> Result<Volume, VolumeLoaderError> {
        let mut paths = Vec::new();
        for entry in glob::glob(pattern)? {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if path.is_file() {
                paths.push(path);
            }
        }
        debug!(files = paths.len(), "matched slice files");

        Self::load_from_file_paths(&paths, check)
    }

    /// Load a volume from the files directly inside `path`.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        check: GeometryCheck,
    ) -> Result<Volume, VolumeLoaderError> {
        let escaped = glob::Pattern::escape(&path.as_ref().to_string_lossy());
        Self::load_with(&format!("{escaped}/*"), check)
    }

    /// Load a volume from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        check: GeometryCheck,
    ) -> Result<Volume, VolumeLoaderError> {
        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidInput);
        }

        let files = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                SliceFile::open(path).ok_or_else(|| VolumeLoaderError::InvalidInput {
                    filename: path.to_path_buf(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Pixel data is only decoded for files that can join the volume.
        let parsed = files.len();
        let files: Vec<_> = files
            .into_iter()
            .filter(|file| file.slice_location().is_some())
            .collect();
        let skipped_count = parsed - files.len();

        let slices = files
            .iter()
            .map(|file| {
                file.decode().ok_or_else(|| VolumeLoaderError::InvalidInput {
                    filename: file.path.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::assemble(slices, skipped_count, check)
    }

    /// Assemble a volume from already decoded slices.
    pub fn load_from_slices(
        slices: Vec<RawSlice>,
        check: GeometryCheck,
    ) -> Result<Volume, VolumeLoaderError> {
        let decoded = slices.len();
        let slices: Vec<_> = slices
            .into_iter()
            .filter(|slice| slice.slice_location.is_some())
            .collect();
        let skipped_count = decoded - slices.len();

        Self::assemble(slices, skipped_count, check)
    }

    fn assemble(
        mut slices: Vec<RawSlice>,
        skipped_count: usize,
        check: GeometryCheck,
    ) -> Result<Volume, VolumeLoaderError> {
        if skipped_count > 0 {
            debug!(skipped_count, "skipped slices without slice location");
        }

        if slices.is_empty() {
            return Err(VolumeLoaderError::NoValidInput);
        }

        Self::sort_slices(&mut slices)?;

        let first = &slices[0];
        let spacing = Self::get_spacing(first)?;
        Self::validate_geometry(&slices, spacing, check)?;

        let data = Self::build_volume_array(&slices);
        let volume = Volume::new(data, spacing, skipped_count);

        if !volume.min_intensity().is_finite() || !volume.max_intensity().is_finite() {
            return Err(Self::non_finite_rescale(&slices));
        }

        let (rows, cols, depth) = volume.dim();
        info!(
            rows,
            cols,
            depth,
            min = volume.min_intensity(),
            max = volume.max_intensity(),
            "assembled volume"
        );
        Ok(volume)
    }

    // Stable, so equal instance numbers keep their enumeration order.
    fn sort_slices(slices: &mut [RawSlice]) -> Result<(), VolumeLoaderError> {
        if let Some(slice) = slices.iter().find(|slice| slice.instance_number.is_none()) {
            return Err(VolumeLoaderError::InvalidAttribute {
                filename: slice.path.clone(),
                attribute: "InstanceNumber",
            });
        }
        slices.sort_by_key(|slice| slice.instance_number);
        Ok(())
    }

    fn get_spacing(slice: &RawSlice) -> Result<Spacing, VolumeLoaderError> {
        let invalid = |attribute| VolumeLoaderError::InvalidAttribute {
            filename: slice.path.clone(),
            attribute,
        };
        let is_valid = |value: &f32| value.is_finite() && *value > 0.0;

        let (row, col) = slice
            .pixel_spacing
            .filter(|(row, col)| is_valid(row) && is_valid(col))
            .ok_or_else(|| invalid("PixelSpacing"))?;
        let thickness = slice
            .slice_thickness
            .filter(is_valid)
            .ok_or_else(|| invalid("SliceThickness"))?;

        Ok(Spacing {
            row,
            col,
            thickness,
        })
    }

    fn validate_geometry(
        slices: &[RawSlice],
        spacing: Spacing,
        check: GeometryCheck,
    ) -> Result<(), VolumeLoaderError> {
        let first_dim = slices[0].dim();
        if let Some(slice) = slices.iter().find(|slice| slice.dim() != first_dim) {
            return Err(VolumeLoaderError::InconsistentGeometry {
                filename: slice.path.clone(),
            });
        }

        let first = &slices[0];
        let mismatched = slices.iter().find(|slice| {
            slice.pixel_spacing != first.pixel_spacing
                || slice.slice_thickness != first.slice_thickness
        });
        if let Some(slice) = mismatched {
            match check {
                GeometryCheck::Strict => {
                    return Err(VolumeLoaderError::InconsistentGeometry {
                        filename: slice.path.clone(),
                    });
                }
                GeometryCheck::Shape => warn!(
                    file = %slice.path.display(),
                    ?spacing,
                    "slice spacing differs from the first slice, using the first"
                ),
            }
        }
        Ok(())
    }

    fn build_volume_array(slices: &[RawSlice]) -> Array3<f32> {
        let (rows, cols) = slices[0].dim();
        let depth = slices.len();
        let mut volume = Array3::<f32>::zeros((rows, cols, depth));

        volume
            .axis_iter_mut(Axis(2))
            .into_par_iter()
            .zip(slices.par_iter())
            .for_each(|(layer, slice)| slice.rescale_into(layer));

        volume
    }

    fn non_finite_rescale(slices: &[RawSlice]) -> VolumeLoaderError {
        let offending = slices.iter().find(|slice| {
            !(slice.rescale.slope.is_finite() && slice.rescale.intercept.is_finite())
        });
        match offending {
            Some(slice) => VolumeLoaderError::InvalidAttribute {
                filename: slice.path.clone(),
                attribute: if slice.rescale.slope.is_finite() {
                    "RescaleIntercept"
                } else {
                    "RescaleSlope"
                },
            },
            // finite parameters on finite pixels overflowed
            None => VolumeLoaderError::InvalidAttribute {
                filename: slices[0].path.clone(),
                attribute: "RescaleSlope",
            },
        }
    }
}
