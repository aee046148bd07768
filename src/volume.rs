use crate::enums::{Interpolation, Plane};
use crate::interpolator::Interpolator;

use image::{GrayImage, ImageBuffer};
use ndarray::{Array3, ArrayView2, Axis};
use rayon::prelude::*;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("{plane} index {index} is outside the valid range {valid:?}")]
    OutOfRange {
        plane: Plane,
        index: usize,
        valid: Range<usize>,
    },

    #[error("Pixel buffer does not fit a {width}x{height} image")]
    ImageBuffer { width: u32, height: u32 },

    #[error("A {width}x{height} image exceeds {max} pixels", max = MAX_IMAGE_PIXELS)]
    ImageTooLarge { width: u32, height: u32 },
}

/// Upper bound on the pixel count of a resampled plane image.
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

/// Physical voxel size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Distance between adjacent rows.
    pub row: f32,
    /// Distance between adjacent columns.
    pub col: f32,
    pub thickness: f32,
}

/// Display aspect ratios for each plane, derived from [`Spacing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatios {
    pub axial: f32,
    pub sagittal: f32,
    pub coronal: f32,
}

impl From<Spacing> for AspectRatios {
    fn from(spacing: Spacing) -> Self {
        Self {
            axial: spacing.col / spacing.row,
            sagittal: spacing.col / spacing.thickness,
            coronal: spacing.thickness / spacing.row,
        }
    }
}

/// Intensity interval that is mapped onto the 8-bit grayscale range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub min: f32,
    pub max: f32,
}

impl Window {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn to_u8(&self, value: f32) -> u8 {
        let width = self.max - self.min;
        if width <= 0.0 {
            return if value >= self.max { u8::MAX } else { 0 };
        }
        (((value - self.min) / width).clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// A series of slices stacked into a `(rows, cols, depth)` intensity array.
///
/// Only built by [`VolumeLoader`](crate::volume_loader::VolumeLoader) and
/// never modified afterwards.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    spacing: Spacing,
    aspect: AspectRatios,
    min_intensity: f32,
    max_intensity: f32,
    skipped_count: usize,
}

impl Volume {
    /// `data` must have a non-zero extent along every axis.
    pub(crate) fn new(data: Array3<f32>, spacing: Spacing, skipped_count: usize) -> Self {
        let (min_intensity, max_intensity) = data.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY),
            |(min, max), &v| (min.min(v), max.max(v)),
        );
        Self {
            data,
            spacing,
            aspect: AspectRatios::from(spacing),
            min_intensity,
            max_intensity,
            skipped_count,
        }
    }

    /// Get the dimensions of the volume (rows, cols, depth)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn aspect_ratios(&self) -> AspectRatios {
        self.aspect
    }

    pub fn aspect(&self, plane: Plane) -> f32 {
        match plane {
            Plane::Axial => self.aspect.axial,
            Plane::Sagittal => self.aspect.sagittal,
            Plane::Coronal => self.aspect.coronal,
        }
    }

    pub fn min_intensity(&self) -> f32 {
        self.min_intensity
    }

    pub fn max_intensity(&self) -> f32 {
        self.max_intensity
    }

    /// Number of slices stacked along the depth axis.
    pub fn slice_count(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Number of files left out for lacking a slice location.
    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    /// Number of valid indices for `plane`.
    pub fn extent(&self, plane: Plane) -> usize {
        let (rows, cols, depth) = self.dim();
        match plane {
            Plane::Axial => depth,
            Plane::Sagittal => cols,
            Plane::Coronal => rows,
        }
    }

    /// The window spanning every intensity in the volume.
    pub fn full_window(&self) -> Window {
        Window::new(self.min_intensity, self.max_intensity)
    }

    /// Extract the 2D slice at `index` along `plane`.
    ///
    /// Axial slices come back as `(rows, cols)`. Sagittal and coronal slices
    /// are transposed so that depth runs down the image: `(depth, rows)` and
    /// `(depth, cols)` respectively.
    pub fn plane(&self, plane: Plane, index: usize) -> Result<ArrayView2<'_, f32>, VolumeError> {
        let extent = self.extent(plane);
        if index >= extent {
            return Err(VolumeError::OutOfRange {
                plane,
                index,
                valid: 0..extent,
            });
        }

        let view = match plane {
            Plane::Axial => self.data.index_axis(Axis(2), index),
            Plane::Sagittal => self.data.index_axis(Axis(1), index).reversed_axes(),
            Plane::Coronal => self.data.index_axis(Axis(0), index).reversed_axes(),
        };
        Ok(view)
    }

    /// In-plane pixel size `(height, width)` of a slice returned by [`Volume::plane`].
    fn plane_pixel_size(&self, plane: Plane) -> (f32, f32) {
        let Spacing {
            row,
            col,
            thickness,
        } = self.spacing;
        match plane {
            Plane::Axial => (row, col),
            Plane::Sagittal => (thickness, row),
            Plane::Coronal => (thickness, col),
        }
    }

    /// Render a plane as an 8-bit grayscale image through `window`.
    pub fn plane_image(
        &self,
        plane: Plane,
        index: usize,
        window: Window,
        interpolation: Interpolation,
    ) -> Result<GrayImage, VolumeError> {
        let slice = self.plane(plane, index)?;

        match interpolation {
            Interpolation::None => Self::slice_to_image(&slice, window),
            Interpolation::Bilinear => {
                let pixel_size = self.plane_pixel_size(plane);
                let (width, height) =
                    Interpolator::get_isotropic_dimensions(pixel_size, slice.dim());
                if u64::from(width) * u64::from(height) > MAX_IMAGE_PIXELS {
                    return Err(VolumeError::ImageTooLarge { width, height });
                }
                Self::interpolate_slice(&slice, window, width, height)
            }
        }
    }

    fn slice_to_image(
        slice: &ArrayView2<'_, f32>,
        window: Window,
    ) -> Result<GrayImage, VolumeError> {
        let (height, width) = slice.dim();
        let (width, height) = (width as u32, height as u32);
        let pixel_data: Vec<u8> = slice.iter().map(|&v| window.to_u8(v)).collect();
        ImageBuffer::from_raw(width, height, pixel_data)
            .ok_or(VolumeError::ImageBuffer { width, height })
    }

    fn interpolate_slice(
        slice: &ArrayView2<'_, f32>,
        window: Window,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, VolumeError> {
        let (slice_height, slice_width) = slice.dim();

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map_iter(|y| {
                (0..width).map(move |x| {
                    let (src_x, src_y) = Interpolator::source_coordinates(
                        (x, y),
                        (width, height),
                        (slice_width, slice_height),
                    );
                    window.to_u8(Interpolator::bilinear_interpolate(slice, src_y, src_x))
                })
            })
            .collect();

        ImageBuffer::from_raw(width, height, pixel_data)
            .ok_or(VolumeError::ImageBuffer { width, height })
    }
}
