//! # DICOM-MPR library
//!
//! This crate loads a series of single-slice DICOM files into a 3D intensity
//! volume and reslices it along the three anatomical planes:
//!  - Axial
//!  - Sagittal
//!  - Coronal
//!
//! Slices are matched with a glob pattern, read with the dicom-rs
//! ecosystem, and stacked by ascending InstanceNumber. Files without a
//! SliceLocation (scouts, localizers) are left out. Every slice is rescaled
//! with its own RescaleSlope and RescaleIntercept, so the volume holds
//! physical intensities. The per-slice rescaling runs in parallel using
//! rayon.
//!
//! DICOM files are assumed to have the following attributes:
//!   - Axial acquisition
//!   - No multiframe (always the first frame is used)
//!   - Uncompressed pixel data
//!   - Images from a single series sharing one pixel grid
//!
//! A [`Volume`](volume::Volume) is immutable once loaded. A new series is
//! loaded into a new volume.
//!
//! # Examples
//!
//! ## Reading a series into a volume
//!
//! Load every file in the `dicom/` directory, then take the sagittal plane
//! at the centre of the volume and save it through the full intensity
//! window.
//!
//! ```no_run
//! # use dicom_mpr::{enums::{Interpolation, Plane}, volume_loader::VolumeLoader};
//! let volume = VolumeLoader::load("dicom/*").expect("should have loaded the series");
//! let center = volume.extent(Plane::Sagittal) / 2;
//! let image = volume
//!     .plane_image(
//!         Plane::Sagittal,
//!         center,
//!         volume.full_window(),
//!         Interpolation::Bilinear,
//!     )
//!     .expect("should have returned the centre plane");
//! image.save("sagittal.png").expect("should have written the image");
//! ```

pub mod enums;
mod interpolator;
pub mod slice;
pub mod volume;
pub mod volume_loader;
