use std::fmt;

/// The three orthogonal planes a volume can be resliced along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Fixes the depth index.
    Axial,
    /// Fixes the column index.
    Sagittal,
    /// Fixes the row index.
    Coronal,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Axial, Plane::Sagittal, Plane::Coronal];
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Axial => write!(f, "axial"),
            Plane::Sagittal => write!(f, "sagittal"),
            Plane::Coronal => write!(f, "coronal"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Resample so that every output pixel is square in physical units.
    Bilinear,
    #[default]
    None,
}

/// How strictly the loader checks that all slices share one geometry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GeometryCheck {
    /// Only the pixel grid shape has to match. Differing spacing is logged.
    #[default]
    Shape,
    /// Pixel grid shape, pixel spacing and slice thickness have to match.
    Strict,
}
