use dicom::{
    object::{DefaultDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, ArrayViewMut2, s};
use std::path::{Path, PathBuf};

/// Affine calibration from stored pixel values to physical intensities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f32,
    pub intercept: f32,
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl Rescale {
    #[inline]
    pub fn apply(&self, raw: f32) -> f32 {
        self.slope * raw + self.intercept
    }
}

/// One decoded slice file, kept only while a volume is being assembled.
#[derive(Debug, Clone)]
pub struct RawSlice {
    pub path: PathBuf,
    /// Stored pixel values, shape `(rows, cols)`, before rescaling.
    pub pixels: Array2<f32>,
    pub instance_number: Option<i32>,
    pub slice_location: Option<f32>,
    /// `(row, col)` spacing in millimetres.
    pub pixel_spacing: Option<(f32, f32)>,
    pub slice_thickness: Option<f32>,
    pub rescale: Rescale,
}

/// A parsed DICOM file whose pixel data has not been decoded yet.
pub struct SliceFile {
    pub path: PathBuf,
    dicom_object: DefaultDicomObject,
}

impl SliceFile {
    /// Parse a single file. `None` means the file is not DICOM at all.
    pub fn open(path: &Path) -> Option<Self> {
        let dicom_object = open_file(path).ok()?;
        Some(Self {
            path: path.to_path_buf(),
            dicom_object,
        })
    }

    pub fn slice_location(&self) -> Option<f32> {
        slice_location(&self.dicom_object)
    }

    /// Decode the pixel data. `None` means the object holds no decodable
    /// single-frame image.
    pub fn decode(&self) -> Option<RawSlice> {
        RawSlice::from_dicom_object(&self.path, &self.dicom_object)
    }
}

fn slice_location(dicom_object: &DefaultDicomObject) -> Option<f32> {
    dicom_object
        .element(tags::SLICE_LOCATION)
        .ok()
        .and_then(|e| e.to_float32().ok())
}

impl RawSlice {
    pub fn from_dicom_object(path: &Path, dicom_object: &DefaultDicomObject) -> Option<Self> {
        let pixels = Self::decode_image(dicom_object)?;

        let instance_number = dicom_object
            .element(tags::INSTANCE_NUMBER)
            .ok()
            .and_then(|e| e.to_int::<i32>().ok());

        let slice_location = slice_location(dicom_object);

        let pixel_spacing = dicom_object
            .element(tags::PIXEL_SPACING)
            .ok()
            .and_then(|e| e.to_multi_float32().ok())
            .and_then(|spacing| match spacing.as_slice() {
                [row, col, ..] => Some((*row, *col)),
                _ => None,
            });

        let slice_thickness = dicom_object
            .element(tags::SLICE_THICKNESS)
            .ok()
            .and_then(|e| e.to_float32().ok());

        let defaults = Rescale::default();
        let rescale = Rescale {
            slope: dicom_object
                .element(tags::RESCALE_SLOPE)
                .ok()
                .and_then(|e| e.to_float32().ok())
                .unwrap_or(defaults.slope),
            intercept: dicom_object
                .element(tags::RESCALE_INTERCEPT)
                .ok()
                .and_then(|e| e.to_float32().ok())
                .unwrap_or(defaults.intercept),
        };

        Some(Self {
            path: path.to_path_buf(),
            pixels,
            instance_number,
            slice_location,
            pixel_spacing,
            slice_thickness,
            rescale,
        })
    }

    // Raw stored values: modality and VOI LUTs are left to the caller.
    fn decode_image(dicom_object: &DefaultDicomObject) -> Option<Array2<f32>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::None)
            .with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }

    /// Grid shape as `(rows, cols)`.
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    /// Write the rescaled pixels into `layer`, which must have the same shape.
    pub fn rescale_into(&self, mut layer: ArrayViewMut2<'_, f32>) {
        let rescale = self.rescale;
        layer.zip_mut_with(&self.pixels, |dst, &raw| *dst = rescale.apply(raw));
    }
}
