//! Fixtures that write small synthetic CT series to disk

use std::fs;
use std::path::Path;

use dicom::core::{DataElement, PrimitiveValue, VR, dicom_value};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom_dictionary_std::{tags, uids};

/// One slice file to be written with [`TestSlice::write`].
#[derive(Debug, Clone)]
pub struct TestSlice {
    pub instance_number: i32,
    pub slice_location: Option<f32>,
    pub rows: u16,
    pub cols: u16,
    pub pixels: Vec<u16>,
    pub pixel_spacing: (f32, f32),
    pub slice_thickness: f32,
    pub rescale: Option<(f32, f32)>,
}

impl TestSlice {
    /// A 2x3 slice with every pixel set to `value`.
    pub fn filled(instance_number: i32, value: u16) -> Self {
        Self {
            instance_number,
            slice_location: Some(instance_number as f32 * 2.5),
            rows: 2,
            cols: 3,
            pixels: vec![value; 6],
            pixel_spacing: (0.5, 0.8),
            slice_thickness: 2.5,
            rescale: None,
        }
    }

    pub fn with_pixels(mut self, rows: u16, cols: u16, pixels: Vec<u16>) -> Self {
        assert_eq!(pixels.len(), rows as usize * cols as usize);
        self.rows = rows;
        self.cols = cols;
        self.pixels = pixels;
        self
    }

    pub fn with_rescale(mut self, slope: f32, intercept: f32) -> Self {
        self.rescale = Some((slope, intercept));
        self
    }

    pub fn with_thickness(mut self, slice_thickness: f32) -> Self {
        self.slice_thickness = slice_thickness;
        self
    }

    /// A localizer image: same pixels, no slice location.
    pub fn scout(mut self) -> Self {
        self.slice_location = None;
        self
    }

    pub fn write(&self, path: &Path) {
        let ds = |value: f32| PrimitiveValue::from(value.to_string());
        let us = |value: u16| dicom_value!(U16, [value]);

        let mut obj = InMemDicomObject::from_element_iter([
            DataElement::new(
                tags::SOP_CLASS_UID,
                VR::UI,
                PrimitiveValue::from(uids::CT_IMAGE_STORAGE),
            ),
            DataElement::new(
                tags::SOP_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(self.sop_instance_uid()),
            ),
            DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("CT")),
            DataElement::new(
                tags::INSTANCE_NUMBER,
                VR::IS,
                PrimitiveValue::from(self.instance_number.to_string()),
            ),
            DataElement::new(
                tags::PIXEL_SPACING,
                VR::DS,
                PrimitiveValue::Strs(
                    [self.pixel_spacing.0.to_string(), self.pixel_spacing.1.to_string()]
                        .into_iter()
                        .collect(),
                ),
            ),
            DataElement::new(tags::SLICE_THICKNESS, VR::DS, ds(self.slice_thickness)),
            DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, us(1)),
            DataElement::new(
                tags::PHOTOMETRIC_INTERPRETATION,
                VR::CS,
                PrimitiveValue::from("MONOCHROME2"),
            ),
            DataElement::new(tags::ROWS, VR::US, us(self.rows)),
            DataElement::new(tags::COLUMNS, VR::US, us(self.cols)),
            DataElement::new(tags::BITS_ALLOCATED, VR::US, us(16)),
            DataElement::new(tags::BITS_STORED, VR::US, us(16)),
            DataElement::new(tags::HIGH_BIT, VR::US, us(15)),
            DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, us(0)),
            DataElement::new(
                tags::PIXEL_DATA,
                VR::OW,
                PrimitiveValue::U16(self.pixels.iter().copied().collect()),
            ),
        ]);

        if let Some(location) = self.slice_location {
            obj.put(DataElement::new(tags::SLICE_LOCATION, VR::DS, ds(location)));
        }
        if let Some((slope, intercept)) = self.rescale {
            obj.put(DataElement::new(tags::RESCALE_SLOPE, VR::DS, ds(slope)));
            obj.put(DataElement::new(tags::RESCALE_INTERCEPT, VR::DS, ds(intercept)));
        }

        write_object(obj, uids::CT_IMAGE_STORAGE, &self.sop_instance_uid(), path);
    }

    fn sop_instance_uid(&self) -> String {
        format!("2.25.{}", 1000 + self.instance_number)
    }
}

/// Write a Basic Text SR object: valid DICOM, but without any pixel data.
pub fn write_text_report(path: &Path, slice_location: Option<f32>) {
    let sop_instance_uid = "2.25.9999";
    let mut obj = InMemDicomObject::from_element_iter([
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::BASIC_TEXT_SR_STORAGE),
        ),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(sop_instance_uid),
        ),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("SR")),
        DataElement::new(tags::INSTANCE_NUMBER, VR::IS, PrimitiveValue::from("1")),
    ]);
    if let Some(location) = slice_location {
        obj.put(DataElement::new(
            tags::SLICE_LOCATION,
            VR::DS,
            PrimitiveValue::from(location.to_string()),
        ));
    }

    write_object(obj, uids::BASIC_TEXT_SR_STORAGE, sop_instance_uid, path);
}

fn write_object(obj: InMemDicomObject, sop_class_uid: &str, sop_instance_uid: &str, path: &Path) {
    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .media_storage_sop_class_uid(sop_class_uid)
                .media_storage_sop_instance_uid(sop_instance_uid)
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN),
        )
        .expect("should have built the file meta group");
    file.write_to_file(path).expect("should have written the file");
}

/// Write bytes that do not form a DICOM file.
pub fn write_corrupt(path: &Path) {
    fs::write(path, b"definitely not a DICOM file").expect("should have written the file");
}

/// Write each `(file name, slice)` pair into `dir`.
pub fn write_series(dir: &Path, slices: &[(&str, TestSlice)]) {
    for (name, slice) in slices {
        slice.write(&dir.join(name));
    }
}

pub fn pattern(dir: &Path) -> String {
    format!("{}/*", dir.display())
}
