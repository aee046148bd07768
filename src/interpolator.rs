use ndarray::ArrayView2;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Output size `(width, height)` for a plane of `dim = (height, width)`
    /// voxels whose pixels measure `pixel_size = (height_mm, width_mm)`,
    /// such that every output pixel has the smaller of the two sizes.
    pub(crate) fn get_isotropic_dimensions(
        pixel_size: (f32, f32),
        dim: (usize, usize),
    ) -> (u32, u32) {
        let (height_spacing, width_spacing) = pixel_size;
        let min_spacing = height_spacing.min(width_spacing);
        let inv_min_spacing = 1.0 / min_spacing;

        let width = (dim.1 as f32 * width_spacing * inv_min_spacing).round() as u32;
        let height = (dim.0 as f32 * height_spacing * inv_min_spacing).round() as u32;

        (width.max(1), height.max(1))
    }

    #[inline]
    pub(crate) fn bilinear_interpolate(slice: &ArrayView2<f32>, y: f32, x: f32) -> f32 {
        let (height, width) = slice.dim();

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f32;
        let dx = x - x0 as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = slice[[y0, x0]];
        let v01 = slice[[y0, x1]];
        let v10 = slice[[y1, x0]];
        let v11 = slice[[y1, x1]];

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);

        v0.mul_add(one_minus_dy, v1 * dy)
    }

    /// Map output pixel `(x, y)` of a `width x height` image back onto a
    /// `src_width x src_height` plane, sampling pixel centres.
    #[inline]
    pub(crate) fn source_coordinates(
        (x, y): (u32, u32),
        (width, height): (u32, u32),
        (src_width, src_height): (usize, usize),
    ) -> (f32, f32) {
        let norm_x = (x as f32 + 0.5) / width as f32;
        let norm_y = (y as f32 + 0.5) / height as f32;

        let src_x = (norm_x * src_width as f32 - 0.5).clamp(0.0, (src_width - 1) as f32);
        let src_y = (norm_y * src_height as f32 - 0.5).clamp(0.0, (src_height - 1) as f32);

        (src_x, src_y)
    }
}
