//! Contains the FramePlane struct, which describes the relationship
//! between a square integral plane of pixels with an origin at the
//! top-left, and the square region of the complex plane a single
//! frame looks at.  The complex region is defined by its center and
//! the distance between neighbouring samples (the "resolution").
use escape::ComplexSample;
use errors::RenderError;
use num::Complex;

/// Describes the column and row of a pixel.  Row 0 is the top of the
/// image, which is the largest imaginary value in the frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub ComplexSample, pub ComplexSample);

/// Maps the pixels of one square frame to sample points and back.
#[derive(Copy, Clone, Debug)]
pub struct FramePlane {
    /// Pixels along either side.
    pub n_pixels: usize,
    /// Distance between neighbouring samples.
    pub resolution: f64,
    /// The two corners of the sampled region, left-lower and
    /// right-upper.  The right-upper corner is the exclusive end of the
    /// sample range: no sample lands on it.
    pub complex_plane: ComplexPlane,
}

impl FramePlane {
    /// Constructor.  Takes the center of the frame, the distance
    /// between samples, and the number of pixels per side.
    pub fn new(
        center: ComplexSample,
        resolution: f64,
        n_pixels: usize,
    ) -> Result<FramePlane, RenderError> {
        if !(center.re.is_finite() && center.im.is_finite()) {
            return Err(RenderError::invalid(format!(
                "frame center {} is not finite",
                center
            )));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(RenderError::invalid(format!(
                "resolution must be positive and finite, got {}",
                resolution
            )));
        }
        if n_pixels == 0 {
            return Err(RenderError::invalid("n_pixels must be positive"));
        }

        let half = (n_pixels as f64 / 2.0) * resolution;
        let plane = FramePlane {
            n_pixels,
            resolution,
            complex_plane: ComplexPlane(
                Complex::new(center.re - half, center.im - half),
                Complex::new(center.re + half, center.im + half),
            ),
        };

        // Every sample lies between the first and the last, so finite
        // corners and a finite last sample keep the whole grid finite.
        let ComplexPlane(low, high) = plane.complex_plane;
        let last = plane.column_to_re(n_pixels - 1) + plane.row_to_im(0);
        if ![low.re, low.im, high.re, high.im, last]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(RenderError::invalid(format!(
                "{} samples {} apart around {} leave the representable range",
                n_pixels, resolution, center
            )));
        }
        Ok(plane)
    }

    /// The total number of pixels in the frame.
    pub fn len(&self) -> usize {
        self.n_pixels * self.n_pixels
    }

    /// Whether the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.n_pixels == 0
    }

    /// The i-th sample along an axis starting at `min`.  The count is
    /// fixed by the caller, so accumulated floating-point drift can
    /// never add or drop a sample.
    #[inline]
    fn coordinate(min: f64, i: usize, resolution: f64) -> f64 {
        min + (i as f64) * resolution
    }

    /// The real value sampled by a column.
    pub fn column_to_re(&self, column: usize) -> f64 {
        Self::coordinate(self.complex_plane.0.re, column, self.resolution)
    }

    /// The imaginary value sampled by a row.  Rows count down from the
    /// top, so the last row holds the first (smallest) sample.
    pub fn row_to_im(&self, row: usize) -> f64 {
        Self::coordinate(
            self.complex_plane.0.im,
            self.n_pixels - 1 - row,
            self.resolution,
        )
    }

    /// Given a pixel, return the complex number sampled there.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> ComplexSample {
        Complex::new(self.column_to_re(pixel.0), self.row_to_im(pixel.1))
    }

    /// Given a complex number inside the sampled region, map it to the
    /// pixel whose sample is nearest below and to the left of it.
    /// Points outside the region map to nothing.
    pub fn point_to_pixel(&self, point: &ComplexSample) -> Option<Pixel> {
        let left = ((point.re - self.complex_plane.0.re) / self.resolution).floor();
        let up = ((point.im - self.complex_plane.0.im) / self.resolution).floor();
        let n = self.n_pixels as f64;
        if left < 0.0 || left >= n || up < 0.0 || up >= n {
            return None;
        }
        Some(Pixel(left as usize, self.n_pixels - 1 - (up as usize)))
    }
}
