//! The escape-time evaluator.  This is where nearly all of the time
//! goes: it runs once per pixel per frame, and each run may take up
//! to `max_iterations` steps.

use num::Complex;

/// A single sample point on the complex plane.  The real part is the
/// x-coordinate, the imaginary part the y-coordinate.
pub type ComplexSample = Complex<f64>;

/// z² for z = a + bi, written out as (a² − b², 2ab).
#[inline]
pub fn square(z: ComplexSample) -> ComplexSample {
    Complex {
        re: z.re * z.re - z.im * z.im,
        im: 2.0 * z.re * z.im,
    }
}

/// The test used to decide that a sample has diverged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bailout {
    /// Escape as soon as the real part of z exceeds 2.  Only the real
    /// part is checked, so this under-detects escape compared to the
    /// modulus test and gives the renders their particular look.
    /// This is the default.
    RealPart,
    /// The textbook rule: escape when |z| > 2.
    Modulus,
}

impl Default for Bailout {
    fn default() -> Self {
        Bailout::RealPart
    }
}

impl Bailout {
    #[inline]
    fn escaped(self, z: ComplexSample) -> bool {
        match self {
            Bailout::RealPart => z.re > 2.0,
            Bailout::Modulus => z.norm_sqr() > 4.0,
        }
    }

    /// Iterate z ← z² + c from z = 0, at most `max_iterations` times.
    /// Returns the index of the step at which the bailout fired, or
    /// `max_iterations` if it never did.  A step that overflows to a
    /// non-finite value counts as an escape at that step.
    pub fn evaluate(self, c: ComplexSample, max_iterations: usize) -> usize {
        let mut z = Complex { re: 0.0, im: 0.0 };
        for i in 0..max_iterations {
            z = square(z) + c;
            if !(z.re.is_finite() && z.im.is_finite()) || self.escaped(z) {
                return i;
            }
        }
        max_iterations
    }
}

/// The canonical evaluator: `Bailout::RealPart`.
#[inline]
pub fn escape_time(c: ComplexSample, max_iterations: usize) -> usize {
    Bailout::RealPart.evaluate(c, max_iterations)
}
