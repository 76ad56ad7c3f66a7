#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot zoom renderer
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which repeatedly squaring z and adding c, starting from zero, never
//! runs off to infinity.  For the points that do run off, the number
//! of steps it takes before they are judged to have escaped is the
//! number we render.
//!
//! A zoom is a sequence of frames centered on the same point, each
//! one sampling a smaller square of the plane than the last and
//! granting more iterations to make up for the finer detail.  Frames
//! are independent of one another, so they are rendered in parallel
//! on a bounded pool of threads and reassembled in order at the end.
//!
//! Only the real part of z is checked against the bailout by default.
//! That catches fewer escapes than the usual |z| > 2 test and gives
//! the renders their particular look; the modulus test is available
//! as `Bailout::Modulus`.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

#[cfg(test)]
extern crate rand;
#[cfg(test)]
extern crate tempfile;

pub mod config;
pub mod errors;
pub mod escape;
pub mod frames;
pub mod grid;
pub mod output;
pub mod planes;
pub mod scheduler;
pub mod sequence;

pub use config::ZoomConfig;
pub use errors::RenderError;
pub use escape::{escape_time, Bailout, ComplexSample};
pub use frames::{scale, Frame, FrameParams};
pub use grid::{sample_grid, EscapeGrid};
pub use output::DirectorySink;
pub use scheduler::{CancelToken, Policy, Scheduler};
pub use sequence::{render_sequence, FrameSink, MemorySink, RenderedFrame};
