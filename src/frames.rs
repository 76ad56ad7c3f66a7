//! Zoom dynamics.  Each frame of the sequence is a pure function of the
//! base parameters and its 1-based index: the resolution shrinks
//! geometrically and the iteration budget grows linearly to keep up
//! with the finer detail.

use config::ZoomConfig;
use errors::RenderError;
use grid::{sample_plane, EscapeGrid};
use num::Complex;
use planes::FramePlane;

/// The parameters of a single frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameParams {
    /// 1-based position in the sequence.
    pub index: usize,
    /// Distance between neighbouring samples.
    pub resolution: f64,
    /// Iteration budget for every pixel of the frame.
    pub max_iterations: usize,
}

/// Compute the parameters of frame `frame_index`.
///
/// `resolution = base_resolution × size_per_frame^(frame_index − 1)`
/// and `max_iterations = base_max_iter + iter_step × frame_index`, so
/// frame 1 keeps the base resolution but already carries one step of
/// extra iterations.  A `size_per_frame` of 1 or more zooms out.
pub fn scale(
    base_resolution: f64,
    base_max_iter: usize,
    size_per_frame: f64,
    iter_step: usize,
    frame_index: usize,
) -> FrameParams {
    let exponent = frame_index.saturating_sub(1);
    FrameParams {
        index: frame_index,
        resolution: base_resolution * size_per_frame.powf(exponent as f64),
        max_iterations: base_max_iter.saturating_add(iter_step.saturating_mul(frame_index)),
    }
}

/// A frame of the zoom sequence.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// The scaled parameters.
    pub params: FrameParams,
}

impl Frame {
    /// The frame at `index` of the sequence described by `config`.
    pub fn new(config: &ZoomConfig, index: usize) -> Frame {
        Frame {
            params: scale(
                config.initial_resolution,
                config.base_max_iterations,
                config.size_per_frame,
                config.iter_step,
                index,
            ),
        }
    }

    /// The pixel/point mapping for this frame.
    pub fn plane(&self, config: &ZoomConfig) -> Result<FramePlane, RenderError> {
        FramePlane::new(
            Complex::new(config.x_center, config.y_center),
            self.params.resolution,
            config.n_pixels,
        )
    }

    /// Scale and sample this frame.
    pub fn render(&self, config: &ZoomConfig) -> Result<EscapeGrid, RenderError> {
        let plane = self.plane(config)?;
        Ok(sample_plane(
            &plane,
            self.params.max_iterations,
            config.bailout,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_the_base_plus_one_step() {
        let p = scale(0.01, 100, 0.5, 25, 1);
        assert_eq!(p.resolution, 0.01);
        assert_eq!(p.max_iterations, 125);
        assert_eq!(p.index, 1);
    }

    #[test]
    fn halving_zoom_is_geometric() {
        let ratios: Vec<f64> = (1..5).map(|i| scale(1.0, 0, 0.5, 0, i).resolution).collect();
        assert_eq!(ratios, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn iterations_grow_linearly() {
        let budgets: Vec<usize> = (1..5)
            .map(|i| scale(1.0, 2500, 0.25, 125, i).max_iterations)
            .collect();
        assert_eq!(budgets, vec![2625, 2750, 2875, 3000]);
    }

    #[test]
    fn resolution_strictly_decreases_when_zooming_in() {
        let mut last = std::f64::INFINITY;
        for i in 1..20 {
            let r = scale(1e-3, 10, 0.8, 0, i).resolution;
            assert!(r < last);
            last = r;
        }
    }

    #[test]
    fn zooming_out_is_allowed() {
        assert_eq!(scale(1.0, 0, 2.0, 0, 3).resolution, 4.0);
    }

    #[test]
    fn frame_renders_at_configured_size() {
        let config = ZoomConfig {
            n_pixels: 6,
            initial_resolution: 0.01,
            base_max_iterations: 5,
            iter_step: 1,
            ..ZoomConfig::default()
        };
        let frame = Frame::new(&config, 2);
        assert_eq!(frame.params.max_iterations, 7);
        let grid = frame.render(&config).unwrap();
        assert_eq!(grid.size(), 6);
        assert!(grid.max_value() <= 7);
    }
}
