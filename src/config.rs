//! The parameters of a zoom run, with the historical defaults and the
//! checks that have to pass before any frame is scheduled.

use escape::Bailout;
use errors::RenderError;
use frames::{scale, Frame};
use scheduler::Policy;

/// Everything needed to render a zoom sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomConfig {
    /// Real coordinate of the zoom target.
    pub x_center: f64,
    /// Imaginary coordinate of the zoom target.
    pub y_center: f64,
    /// Distance between samples in frame 1.
    pub initial_resolution: f64,
    /// Pixels per side of every frame.
    pub n_pixels: usize,
    /// Iteration budget before per-frame growth.
    pub base_max_iterations: usize,
    /// Number of frames, rendered as indices 1..=frame_count.
    pub frame_count: usize,
    /// Per-frame resolution multiplier; below 1 zooms in.
    pub size_per_frame: f64,
    /// Extra iterations granted per frame index.
    pub iter_step: usize,
    /// Maximum number of frames in flight at once.
    pub threads: usize,
    /// How frames are handed to workers.
    pub policy: Policy,
    /// The escape rule.
    pub bailout: Bailout,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        ZoomConfig {
            x_center: -0.749_511_453_84,
            y_center: 0.049_619_793_35,
            initial_resolution: 0.000_000_1,
            n_pixels: 256,
            base_max_iterations: 2500,
            frame_count: 12,
            size_per_frame: 0.25,
            iter_step: 125,
            threads: num_cpus::get(),
            policy: Policy::default(),
            bailout: Bailout::default(),
        }
    }
}

impl ZoomConfig {
    /// Reject anything that would make a frame impossible to render.
    /// Every frame's parameters follow from the first and the last, so
    /// checking both ends covers the whole sequence.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.x_center.is_finite() && self.y_center.is_finite()) {
            return Err(RenderError::invalid(format!(
                "center ({}, {}) is not finite",
                self.x_center, self.y_center
            )));
        }
        if !(self.initial_resolution.is_finite() && self.initial_resolution > 0.0) {
            return Err(RenderError::invalid(format!(
                "initial resolution must be positive, got {}",
                self.initial_resolution
            )));
        }
        if !(self.size_per_frame.is_finite() && self.size_per_frame > 0.0) {
            return Err(RenderError::invalid(format!(
                "size per frame must be positive, got {}",
                self.size_per_frame
            )));
        }
        if self.n_pixels == 0 {
            return Err(RenderError::invalid("n_pixels must be positive"));
        }
        if self.frame_count == 0 {
            return Err(RenderError::invalid("frame count must be positive"));
        }
        if self.threads == 0 {
            return Err(RenderError::invalid("thread count must be positive"));
        }

        let overflow = self
            .iter_step
            .checked_mul(self.frame_count)
            .and_then(|growth| growth.checked_add(self.base_max_iterations));
        if overflow.is_none() {
            return Err(RenderError::invalid(format!(
                "iteration budget overflows by frame {}",
                self.frame_count
            )));
        }

        let last = scale(
            self.initial_resolution,
            self.base_max_iterations,
            self.size_per_frame,
            self.iter_step,
            self.frame_count,
        );
        if !(last.resolution.is_finite() && last.resolution > 0.0) {
            return Err(RenderError::invalid(format!(
                "resolution degenerates to {} by frame {}",
                last.resolution, self.frame_count
            )));
        }

        // The widest frame is the first when zooming in and the last
        // when zooming out; its samples must all be representable.
        for &index in &[1, self.frame_count] {
            Frame::new(self, index).plane(self)?;
        }
        Ok(())
    }

    /// A one-line summary of the run, for error reports.
    pub fn snapshot(&self) -> String {
        format!(
            "center=({}, {}) resolution={} n_pixels={} max_iterations={} frames={} \
             size_per_frame={} iter_step={} threads={} policy={:?} bailout={:?}",
            self.x_center,
            self.y_center,
            self.initial_resolution,
            self.n_pixels,
            self.base_max_iterations,
            self.frame_count,
            self.size_per_frame,
            self.iter_step,
            self.threads,
            self.policy,
            self.bailout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ZoomConfig {
        ZoomConfig {
            x_center: -0.5,
            y_center: 0.0,
            initial_resolution: 0.01,
            n_pixels: 4,
            base_max_iterations: 10,
            frame_count: 3,
            size_per_frame: 0.5,
            iter_step: 0,
            threads: 2,
            ..ZoomConfig::default()
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ZoomConfig::default().validate().is_ok());
        assert!(small().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let bad = vec![
            ZoomConfig { n_pixels: 0, ..small() },
            ZoomConfig { initial_resolution: 0.0, ..small() },
            ZoomConfig { initial_resolution: -1.0, ..small() },
            ZoomConfig { size_per_frame: 0.0, ..small() },
            ZoomConfig { frame_count: 0, ..small() },
            ZoomConfig { threads: 0, ..small() },
            ZoomConfig { x_center: std::f64::NAN, ..small() },
        ];
        for config in bad {
            match config.validate() {
                Err(RenderError::InvalidParameter { .. }) => {}
                other => panic!("{:?} accepted: {:?}", config, other),
            }
        }
    }

    #[test]
    fn rejects_resolution_underflow() {
        let config = ZoomConfig {
            initial_resolution: 1e-300,
            size_per_frame: 1e-10,
            frame_count: 5,
            ..small()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_frames_wider_than_the_float_range() {
        let config = ZoomConfig {
            initial_resolution: 1e308,
            ..small()
        };
        match config.validate() {
            Err(RenderError::InvalidParameter { .. }) => {}
            other => panic!("accepted: {:?}", other),
        }
        let zooming_out = ZoomConfig {
            initial_resolution: 1e300,
            size_per_frame: 1e4,
            frame_count: 3,
            ..small()
        };
        assert!(zooming_out.validate().is_err());
    }

    #[test]
    fn rejects_iteration_overflow() {
        let config = ZoomConfig {
            iter_step: std::usize::MAX / 2,
            ..small()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn snapshot_names_the_parameters() {
        let s = small().snapshot();
        assert!(s.contains("n_pixels=4"));
        assert!(s.contains("frames=3"));
    }
}
