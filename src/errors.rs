//! The failure modes of a zoom run.  Only bad parameters, failed
//! frames, cancellation, and output trouble are reported; an
//! arithmetic overflow inside the evaluator is treated as the point
//! escaping and never shows up here.

/// Everything that can stop a zoom sequence from being produced.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum RenderError {
    /// A parameter was rejected before any work was scheduled.
    #[fail(display = "invalid parameter: {}", reason)]
    InvalidParameter {
        /// What was wrong with it.
        reason: String,
    },

    /// One or more frame jobs failed.  The batch they belonged to was
    /// allowed to drain, and no later batch was started.
    #[fail(display = "frame(s) {:?} failed ({}): {}", frames, params, reason)]
    WorkerFailure {
        /// The indices of the failing frames, ascending.
        frames: Vec<usize>,
        /// A snapshot of the run parameters, enough to reproduce it.
        params: String,
        /// The first failure message observed.
        reason: String,
    },

    /// The run was cancelled before every frame was rendered.
    #[fail(display = "render cancelled after {} frame(s)", completed)]
    Cancelled {
        /// How many frames had finished when the run stopped.
        completed: usize,
    },

    /// The output collaborator could not store the sequence.
    #[fail(display = "output failure: {}", reason)]
    Output {
        /// The underlying error, flattened to text.
        reason: String,
    },
}

impl RenderError {
    /// Shorthand for the most common complaint.
    pub fn invalid<S: Into<String>>(reason: S) -> Self {
        RenderError::InvalidParameter {
            reason: reason.into(),
        }
    }
}

impl From<failure::Error> for RenderError {
    fn from(err: failure::Error) -> Self {
        RenderError::Output {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_failure_names_the_frames() {
        let err = RenderError::WorkerFailure {
            frames: vec![3, 4],
            params: "n_pixels=4".to_string(),
            reason: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[3, 4]"));
        assert!(msg.contains("n_pixels=4"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn failure_errors_become_output_errors() {
        let err: RenderError = failure::err_msg("disk full").into();
        assert_eq!(
            err,
            RenderError::Output {
                reason: "disk full".to_string()
            }
        );
    }
}
