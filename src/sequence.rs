//! Drives a whole zoom: checks the configuration, clears out stale
//! output, renders every frame through the scheduler, and hands the
//! frames, in order, to whatever stores them.

use config::ZoomConfig;
use errors::RenderError;
use frames::{Frame, FrameParams};
use grid::EscapeGrid;
use scheduler::{CancelToken, Scheduler};
use std::time::Instant;

/// A finished frame: its parameters and its escape indices.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFrame {
    /// The parameters the frame was rendered with.
    pub params: FrameParams,
    /// The escape indices.
    pub grid: EscapeGrid,
}

/// Receives the rendered sequence.  Storage, rasterising, and
/// animation all live behind this trait.
pub trait FrameSink {
    /// Make the destination ready for a fresh run, discarding anything
    /// left over from a previous one.
    fn prepare(&mut self) -> Result<(), RenderError>;

    /// Take the complete sequence, ordered by ascending frame index.
    fn consume(&mut self, frames: Vec<RenderedFrame>) -> Result<(), RenderError>;
}

/// Keeps the rendered frames in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// The frames from the last run, in order.
    pub frames: Vec<RenderedFrame>,
}

impl FrameSink for MemorySink {
    fn prepare(&mut self) -> Result<(), RenderError> {
        self.frames.clear();
        Ok(())
    }

    fn consume(&mut self, frames: Vec<RenderedFrame>) -> Result<(), RenderError> {
        self.frames = frames;
        Ok(())
    }
}

/// Render frames `1..=config.frame_count` and pass them to `sink`.
/// Nothing is scheduled, and the sink is not touched, unless the
/// configuration validates.
pub fn render_sequence(
    config: &ZoomConfig,
    sink: &mut dyn FrameSink,
    cancel: &CancelToken,
) -> Result<(), RenderError> {
    config.validate()?;
    let scheduler = Scheduler::new(config.threads, config.policy, cancel.clone())?;

    sink.prepare()?;

    let start = Instant::now();
    info!(
        "rendering {} frame(s) of {}x{} on {} worker(s)",
        config.frame_count, config.n_pixels, config.n_pixels, config.threads
    );

    let indices: Vec<usize> = (1..=config.frame_count).collect();
    let rendered = scheduler.run(&indices, &config.snapshot(), |index| {
        let frame = Frame::new(config, index);
        let grid = frame.render(config)?;
        info!(
            "frame {} rendered (resolution {:e}, {} iterations)",
            index, frame.params.resolution, frame.params.max_iterations
        );
        Ok(RenderedFrame {
            params: frame.params,
            grid,
        })
    })?;

    let frames: Vec<RenderedFrame> = rendered.into_iter().map(|(_, frame)| frame).collect();
    sink.consume(frames)?;

    let elapsed = start.elapsed();
    info!(
        "runtime: {}.{:03}s",
        elapsed.as_secs(),
        elapsed.subsec_millis()
    );
    Ok(())
}
