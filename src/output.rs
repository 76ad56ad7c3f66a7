//! Writes a rendered sequence to disk.  Under the root directory:
//!
//! * `arrays/N_array.csv` holds each frame's escape indices as a
//!   whitespace-delimited table, one image row per line.
//! * `intermediates/NNNN.png` holds each frame as a grayscale raster,
//!   escape indices scaled linearly into 0..=255.
//! * `final/` holds the animated GIF of the whole sequence.

use errors::RenderError;
use failure::{Error, ResultExt};
use grid::EscapeGrid;
use image::{DynamicImage, GrayImage, ImageBuffer};
use itertools::Itertools;
use sequence::{FrameSink, RenderedFrame};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const ARRAYS: &str = "arrays";
const INTERMEDIATES: &str = "intermediates";
const FINAL: &str = "final";

/// Stores the sequence under a root directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    root: PathBuf,
    gif_name: String,
}

/// Scale a grid's escape indices into an 8-bit grayscale raster.  The
/// brightest pixel is the grid's largest index.
pub fn raster(grid: &EscapeGrid) -> Result<GrayImage, Error> {
    let size = grid.size() as u32;
    let max = grid.max_value();
    let levels: Vec<u8> = grid
        .cells()
        .iter()
        .map(|&v| if max == 0 { 0 } else { (v * 255 / max) as u8 })
        .collect();
    ImageBuffer::from_raw(size, size, levels)
        .ok_or_else(|| format_err!("raster buffer does not fit {}x{}", size, size))
}

/// Write a grid as a whitespace-delimited table.
pub fn write_table<W: Write>(grid: &EscapeGrid, out: &mut W) -> Result<(), Error> {
    for row in grid.rows() {
        writeln!(out, "{}", row.iter().join(" "))?;
    }
    Ok(())
}

fn clear_directory(dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir).with_context(|_| format!("creating {}", dir.display()))?;
    for entry in fs::read_dir(dir).with_context(|_| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(&path).with_context(|_| format!("removing {}", path.display()))?;
        }
    }
    Ok(())
}

impl DirectorySink {
    /// A sink rooted at `root`, naming the animation `gif_name`.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, gif_name: S) -> Self {
        DirectorySink {
            root: root.into(),
            gif_name: gif_name.into(),
        }
    }

    /// Where the numeric tables go.
    pub fn arrays_dir(&self) -> PathBuf {
        self.root.join(ARRAYS)
    }

    /// Where the per-frame rasters go.
    pub fn intermediates_dir(&self) -> PathBuf {
        self.root.join(INTERMEDIATES)
    }

    /// The animation's full path.
    pub fn gif_path(&self) -> PathBuf {
        self.root.join(FINAL).join(&self.gif_name)
    }

    fn clear(&self) -> Result<(), Error> {
        for dir in &[ARRAYS, INTERMEDIATES, FINAL] {
            clear_directory(&self.root.join(dir))?;
        }
        Ok(())
    }

    fn write_array(&self, frame: &RenderedFrame) -> Result<(), Error> {
        let path = self
            .arrays_dir()
            .join(format!("{}_array.csv", frame.params.index));
        let file = File::create(&path).with_context(|_| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write_table(&frame.grid, &mut out)?;
        out.flush()?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    fn write_raster(&self, index: usize, image: &GrayImage) -> Result<(), Error> {
        let path = self.intermediates_dir().join(format!("{:04}.png", index));
        image
            .save(&path)
            .with_context(|_| format!("saving {}", path.display()))?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    fn write_gif(&self, rasters: Vec<GrayImage>) -> Result<(), Error> {
        let path = self.gif_path();
        let file = File::create(&path).with_context(|_| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);
        {
            // The trailer is written when the encoder drops.
            let mut encoder = image::gif::Encoder::new(&mut out);
            encoder
                .encode_frames(
                    rasters
                        .into_iter()
                        .map(|gray| image::Frame::new(DynamicImage::ImageLuma8(gray).to_rgba())),
                )
                .with_context(|_| format!("encoding {}", path.display()))?;
        }
        out.flush()
            .with_context(|_| format!("writing {}", path.display()))?;
        info!("wrote {}", path.display());
        Ok(())
    }

    fn store(&self, frames: &[RenderedFrame]) -> Result<(), Error> {
        let mut rasters = Vec::with_capacity(frames.len());
        for frame in frames {
            self.write_array(frame)?;
            let image = raster(&frame.grid)?;
            self.write_raster(frame.params.index, &image)?;
            rasters.push(image);
        }
        info!("encoding gif of {} frame(s)", rasters.len());
        self.write_gif(rasters)
    }
}

impl FrameSink for DirectorySink {
    fn prepare(&mut self) -> Result<(), RenderError> {
        Ok(self.clear()?)
    }

    fn consume(&mut self, frames: Vec<RenderedFrame>) -> Result<(), RenderError> {
        Ok(self.store(&frames)?)
    }
}
