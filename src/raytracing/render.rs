use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use image::{ImageBuffer, Rgb};
use rayon::prelude::*;
use thiserror::Error;

use super::camera::Camera;
use super::core::{RenderSettings, Scene, Tracer};
use super::math::Vec3;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Expected {expected} pixels for a {width}x{height} image, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;

impl From<Vec3> for Rgb<u8> {
    fn from(value: Vec3) -> Self {
        Rgb([
            quantize(value.x),
            quantize(value.y),
            quantize(value.z),
        ])
    }
}

/// Maps a color channel to a byte, values outside [0, 1] are clamped.
#[inline(always)]
pub fn quantize(channel: f64) -> u8 {
    if channel.is_nan() {
        return 0;
    }
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Rendered image kept as unclamped colors in row-major order.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl Frame {
    /// RGB byte triples, top row first and left to right.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&color| Rgb::<u8>::from(color).0)
            .collect()
    }

    pub fn save(&self, path: &Path) -> RenderResult<()> {
        let is_ppm = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("ppm"))
            .unwrap_or(false);
        if is_ppm {
            let file = std::fs::File::create(path)?;
            let mut writer = io::BufWriter::new(file);
            write_ppm(&mut writer, self.width, self.height, &self.to_rgb_bytes())?;
            writer.flush()?;
        } else {
            let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                ImageBuffer::from_raw(self.width, self.height, self.to_rgb_bytes()).ok_or_else(
                    || RenderError::SizeMismatch {
                        width: self.width,
                        height: self.height,
                        expected: (self.width as usize) * (self.height as usize),
                        actual: self.pixels.len(),
                    },
                )?;
            buffer.save(path)?;
        }
        Ok(())
    }
}

/// Binary PPM: `P6\n<W> <H>\n255\n` followed by the raw RGB triples.
pub fn write_ppm<W: Write>(
    writer: &mut W,
    width: u32,
    height: u32,
    rgb: &[u8],
) -> RenderResult<()> {
    let expected = (width as usize) * (height as usize);
    if rgb.len() != expected * 3 {
        return Err(RenderError::SizeMismatch {
            width,
            height,
            expected,
            actual: rgb.len() / 3,
        });
    }
    write!(writer, "P6\n{} {}\n255\n", width, height)?;
    writer.write_all(rgb)?;
    Ok(())
}

pub struct Renderer<'a> {
    tracer: Tracer<'a>,
    camera: Camera,
}

impl<'a> Renderer<'a> {
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings, camera: Camera) -> Self {
        Renderer {
            tracer: Tracer::new(scene, settings),
            camera,
        }
    }

    fn render_row(&self, y: u32, row: &mut [Vec3]) {
        for (x, pixel) in row.iter_mut().enumerate() {
            let ray = self.camera.shoot_to(x as u32, y);
            *pixel = self.tracer.trace_primary(&ray);
        }
    }

    /// Traces one primary ray per pixel. Rows are independent, with `parallel`
    /// they are distributed over the rayon pool; the result is the same.
    pub fn render(&self, parallel: bool) -> Frame {
        let settings = self.tracer.settings;
        let width = settings.width as usize;
        let mut pixels = vec![Vec3::zero(); width * settings.height as usize];

        let start = Instant::now();
        if width > 0 {
            if parallel {
                pixels
                    .par_chunks_mut(width)
                    .enumerate()
                    .for_each(|(y, row)| self.render_row(y as u32, row));
            } else {
                for (y, row) in pixels.chunks_mut(width).enumerate() {
                    self.render_row(y as u32, row);
                }
            }
        }
        log::info!(
            "Rendered {}x{} in {:?}",
            settings.width,
            settings.height,
            start.elapsed()
        );

        Frame {
            width: settings.width,
            height: settings.height,
            pixels,
        }
    }
}
