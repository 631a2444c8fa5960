//! Raster output. A [`Figure`] describes what to draw in data coordinates;
//! a [`Renderer`] turns it into an image file.

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::layout::{AreaSeries, BarCollection};
use image::{ImageError, ImageFormat, RgbaImage};
use log::debug;
use std::path::Path;

/// Size in pixels of one lane-label glyph.
const CHAR_SIZE: u32 = 16;

/// Upper bound on the pixels of one rasterised image, label gutter included.
pub const MAX_PIXELS: u64 = 100_000_000;

/// Everything needed to draw one image. Axis limits are in data units.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub xlim: (f64, f64),
    pub ylim: (f64, f64),
    pub bars: Vec<BarCollection>,
    pub areas: Vec<AreaSeries>,
    /// Lane labels at a y position; drawn in a gutter left of the plot.
    pub yticks: Vec<(f64, String)>,
}

impl Figure {
    pub fn new(size: (u32, u32), xlim: (f64, f64), ylim: (f64, f64)) -> Self {
        Figure {
            width: size.0,
            height: size.1,
            xlim,
            ylim,
            bars: Vec::new(),
            areas: Vec::new(),
            yticks: Vec::new(),
        }
    }
}

/// Turns figures into files.
pub trait Renderer {
    /// Draw `figure` on a transparent background without margins and write it to `out`.
    fn render(&mut self, figure: &Figure, out: &Path) -> Result<()>;

    /// Write a minimal valid, empty image to `out`.
    fn placeholder(&mut self, out: &Path) -> Result<()>;
}

/// PNG writer backed by an RGBA buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngRenderer;

impl Renderer for PngRenderer {
    fn render(&mut self, figure: &Figure, out: &Path) -> Result<()> {
        let (width, height, buffer) = rasterize(figure)?;
        save_rgba(width, height, buffer, out)
    }

    fn placeholder(&mut self, out: &Path) -> Result<()> {
        save_rgba(1, 1, vec![0u8; 4], out)
    }
}

fn save_rgba(width: u32, height: u32, buffer: Vec<u8>, out: &Path) -> Result<()> {
    let img = RgbaImage::from_raw(width, height, buffer).ok_or_else(|| {
        Error::format(
            out.display().to_string(),
            format!("pixel buffer does not hold a {}x{} image", width, height),
        )
    })?;
    img.save_with_format(out, ImageFormat::Png).map_err(|e| match e {
        ImageError::IoError(source) => Error::io(out, source),
        other => Error::Render(other),
    })
}

/// 5x8 bitmap glyphs for lane labels.
fn glyph(c: char) -> [u8; 8] {
    match c {
        '0' => [0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70, 0x00],
        '1' => [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00],
        '2' => [0x70, 0x88, 0x08, 0x30, 0x40, 0x80, 0xF8, 0x00],
        '3' => [0xF8, 0x10, 0x20, 0x10, 0x08, 0x88, 0x70, 0x00],
        '4' => [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10, 0x00],
        '5' => [0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70, 0x00],
        '6' => [0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70, 0x00],
        '7' => [0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40, 0x00],
        '8' => [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70, 0x00],
        '9' => [0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60, 0x00],
        'M' => [0x88, 0xD8, 0xA8, 0xA8, 0x88, 0x88, 0x88, 0x00],
        'X' => [0x88, 0x88, 0x50, 0x20, 0x50, 0x88, 0x88, 0x00],
        'Y' => [0x88, 0x88, 0x50, 0x20, 0x20, 0x20, 0x20, 0x00],
        'c' => [0x00, 0x00, 0x70, 0x80, 0x80, 0x88, 0x70, 0x00],
        'h' => [0x80, 0x80, 0xB0, 0xC8, 0x88, 0x88, 0x88, 0x00],
        'r' => [0x00, 0x00, 0xB0, 0xC8, 0x80, 0x80, 0x80, 0x00],
        ' ' => [0x00; 8],
        _ => [0x70, 0x88, 0x08, 0x10, 0x20, 0x00, 0x20, 0x00], // '?'
    }
}

fn put_pixel(buffer: &mut [u8], width: u32, x: u32, y: u32, color: Rgb) {
    let idx = (y as usize * width as usize + x as usize) * 4;
    if idx + 3 < buffer.len() {
        buffer[idx] = color.0;
        buffer[idx + 1] = color.1;
        buffer[idx + 2] = color.2;
        buffer[idx + 3] = 255;
    }
}

fn write_char(buffer: &mut [u8], width: u32, base_x: u32, base_y: u32, char_data: &[u8; 8], char_size: u32) {
    let ratio = char_size / 8;
    for j in 0..8u32 {
        let row = char_data[j as usize];
        let y = base_y + j * ratio;
        for z in (0..8i32).rev() {
            if (row >> z) & 1 == 1 {
                let x = base_x + (7 - z as u32) * ratio;
                for rx in 0..ratio {
                    for ry in 0..ratio {
                        put_pixel(buffer, width, x + rx, y + ry, (0, 0, 0));
                    }
                }
            }
        }
    }
}

/// Fill columns `x0..x1` between rows `y0..y1` (clipped to the plot area).
fn fill_rect(buffer: &mut [u8], stride: u32, offset_x: u32, plot: (u32, u32), x: (u32, u32), y: (u32, u32), color: Rgb) {
    let (plot_w, plot_h) = plot;
    for px in x.0..x.1.min(plot_w) {
        for py in y.0..y.1.min(plot_h) {
            put_pixel(buffer, stride, offset_x + px, py, color);
        }
    }
}

/// Maps data coordinates onto plot pixels; y grows upwards in data space.
struct Scale {
    xlim: (f64, f64),
    ylim: (f64, f64),
    width: u32,
    height: u32,
}

impl Scale {
    fn x(&self, x: f64) -> f64 {
        let span = self.xlim.1 - self.xlim.0;
        if span <= 0.0 {
            return 0.0;
        }
        ((x - self.xlim.0) / span * self.width as f64).clamp(0.0, self.width as f64)
    }

    /// Pixel row (from the top) of data value `y`.
    fn row(&self, y: f64) -> f64 {
        let span = self.ylim.1 - self.ylim.0;
        if span <= 0.0 {
            return self.height as f64;
        }
        let from_bottom = ((y - self.ylim.0) / span * self.height as f64).clamp(0.0, self.height as f64);
        self.height as f64 - from_bottom
    }

    /// Data x at the centre of pixel column `px`.
    fn data_x(&self, px: u32) -> f64 {
        self.xlim.0 + (px as f64 + 0.5) / self.width as f64 * (self.xlim.1 - self.xlim.0)
    }
}

fn gutter_width(figure: &Figure) -> u32 {
    let longest = figure.yticks.iter().map(|(_, l)| l.chars().count()).max();
    match longest {
        Some(n) if n > 0 => n as u32 * CHAR_SIZE + CHAR_SIZE / 2,
        _ => 0,
    }
}

/// Rasterise a figure into `(width, height, rgba)`.
pub fn rasterize(figure: &Figure) -> Result<(u32, u32, Vec<u8>)> {
    let gutter = gutter_width(figure);
    let plot_w = figure.width.max(1);
    let plot_h = figure.height.max(1);
    let too_large = || Error::TooLarge {
        width: figure.width,
        height: figure.height,
        limit: MAX_PIXELS,
    };
    let total_width = gutter.checked_add(plot_w).ok_or_else(too_large)?;
    if total_width as u64 * plot_h as u64 > MAX_PIXELS {
        return Err(too_large());
    }
    let len = (total_width as usize)
        .checked_mul(plot_h as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(too_large)?;
    let mut buffer = vec![0u8; len];
    let scale = Scale {
        xlim: figure.xlim,
        ylim: figure.ylim,
        width: plot_w,
        height: plot_h,
    };

    for series in &figure.areas {
        let mut tops = vec![f64::NAN; plot_w as usize];
        for pair in series.points.windows(2) {
            let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
            let first = scale.x(ax).floor() as u32;
            let last = (scale.x(bx).ceil() as u32).min(plot_w);
            for px in first..last {
                let x = scale.data_x(px);
                if x < ax || x > bx {
                    continue;
                }
                let y = if bx > ax { ay + (by - ay) * (x - ax) / (bx - ax) } else { ay.max(by) };
                let slot = &mut tops[px as usize];
                if slot.is_nan() || y > *slot {
                    *slot = y;
                }
            }
        }
        let bottom = scale.row(0.0).round() as u32;
        for (px, &top) in tops.iter().enumerate() {
            if top.is_nan() {
                continue;
            }
            let top_row = scale.row(top).round() as u32;
            fill_rect(&mut buffer, total_width, gutter, (plot_w, plot_h), (px as u32, px as u32 + 1), (top_row, bottom), series.color);
        }
    }

    let mut bar_count = 0usize;
    for collection in &figure.bars {
        let (ymin, h) = collection.yrange;
        let rows = (scale.row(ymin + h).round() as u32, scale.row(ymin).round() as u32);
        for (&(start, width), &color) in collection.xranges.iter().zip(&collection.colors) {
            if width == 0 {
                continue;
            }
            let x0 = scale.x(start as f64).floor() as u32;
            let x1 = (scale.x((start + width) as f64).ceil() as u32).max(x0 + 1);
            fill_rect(&mut buffer, total_width, gutter, (plot_w, plot_h), (x0, x1), rows, color);
            bar_count += 1;
        }
    }

    for (y, label) in &figure.yticks {
        let center = scale.row(*y).round() as u32;
        let base_y = center.saturating_sub(CHAR_SIZE / 2);
        let text_width = label.chars().count() as u32 * CHAR_SIZE;
        let base_x = gutter.saturating_sub(CHAR_SIZE / 4 + text_width);
        for (i, c) in label.chars().enumerate() {
            write_char(&mut buffer, total_width, base_x + i as u32 * CHAR_SIZE, base_y, &glyph(c), CHAR_SIZE);
        }
    }

    debug!("Rasterised {} bars, {} curves into {}x{}", bar_count, figure.areas.len(), total_width, plot_h);
    Ok((total_width, plot_h, buffer))
}
