//! Drawing surfaces and the encoded snapshots taken from them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pen used for every segment. Caps are always round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub width: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self { width: 15.0 }
    }
}

/// An encoded image of the drawing surface, ready to be sent as the `image`
/// field of a prediction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    data_url: String,
}

impl RasterSnapshot {
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.data_url
    }

    pub fn into_string(self) -> String {
        self.data_url
    }
}

/// Something strokes can be painted on.
///
/// The browser implements this on a `<canvas>`; [`PixelSurface`] is the
/// in-memory version used off the browser.
pub trait Surface {
    fn fill_background(&mut self, theme: Theme) -> Result<(), String>;

    fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        brush: &Brush,
        theme: Theme,
    ) -> Result<(), String>;

    fn snapshot(&self) -> Result<RasterSnapshot, String>;
}

/// 8-bit grayscale buffer, row-major.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn luma_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
    }

    /// Binary PGM (`P5`): the simplest grayscale container image decoders accept.
    fn encode_pgm(&self) -> Vec<u8> {
        let header = format!("P5\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + self.pixels.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.pixels);
        out
    }
}

impl Surface for PixelSurface {
    fn fill_background(&mut self, theme: Theme) -> Result<(), String> {
        self.pixels.fill(theme.background_luma());
        Ok(())
    }

    fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        brush: &Brush,
        theme: Theme,
    ) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let r = (brush.width * 0.5).max(0.5);
        let ink = theme.ink_luma();

        let min_x = (from.x.min(to.x) - r).floor().max(0.0);
        let max_x = (from.x.max(to.x) + r).ceil().min((self.width - 1) as f64);
        let min_y = (from.y.min(to.y) - r).floor().max(0.0);
        let max_y = (from.y.max(to.y) + r).ceil().min((self.height - 1) as f64);
        if min_x > max_x || min_y > max_y {
            return Ok(());
        }

        let w = self.width as usize;
        for py in (min_y as usize)..=(max_y as usize) {
            for px in (min_x as usize)..=(max_x as usize) {
                let c = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                if distance_to_segment(c, from, to) <= r {
                    self.pixels[py * w + px] = ink;
                }
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<RasterSnapshot, String> {
        let encoded = STANDARD.encode(self.encode_pgm());
        Ok(RasterSnapshot::from_data_url(format!(
            "data:image/x-portable-graymap;base64,{encoded}"
        )))
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 <= f64::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - qx).powi(2) + (p.y - qy).powi(2)).sqrt()
}
