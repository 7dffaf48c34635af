//! Pointer gestures to painted strokes.

use crate::raster::{Brush, Point, RasterSnapshot, Surface};
use crate::theme::Theme;

/// In-progress drag state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrokeSession {
    pub is_drawing: bool,
    pub last_point: Option<Point>,
}

impl StrokeSession {
    fn begin(&mut self, p: Point) {
        self.is_drawing = true;
        self.last_point = Some(p);
    }

    fn end(&mut self) {
        self.is_drawing = false;
        self.last_point = None;
    }
}

/// Owns the drawing surface and turns drags into segments on it.
///
/// Segments drawn since the last [`clear`](StrokeCapture::clear) are kept so a
/// theme change can repaint the background and re-ink them. Straight runs of
/// a drag collapse into one segment, so the list grows with direction changes
/// rather than with pointer events.
pub struct StrokeCapture<S: Surface> {
    surface: S,
    brush: Brush,
    theme: Theme,
    session: StrokeSession,
    segments: Vec<(Point, Point)>,
}

impl<S: Surface> StrokeCapture<S> {
    pub fn new(mut surface: S, brush: Brush, theme: Theme) -> Result<Self, String> {
        surface.fill_background(theme)?;
        Ok(Self {
            surface,
            brush,
            theme,
            session: StrokeSession::default(),
            segments: Vec::new(),
        })
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.session.begin(p);
    }

    /// Extends the active stroke to `p`.
    ///
    /// Returns `Ok(true)` when a segment was painted; a move with no active
    /// session is ignored and returns `Ok(false)`.
    pub fn pointer_move(&mut self, p: Point) -> Result<bool, String> {
        if !self.session.is_drawing {
            return Ok(false);
        }
        let from = self.session.last_point.unwrap_or(p);
        self.surface
            .stroke_segment(from, p, &self.brush, self.theme)?;
        let merged = match self.segments.last_mut() {
            Some(last) if last.1 == from && continues(last.0, from, p) => {
                last.1 = p;
                true
            }
            _ => false,
        };
        if !merged {
            self.segments.push((from, p));
        }
        self.session.last_point = Some(p);
        Ok(true)
    }

    pub fn pointer_up(&mut self) {
        self.session.end();
    }

    pub fn pointer_leave(&mut self) {
        self.session.end();
    }

    pub fn clear(&mut self) -> Result<(), String> {
        self.session.end();
        self.segments.clear();
        self.surface.fill_background(self.theme)
    }

    /// Repaints the background for `theme` and re-inks the current drawing.
    /// An active drag keeps going.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), String> {
        self.theme = theme;
        self.surface.fill_background(theme)?;
        for &(from, to) in &self.segments {
            self.surface.stroke_segment(from, to, &self.brush, theme)?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Result<RasterSnapshot, String> {
        self.surface.snapshot()
    }

    pub fn session(&self) -> StrokeSession {
        self.session
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn has_ink(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Segments kept for re-inking.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

/// True when `b -> c` carries on in the direction of `a -> b`, or stays put.
/// Round caps make the merged segment paint exactly the same pixels.
fn continues(a: Point, b: Point, c: Point) -> bool {
    let (ux, uy) = (b.x - a.x, b.y - a.y);
    let (vx, vy) = (c.x - b.x, c.y - b.y);
    if vx == 0.0 && vy == 0.0 {
        return true;
    }
    let cross = ux * vy - uy * vx;
    let dot = ux * vx + uy * vy;
    let scale = ux.hypot(uy) * vx.hypot(vy);
    dot > 0.0 && cross.abs() <= 1e-9 * scale
}
