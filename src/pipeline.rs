//! The realtime path: strokes → debounce → call token → feedback.
//!
//! The pipeline never performs I/O. The host sends the [`PendingCall`]'s
//! raster through an [`InferenceClient`](crate::InferenceClient) and hands the
//! results back to [`RealtimePipeline::complete`], which only displays them if
//! no newer call has been issued since.

use tracing::debug;

use crate::aggregate::Feedback;
use crate::config::DrawcastConfig;
use crate::debounce::{DebounceTicket, Debouncer};
use crate::inference::{CallToken, PredictionResult, TokenCounter};
use crate::raster::{Brush, Point, RasterSnapshot, Surface};
use crate::stroke::StrokeCapture;
use crate::theme::Theme;
use crate::time::Instant;

/// A call the host should send now.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub token: CallToken,
    pub raster: RasterSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Displayed,
    /// A newer call was issued after this one; its results were dropped.
    Stale,
}

pub struct RealtimePipeline<S: Surface> {
    capture: StrokeCapture<S>,
    debouncer: Debouncer,
    tokens: TokenCounter,
    feedback: Feedback,
}

impl<S: Surface> RealtimePipeline<S> {
    pub fn new(surface: S, config: &DrawcastConfig) -> Result<Self, String> {
        let brush = Brush {
            width: config.brush_width,
        };
        Ok(Self {
            capture: StrokeCapture::new(surface, brush, config.theme)?,
            debouncer: Debouncer::new(config.debounce()),
            tokens: TokenCounter::new(),
            feedback: Feedback::Idle,
        })
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.capture.pointer_down(p);
    }

    /// Paints the move and restarts the debounce timer. Returns the ticket the
    /// host timer should fire, or `None` when nothing was painted.
    pub fn pointer_move(
        &mut self,
        p: Point,
        now: Instant,
    ) -> Result<Option<DebounceTicket>, String> {
        if !self.capture.pointer_move(p)? {
            return Ok(None);
        }
        Ok(self.debouncer.trigger(now))
    }

    pub fn pointer_up(&mut self) {
        self.capture.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.capture.pointer_leave();
    }

    /// Wipes the canvas and the feedback. Pending and in-flight calls are
    /// dropped so they cannot repaint the cleared state.
    pub fn clear(&mut self) -> Result<(), String> {
        self.debouncer.cancel();
        self.tokens.invalidate();
        self.feedback = Feedback::Idle;
        self.capture.clear()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), String> {
        self.capture.set_theme(theme)
    }

    /// Timer-host path: the callback for `generation` has run.
    pub fn fire_debounce(&mut self, generation: u64) -> Result<Option<PendingCall>, String> {
        if !self.debouncer.fire(generation) {
            return Ok(None);
        }
        self.begin_call().map(Some)
    }

    /// Polling-host path.
    pub fn poll_debounce(&mut self, now: Instant) -> Result<Option<PendingCall>, String> {
        if !self.debouncer.poll(now) {
            return Ok(None);
        }
        self.begin_call().map(Some)
    }

    /// Snapshots the canvas and issues a new call token, superseding every
    /// earlier call.
    pub fn begin_call(&mut self) -> Result<PendingCall, String> {
        let raster = self.capture.snapshot()?;
        let token = self.tokens.issue();
        debug!(token = token.get(), "inference call issued");
        Ok(PendingCall { token, raster })
    }

    pub fn complete(&mut self, token: CallToken, results: Vec<PredictionResult>) -> Applied {
        if !self.tokens.is_latest(token) {
            debug!(token = token.get(), "dropping stale inference result");
            return Applied::Stale;
        }
        self.feedback = Feedback::from_results(results);
        Applied::Displayed
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn capture(&self) -> &StrokeCapture<S> {
        &self.capture
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn teardown(&mut self) {
        self.debouncer.teardown();
    }
}
