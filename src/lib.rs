//! # drawcast
//!
//! Realtime inference dispatch for a freehand digit-drawing front end.
//!
//! Strokes drawn on a surface are debounced into prediction requests; replies
//! from several models are merged into one deterministic feedback string; a
//! separate timer polls the prediction history and rebuilds per-model
//! accuracy/loss series.
//!
//! Nothing here depends on the browser. The `drawcast_web` crate hosts the
//! same state machines on a `<canvas>` with browser timers.
//!
//! ## Quick Start
//!
//! ```
//! use drawcast::prelude::*;
//!
//! let cfg = DrawcastConfig::default();
//! let mut pipeline = RealtimePipeline::new(PixelSurface::new(280, 280), &cfg).unwrap();
//!
//! let t0 = Instant::now();
//! pipeline.pointer_down(Point::new(40.0, 40.0));
//! pipeline.pointer_move(Point::new(120.0, 160.0), t0).unwrap();
//! pipeline.pointer_up();
//!
//! // Nothing is sent until the quiet period has passed.
//! assert!(pipeline.poll_debounce(t0).unwrap().is_none());
//! let call = pipeline.poll_debounce(t0 + cfg.debounce()).unwrap().unwrap();
//!
//! // ... send `call.raster` with an `InferenceClient`, then:
//! pipeline.complete(call.token, Vec::new());
//! assert_eq!(pipeline.feedback().render(), "No prediction available");
//! ```
//!
//! ## Modules
//!
//! - [`stroke`] / [`raster`]: pointer gestures and drawing surfaces
//! - [`debounce`]: trailing-edge debounce
//! - [`inference`]: prediction client and call tokens
//! - [`aggregate`]: multi-model and per-file feedback
//! - [`history`] / [`chart`]: history polling and chart series
//! - [`pipeline`]: the realtime path wired together

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fmt;
pub mod history;
pub mod inference;
pub mod pipeline;
pub mod raster;
pub mod stroke;
pub mod theme;
pub mod time;

pub use aggregate::{group_by_file, Feedback, FeedbackLine, FileGroup};
pub use chart::{ChartData, ChartFeed, ChartKind, ModelSeries, PollOutcome};
pub use config::{DrawcastConfig, Endpoints};
pub use error::{ConfigError, FetchError};
pub use history::{HistoryClient, HistoryPoint};
pub use inference::{
    CallToken, InferenceClient, Prediction, PredictionResult, TokenCounter, UploadFile,
};
pub use pipeline::{Applied, PendingCall, RealtimePipeline};

pub mod prelude {
    pub use crate::aggregate::{group_by_file, Feedback};
    pub use crate::chart::{ChartData, ChartFeed, ChartKind, PollOutcome};
    pub use crate::config::DrawcastConfig;
    pub use crate::debounce::Debouncer;
    pub use crate::error::FetchError;
    pub use crate::history::{HistoryClient, HistoryPoint};
    pub use crate::inference::{InferenceClient, PredictionResult};
    pub use crate::pipeline::{Applied, RealtimePipeline};
    pub use crate::raster::{PixelSurface, Point, Surface};
    pub use crate::theme::Theme;
    pub use crate::time::{Duration, Instant};
}
