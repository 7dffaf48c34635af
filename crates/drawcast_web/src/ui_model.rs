//! UI helpers that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! geometry and config resolution on the host.

use drawcast::chart::AxisRange;
use drawcast::config::DrawcastConfig;
use drawcast::raster::Point;
use drawcast::theme::Theme;
use tracing::warn;

pub const LOCALSTORAGE_CONFIG_KEY: &str = "drawcast.config.v1";
pub const LOCALSTORAGE_THEME_KEY: &str = "drawcast.theme.v1";

/// Bounding box of an element in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps a mouse position in client coordinates onto the canvas backing store,
/// which may be displayed at a different size than it is drawn.
pub fn canvas_point(
    client_x: f64,
    client_y: f64,
    rect: ClientRect,
    canvas_width: u32,
    canvas_height: u32,
) -> Point {
    let sx = if rect.width > 0.0 {
        canvas_width as f64 / rect.width
    } else {
        1.0
    };
    let sy = if rect.height > 0.0 {
        canvas_height as f64 / rect.height
    } else {
        1.0
    };
    Point::new((client_x - rect.left) * sx, (client_y - rect.top) * sy)
}

/// Splits a gapped series into drawable runs of pixel coordinates.
///
/// Index `i` maps to `x = i * width / (n - 1)`; a `None` (or non-finite value)
/// ends the current run so the line is never drawn across a gap.
pub fn plot_runs(
    values: &[Option<f64>],
    axis: AxisRange,
    width: f64,
    height: f64,
) -> Vec<Vec<(f64, f64)>> {
    let n = values.len();
    let step_x = if n <= 1 { width } else { width / ((n - 1) as f64) };
    let range = (axis.max - axis.min).max(1e-9);

    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => {
                let norm = ((v - axis.min) / range).clamp(0.0, 1.0);
                current.push((i as f64 * step_x, height - norm * height));
            }
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Builds the effective config from the stored override and the page origin.
///
/// Without a stored `base_url` the backend is assumed to serve the page, so
/// requests go to `origin`. An unreadable override is ignored.
pub fn resolve_config(stored: Option<&str>, origin: Option<&str>) -> DrawcastConfig {
    let (mut cfg, has_base_url) = match stored {
        Some(raw) => match DrawcastConfig::from_json(raw) {
            Ok(cfg) => {
                let has_base_url = serde_json::from_str::<serde_json::Value>(raw)
                    .ok()
                    .is_some_and(|v| v.get("base_url").is_some());
                (cfg, has_base_url)
            }
            Err(e) => {
                warn!(error = %e, "ignoring stored config");
                (DrawcastConfig::default(), false)
            }
        },
        None => (DrawcastConfig::default(), false),
    };

    if !has_base_url {
        if let Some(origin) = origin.filter(|o| !o.is_empty() && *o != "null") {
            cfg = cfg.with_base_url(origin);
        }
    }
    cfg
}

pub fn parse_theme(stored: Option<&str>) -> Option<Theme> {
    match stored?.trim().to_ascii_lowercase().as_str() {
        "dark" => Some(Theme::Dark),
        "light" => Some(Theme::Light),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_point_scales_css_size_to_backing_store() {
        let rect = ClientRect {
            left: 100.0,
            top: 50.0,
            width: 140.0,
            height: 140.0,
        };
        let p = canvas_point(170.0, 120.0, rect, 280, 280);
        assert_eq!(p, Point::new(140.0, 140.0));
    }

    #[test]
    fn runs_break_at_gaps() {
        let axis = AxisRange { min: 0.0, max: 1.0 };
        let values = [Some(1.0), Some(0.0), None, Some(0.5), None];
        let runs = plot_runs(&values, axis, 40.0, 10.0);
        assert_eq!(runs, vec![vec![(0.0, 0.0), (10.0, 10.0)], vec![(30.0, 5.0)]]);
    }

    #[test]
    fn all_gaps_draw_nothing() {
        let axis = AxisRange { min: 0.0, max: 1.0 };
        assert!(plot_runs(&[None, None], axis, 10.0, 10.0).is_empty());
        assert!(plot_runs(&[], axis, 10.0, 10.0).is_empty());
    }

    #[test]
    fn origin_is_used_when_no_base_url_is_stored() {
        let cfg = resolve_config(None, Some("https://digits.example"));
        assert_eq!(cfg.base_url, "https://digits.example");

        let cfg = resolve_config(Some(r#"{"debounce_ms": 300}"#), Some("https://digits.example"));
        assert_eq!(cfg.base_url, "https://digits.example");
        assert_eq!(cfg.debounce_ms, 300);
    }

    #[test]
    fn stored_base_url_wins_over_origin() {
        let cfg = resolve_config(
            Some(r#"{"base_url": "http://10.0.0.2:5000"}"#),
            Some("https://digits.example"),
        );
        assert_eq!(cfg.base_url, "http://10.0.0.2:5000");
    }

    #[test]
    fn unreadable_override_falls_back_to_defaults() {
        let cfg = resolve_config(Some(r#"{"debounce_ms": 0}"#), None);
        assert_eq!(cfg, DrawcastConfig::default());
    }

    #[test]
    fn theme_parsing_is_lenient() {
        assert_eq!(parse_theme(Some(" Light ")), Some(Theme::Light));
        assert_eq!(parse_theme(Some("dark")), Some(Theme::Dark));
        assert_eq!(parse_theme(Some("sepia")), None);
        assert_eq!(parse_theme(None), None);
    }
}
