//! Canvas line charts for the per-model accuracy and loss series.

use drawcast::chart::{ChartData, ChartKind};
use drawcast::fmt::fmt_fixed;
use drawcast::theme::{series_color, Theme};
use web_sys::HtmlCanvasElement;

use super::canvas::context_2d;
use crate::ui_model::plot_runs;

const PAD_LEFT: f64 = 36.0;
const PAD_TOP: f64 = 24.0;
const PAD_BOTTOM: f64 = 18.0;

/// Draws one line per model; each line is broken wherever the model has no
/// entry. `None` data draws the empty frame with a placeholder.
pub(super) fn draw_model_chart(
    canvas: &HtmlCanvasElement,
    data: Option<&ChartData>,
    kind: ChartKind,
    theme: Theme,
) -> Result<(), String> {
    let ctx = context_2d(canvas)?;

    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let plot_w = (w - PAD_LEFT - 8.0).max(1.0);
    let plot_h = (h - PAD_TOP - PAD_BOTTOM).max(1.0);

    ctx.set_fill_style_str(theme.chart_background_css());
    ctx.fill_rect(0.0, 0.0, w, h);

    // Grid
    ctx.set_stroke_style_str(theme.chart_grid_css());
    ctx.set_line_width(0.5);
    for i in 0..=4 {
        let y = PAD_TOP + plot_h * (i as f64) / 4.0;
        ctx.begin_path();
        ctx.move_to(PAD_LEFT, y);
        ctx.line_to(PAD_LEFT + plot_w, y);
        ctx.stroke();
    }

    ctx.set_font("11px system-ui, sans-serif");
    ctx.set_fill_style_str(theme.chart_text_css());
    ctx.set_text_align("left");
    let _ = ctx.fill_text(kind.label(), PAD_LEFT, 14.0);

    let Some(data) = data.filter(|d| !d.is_empty()) else {
        let _ = ctx.fill_text("No history yet", PAD_LEFT + 8.0, PAD_TOP + 16.0);
        return Ok(());
    };

    let axis = data.axis(kind);
    ctx.set_text_align("right");
    let _ = ctx.fill_text(&fmt_fixed(axis.max, 1), PAD_LEFT - 4.0, PAD_TOP + 4.0);
    let _ = ctx.fill_text(&fmt_fixed(axis.min, 1), PAD_LEFT - 4.0, PAD_TOP + plot_h + 4.0);

    for (si, series) in data.series().iter().enumerate() {
        let color = series_color(si);
        ctx.set_stroke_style_str(color);
        ctx.set_fill_style_str(color);
        ctx.set_line_width(2.0);

        for run in plot_runs(series.values(kind), axis, plot_w, plot_h) {
            if let [(x, y)] = run.as_slice() {
                // Isolated point: a dot instead of a zero-length line.
                ctx.begin_path();
                let _ = ctx.arc(PAD_LEFT + *x, PAD_TOP + *y, 2.5, 0.0, std::f64::consts::TAU);
                ctx.fill();
                continue;
            }
            ctx.begin_path();
            for (i, &(x, y)) in run.iter().enumerate() {
                if i == 0 {
                    ctx.move_to(PAD_LEFT + x, PAD_TOP + y);
                } else {
                    ctx.line_to(PAD_LEFT + x, PAD_TOP + y);
                }
            }
            ctx.stroke();
        }
    }

    // Legend
    ctx.set_text_align("left");
    let mut lx = PAD_LEFT + 80.0;
    let ly = 14.0;
    for (si, series) in data.series().iter().enumerate() {
        ctx.set_fill_style_str(series_color(si));
        ctx.fill_rect(lx, ly - 6.0, 10.0, 3.0);
        ctx.set_fill_style_str(theme.chart_text_css());
        let _ = ctx.fill_text(&series.model, lx + 14.0, ly);
        lx += 22.0 + (series.model.len() as f64 * 7.0);
        if lx > w - 60.0 {
            break;
        }
    }

    Ok(())
}
