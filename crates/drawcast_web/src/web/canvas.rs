use drawcast::raster::{Brush, Point, RasterSnapshot, Surface};
use drawcast::theme::Theme;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub(super) fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())
}

/// The drawing `<canvas>` as a stroke surface.
pub(super) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub(super) fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = context_2d(&canvas)?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn fill_background(&mut self, theme: Theme) -> Result<(), String> {
        self.ctx.set_fill_style_str(theme.background_css());
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        Ok(())
    }

    fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        brush: &Brush,
        theme: Theme,
    ) -> Result<(), String> {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(theme.ink_css());
        ctx.set_line_width(brush.width);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.begin_path();
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
        ctx.stroke();
        Ok(())
    }

    fn snapshot(&self) -> Result<RasterSnapshot, String> {
        self.canvas
            .to_data_url_with_type("image/png")
            .map(RasterSnapshot::from_data_url)
            .map_err(|_| "canvas: toDataURL threw".to_string())
    }
}
