//! Display theme shared by the drawing surface and the charts.

use serde::{Deserialize, Serialize};

/// Line colours for chart series, cycled by series index.
pub const SERIES_COLORS: [&str; 8] = [
    "#7aa2ff", // blue
    "#fbbf24", // amber
    "#4ade80", // green
    "#fb7185", // pink/red
    "#a78bfa", // purple
    "#22c55e", // bright green
    "#60a5fa", // light blue
    "#e879f9", // magenta
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Theme::Dark => "🌙",
            Theme::Light => "🌞",
        }
    }

    pub fn as_attr(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Background luminance of the drawing surface.
    pub fn background_luma(self) -> u8 {
        match self {
            Theme::Dark => 0,
            Theme::Light => 255,
        }
    }

    pub fn ink_luma(self) -> u8 {
        255 - self.background_luma()
    }

    pub fn background_css(self) -> &'static str {
        match self {
            Theme::Dark => "#000000",
            Theme::Light => "#ffffff",
        }
    }

    pub fn ink_css(self) -> &'static str {
        match self {
            Theme::Dark => "#ffffff",
            Theme::Light => "#000000",
        }
    }

    pub fn chart_background_css(self) -> &'static str {
        match self {
            Theme::Dark => "#0a0f1a",
            Theme::Light => "#f8fafc",
        }
    }

    pub fn chart_grid_css(self) -> &'static str {
        match self {
            Theme::Dark => "rgba(122, 162, 255, 0.18)",
            Theme::Light => "rgba(15, 23, 42, 0.12)",
        }
    }

    pub fn chart_text_css(self) -> &'static str {
        match self {
            Theme::Dark => "rgba(170, 180, 230, 0.85)",
            Theme::Light => "rgba(51, 65, 85, 0.9)",
        }
    }
}

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}
