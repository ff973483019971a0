use eframe::egui::{self, Color32, Stroke, Visuals};

/// Theme color definitions
#[derive(Debug, Clone)]
pub struct Theme {
    dark: bool,

    // Base colors
    pub bg_dark: Color32,
    pub bg_medium: Color32,
    pub bg_light: Color32,

    // Text colors
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    pub accent: Color32,

    // Semantic colors
    pub warning: Color32,
    pub error: Color32,

    pub border: Color32,
}

impl Theme {
    /// Select the theme matching the configured preference
    pub fn for_preference(dark: bool) -> Self {
        if dark { Self::night() } else { Self::day() }
    }

    /// Night sky - deep blue background, pale gold accent
    pub fn night() -> Self {
        Self {
            dark: true,
            bg_dark: Color32::from_rgb(11, 15, 30),
            bg_medium: Color32::from_rgb(20, 26, 48),
            bg_light: Color32::from_rgb(34, 42, 70),

            text_primary: Color32::from_rgb(240, 242, 250),
            text_secondary: Color32::from_rgb(195, 200, 220),
            text_muted: Color32::from_rgb(130, 138, 165),

            accent: Color32::from_rgb(250, 204, 21), // Yellow-400

            warning: Color32::from_rgb(251, 146, 60), // Orange-400
            error: Color32::from_rgb(248, 113, 113),  // Red-400

            border: Color32::from_rgb(52, 62, 96),
        }
    }

    /// Daylight - light background, deep blue accent
    pub fn day() -> Self {
        Self {
            dark: false,
            bg_dark: Color32::from_rgb(248, 250, 252),
            bg_medium: Color32::from_rgb(236, 240, 246),
            bg_light: Color32::from_rgb(222, 228, 238),

            text_primary: Color32::from_rgb(15, 23, 42),
            text_secondary: Color32::from_rgb(51, 65, 85),
            text_muted: Color32::from_rgb(100, 116, 139),

            accent: Color32::from_rgb(37, 99, 235), // Blue-600

            warning: Color32::from_rgb(194, 65, 12), // Orange-700
            error: Color32::from_rgb(185, 28, 28),   // Red-700

            border: Color32::from_rgb(203, 213, 225),
        }
    }

    /// Apply this theme to egui's visuals
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = if self.dark { Visuals::dark() } else { Visuals::light() };

        visuals.window_fill = self.bg_dark;
        visuals.panel_fill = self.bg_dark;
        visuals.faint_bg_color = self.bg_medium;

        visuals.widgets.inactive.bg_fill = self.bg_medium;
        visuals.widgets.inactive.weak_bg_fill = self.bg_light;
        visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.widgets.hovered.bg_fill = self.bg_light;
        visuals.widgets.hovered.weak_bg_fill = self.bg_light;
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);

        visuals.hyperlink_color = self.accent;
        visuals.window_stroke = Stroke::new(1.0, self.border);

        ctx.set_visuals(visuals);
    }
}
