use crate::notify::NotificationKind;
use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub dark: bool,
    pub surface_0: Color32,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub user_bubble: Color32,
    pub assistant_bubble: Color32,
    pub success: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub radius_12: u8,
}

impl Theme {
    pub const P8: f32 = 8.0;
    pub const P12: f32 = 12.0;
    pub const R12: u8 = 12;

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn dark() -> Self {
        Self {
            dark: true,
            surface_0: Color32::from_rgb(0x11, 0x12, 0x1A),
            surface_1: Color32::from_rgb(0x18, 0x1A, 0x26),
            surface_2: Color32::from_rgb(0x22, 0x25, 0x35),
            accent_primary: Color32::from_rgb(0x8B, 0x5C, 0xF6),
            accent_muted: Color32::from_rgb(0x6D, 0x48, 0xC8),
            user_bubble: Color32::from_rgb(0x1F, 0x2A, 0x3D),
            assistant_bubble: Color32::from_rgb(0x26, 0x20, 0x3A),
            success: Color32::from_rgb(0x22, 0xC5, 0x5E),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            text_primary: Color32::from_rgb(0xE6, 0xE8, 0xF2),
            text_muted: Color32::from_rgb(0x8E, 0x93, 0xA8),
            spacing_8: Self::P8,
            spacing_12: Self::P12,
            radius_12: Self::R12,
        }
    }

    pub fn light() -> Self {
        Self {
            dark: false,
            surface_0: Color32::from_rgb(0xF7, 0xF5, 0xFD),
            surface_1: Color32::from_rgb(0xFF, 0xFF, 0xFF),
            surface_2: Color32::from_rgb(0xEE, 0xEB, 0xF7),
            accent_primary: Color32::from_rgb(0x7C, 0x3A, 0xED),
            accent_muted: Color32::from_rgb(0x93, 0x6B, 0xF0),
            user_bubble: Color32::from_rgb(0xE8, 0xF0, 0xFE),
            assistant_bubble: Color32::from_rgb(0xF3, 0xEE, 0xFF),
            success: Color32::from_rgb(0x16, 0xA3, 0x4A),
            danger: Color32::from_rgb(0xDC, 0x26, 0x26),
            text_primary: Color32::from_rgb(0x1F, 0x21, 0x2B),
            text_muted: Color32::from_rgb(0x6B, 0x70, 0x80),
            spacing_8: Self::P8,
            spacing_12: Self::P12,
            radius_12: Self::R12,
        }
    }

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = if self.dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        visuals.panel_fill = self.surface_0;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.weak_bg_fill = self.surface_2;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.weak_bg_fill = self.accent_muted;
        visuals.widgets.active.bg_fill = self.accent_primary;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.hyperlink_color = self.accent_primary;
        visuals.window_fill = self.surface_1;

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(20.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn bubble_frame(&self, fill: Color32) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::NONE)
    }

    pub fn card_frame(&self) -> Frame {
        self.bubble_frame(self.surface_2)
    }

    pub fn toast_frame(&self, kind: NotificationKind) -> Frame {
        let accent = match kind {
            NotificationKind::Info => self.accent_primary,
            NotificationKind::Success => self.success,
            NotificationKind::Error => self.danger,
        };
        Frame::new()
            .fill(self.surface_1)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::new(1.5, accent))
    }
}
