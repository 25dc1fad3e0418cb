use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub card_fill: Color32,
    pub card_border: Color32,
    pub text: Color32,
    pub attribution: Color32,
    pub kicker: Color32,
    pub heading: Color32,
    pub hint: Color32,
    pub button_fill: Color32,
    pub button_border: Color32,
    pub button_text: Color32,
    pub envelope_pocket: Color32,
    pub envelope_border: Color32,
    pub envelope_side: Color32,
    pub envelope_flap: Color32,
    pub shadow: Color32,
    pub heading_size: f32,
    pub kicker_size: f32,
    pub body_size: f32,
    pub attribution_size: f32,
    pub small_size: f32,
}

impl Theme {
    /// Warm paper tones.
    pub fn peach() -> Self {
        Self {
            name: "peach".to_string(),
            background: Color32::from_rgb(0xFC, 0xD0, 0xB1),
            card_fill: Color32::from_rgba_unmultiplied(0xFF, 0xFF, 0xFF, 0xE6),
            card_border: Color32::from_rgb(0xF7, 0xD8, 0xC0),
            text: Color32::from_rgb(0x4A, 0x2D, 0x22),
            attribution: Color32::from_rgb(0xC4, 0x69, 0x38),
            kicker: Color32::from_rgb(0xB8, 0x5B, 0x2F),
            heading: Color32::from_rgb(0x4A, 0x2D, 0x22),
            hint: Color32::from_rgb(0x7C, 0x52, 0x3D),
            button_fill: Color32::from_rgba_unmultiplied(0xFF, 0xFF, 0xFF, 0xCC),
            button_border: Color32::from_rgb(0xF1, 0xB1, 0x89),
            button_text: Color32::from_rgb(0xB8, 0x5B, 0x2F),
            envelope_pocket: Color32::from_rgb(0xFE, 0xF3, 0xE5),
            envelope_border: Color32::from_rgb(0xF1, 0xC1, 0x9B),
            envelope_side: Color32::from_rgb(0xF9, 0xD5, 0xB9),
            envelope_flap: Color32::from_rgb(0xF8, 0xCB, 0xA9),
            shadow: Color32::from_rgba_unmultiplied(0, 0, 0, 26),
            heading_size: 30.0,
            kicker_size: 12.0,
            body_size: 18.0,
            attribution_size: 16.0,
            small_size: 14.0,
        }
    }

    /// Same card after dark.
    pub fn night() -> Self {
        Self {
            name: "night".to_string(),
            background: Color32::from_rgb(0x2A, 0x1E, 0x1A),
            card_fill: Color32::from_rgba_unmultiplied(0x3B, 0x2A, 0x24, 0xEE),
            card_border: Color32::from_rgb(0x5A, 0x40, 0x34),
            text: Color32::from_rgb(0xF3, 0xE3, 0xD8),
            attribution: Color32::from_rgb(0xF0, 0x9A, 0x68),
            kicker: Color32::from_rgb(0xE0, 0x8E, 0x60),
            heading: Color32::from_rgb(0xFB, 0xEE, 0xE4),
            hint: Color32::from_rgb(0xC8, 0xA8, 0x96),
            button_fill: Color32::from_rgba_unmultiplied(0x4A, 0x35, 0x2D, 0xCC),
            button_border: Color32::from_rgb(0x8C, 0x5C, 0x42),
            button_text: Color32::from_rgb(0xF0, 0x9A, 0x68),
            envelope_pocket: Color32::from_rgb(0x4E, 0x3A, 0x30),
            envelope_border: Color32::from_rgb(0x6E, 0x50, 0x40),
            envelope_side: Color32::from_rgb(0x5C, 0x44, 0x38),
            envelope_flap: Color32::from_rgb(0x66, 0x4B, 0x3E),
            shadow: Color32::from_rgba_unmultiplied(0, 0, 0, 60),
            heading_size: 30.0,
            kicker_size: 12.0,
            body_size: 18.0,
            attribution_size: 16.0,
            small_size: 14.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "night" => Self::night(),
            _ => Self::peach(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "night" {
            Self::peach()
        } else {
            Self::night()
        }
    }

    /// Apply opacity to a color, keeping any alpha it already has.
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * opacity.clamp(0.0, 1.0)) as u8)
    }
}
