use echo_charts_core::SeriesKind;
use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight: Color,
    pub axis: Color,
    pub both: Color,
    pub primary: Color,
    pub secondary: Color,
    pub error: Color,
    pub success: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            axis: Color::Gray,
            both: Color::DarkGray,
            primary: Color::Cyan,
            secondary: Color::Magenta,
            error: Color::Red,
            success: Color::LightGreen,
        }
    }
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            highlight: Color::Blue,
            axis: Color::DarkGray,
            both: Color::Gray,
            primary: Color::Blue,
            secondary: Color::Magenta,
            error: Color::Red,
            success: Color::Green,
        }
    }
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(216, 222, 233),
            highlight: Color::Rgb(136, 192, 208),
            axis: Color::Rgb(129, 161, 193),
            both: Color::Rgb(76, 86, 106),
            primary: Color::Rgb(163, 190, 140),
            secondary: Color::Rgb(180, 142, 173),
            error: Color::Rgb(191, 97, 106),
            success: Color::Rgb(163, 190, 140),
        }
    }
    pub fn catppuccin() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 46),
            fg: Color::Rgb(205, 214, 244),
            highlight: Color::Rgb(137, 180, 250),
            axis: Color::Rgb(166, 173, 200),
            both: Color::Rgb(88, 91, 112),
            primary: Color::Rgb(166, 227, 161),
            secondary: Color::Rgb(203, 166, 247),
            error: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 227, 161),
        }
    }
    pub fn colorblind() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            axis: Color::Gray,
            both: Color::DarkGray,
            primary: Color::Rgb(0x00, 0x80, 0xFF),   // blue instead of green
            secondary: Color::Rgb(0xFF, 0x8C, 0x00), // orange instead of magenta
            error: Color::Rgb(0xFF, 0x8C, 0x00),
            success: Color::Rgb(0x00, 0x80, 0xFF),
        }
    }
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "nord" => Self::nord(),
            "catppuccin" => Self::catppuccin(),
            "colorblind" => Self::colorblind(),
            _ => Self::dark(),
        }
    }
    pub fn series(&self, kind: SeriesKind) -> Color {
        match kind {
            SeriesKind::Both => self.both,
            SeriesKind::Primary => self.primary,
            SeriesKind::Secondary => self.secondary,
        }
    }
}
