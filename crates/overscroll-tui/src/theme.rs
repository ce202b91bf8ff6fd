use ratatui::style::Color;

/// Runtime color palette of the demo
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub bg: Color,
    /// Space revealed by over-scroll
    pub gap: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub header: Color,
    /// Header label once a release would refresh
    pub armed: Color,
    pub footer: Color,
    pub busy: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::gruvbox_dark()
    }
}

impl Theme {
    pub fn gruvbox_dark() -> Self {
        Self {
            bg: Color::Rgb(0x28, 0x28, 0x28),
            gap: Color::Rgb(0x1d, 0x20, 0x21),
            fg: Color::Rgb(0xd4, 0xbe, 0x98),
            muted: Color::Rgb(0x92, 0x83, 0x74),
            border: Color::Rgb(0x7c, 0x6f, 0x64),
            header: Color::Rgb(0x7d, 0xae, 0xa3),
            armed: Color::Rgb(0xa9, 0xb6, 0x65),
            footer: Color::Rgb(0xd8, 0xa6, 0x57),
            busy: Color::Rgb(0xe7, 0x8a, 0x4e),
            status_bg: Color::Rgb(0x45, 0x40, 0x3d),
            status_fg: Color::Rgb(0xdd, 0xc7, 0xa1),
            error: Color::Rgb(0xea, 0x69, 0x62),
        }
    }

    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(0x2e, 0x34, 0x40),       // nord0
            gap: Color::Rgb(0x24, 0x29, 0x33),
            fg: Color::Rgb(0xec, 0xef, 0xf4),       // nord6
            muted: Color::Rgb(0x5e, 0x68, 0x7a),
            border: Color::Rgb(0x4c, 0x56, 0x6a),   // nord3
            header: Color::Rgb(0x88, 0xc0, 0xd0),   // nord8
            armed: Color::Rgb(0xa3, 0xbe, 0x8c),    // nord14
            footer: Color::Rgb(0xeb, 0xcb, 0x8b),   // nord13
            busy: Color::Rgb(0xd0, 0x87, 0x70),     // nord12
            status_bg: Color::Rgb(0x43, 0x4c, 0x5e), // nord2
            status_fg: Color::Rgb(0xe5, 0xe9, 0xf0),
            error: Color::Rgb(0xbf, 0x61, 0x6a),    // nord11
        }
    }

    /// Look a theme up by its config name, falling back to the default
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "nord" => Self::nord(),
            "gruvbox-dark" | "gruvbox" => Self::gruvbox_dark(),
            other => {
                tracing::warn!("Unknown theme '{}', using gruvbox-dark", other);
                Self::gruvbox_dark()
            }
        }
    }
}
