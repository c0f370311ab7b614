use ratatui::style::Color;

/// Palette carried over from the original web interface: purple for the
/// user's turns, soft gray for the assistant's.
#[derive(Clone)]
pub struct Theme {
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub user_color: Color,
    pub assistant_color: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::Rgb(230, 230, 230),
            accent: Color::Rgb(147, 51, 234),
            muted: Color::Rgb(120, 120, 120),
            user_color: Color::Rgb(192, 132, 252),
            assistant_color: Color::Rgb(209, 213, 219),
            border: Color::Rgb(70, 70, 80),
        }
    }
}
