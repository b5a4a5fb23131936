use crate::core::config::ThemePreference;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub preference: ThemePreference,

    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub model_prefix_style: Style,
    pub model_text_style: Style,

    // Chrome
    pub pending_indicator_style: Style,
    pub notice_style: Style,
    pub prompt_style: Style,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            preference: ThemePreference::Dark,
            user_prefix_style: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            model_prefix_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            model_text_style: Style::default().fg(Color::White),

            pending_indicator_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            notice_style: Style::default().fg(Color::DarkGray),
            prompt_style: Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn light() -> Self {
        Theme {
            preference: ThemePreference::Light,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            model_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            model_text_style: Style::default().fg(Color::Black),

            pending_indicator_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            notice_style: Style::default().fg(Color::Gray),
            prompt_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }
}
