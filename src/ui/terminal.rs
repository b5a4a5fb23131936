//! Line-oriented terminal rendering of the transcript.
//!
//! Messages scroll by like a normal terminal session. The pending
//! placeholder is drawn on its own line and erased in place, which only
//! works on an interactive terminal; when output is piped the placeholder is
//! never drawn and colours are dropped.

use std::io::{self, IsTerminal, Write};

use ratatui::crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Attribute, Color as CColor, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use ratatui::style::{Color, Modifier, Style};
use tracing::debug;

use crate::core::constants::PENDING_PLACEHOLDER;
use crate::core::message::Role;
use crate::core::surface::{MessageBody, Surface};
use crate::ui::theme::Theme;

fn to_crossterm_color(color: Color) -> CColor {
    match color {
        Color::Reset => CColor::Reset,
        Color::Black => CColor::Black,
        Color::Red => CColor::DarkRed,
        Color::Green => CColor::DarkGreen,
        Color::Yellow => CColor::DarkYellow,
        Color::Blue => CColor::DarkBlue,
        Color::Magenta => CColor::DarkMagenta,
        Color::Cyan => CColor::DarkCyan,
        Color::Gray => CColor::Grey,
        Color::DarkGray => CColor::DarkGrey,
        Color::LightRed => CColor::Red,
        Color::LightGreen => CColor::Green,
        Color::LightYellow => CColor::Yellow,
        Color::LightBlue => CColor::Blue,
        Color::LightMagenta => CColor::Magenta,
        Color::LightCyan => CColor::Cyan,
        Color::White => CColor::White,
        Color::Rgb(r, g, b) => CColor::Rgb { r, g, b },
        Color::Indexed(i) => CColor::AnsiValue(i),
    }
}

fn write_styled<W: Write>(out: &mut W, colored: bool, style: Style, text: &str) -> io::Result<()> {
    if !colored {
        return queue!(out, Print(text));
    }
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(to_crossterm_color(fg)))?;
    }
    if style.add_modifier.contains(Modifier::BOLD) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.add_modifier.contains(Modifier::ITALIC) {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)
}

pub struct TerminalSurface<W: Write> {
    out: W,
    theme: Theme,
    interactive: bool,
    // A message is on screen without its trailing newline yet.
    line_open: bool,
    pending_drawn: bool,
    current_role: Option<Role>,
    messages_shown: usize,
    // The cursor sits on a cleared line that already has a separator above.
    reuse_line: bool,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout(theme: Theme) -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self::new(out, theme, interactive)
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, theme: Theme, interactive: bool) -> Self {
        Self {
            out,
            theme,
            interactive,
            line_open: false,
            pending_drawn: false,
            current_role: None,
            messages_shown: 0,
            reuse_line: false,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Terminate the message currently on screen, if any.
    pub fn end_line(&mut self) {
        if self.line_open {
            let result = writeln!(self.out).and_then(|()| self.out.flush());
            self.report(result);
            self.line_open = false;
        }
    }

    /// Print the input prompt.
    pub fn prompt(&mut self, text: &str) {
        self.end_line();
        let result = write_styled(&mut self.out, self.interactive, self.theme.prompt_style, text)
            .and_then(|()| self.out.flush());
        self.report(result);
    }

    fn text_style(&self) -> Style {
        match self.current_role {
            Some(Role::User) => self.theme.user_text_style,
            _ => self.theme.model_text_style,
        }
    }

    fn report(&self, result: io::Result<()>) {
        if let Err(err) = result {
            debug!(error = %err, "terminal write failed");
        }
    }

    fn start_message(&mut self, role: Role) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        if self.messages_shown > 0 && !self.reuse_line {
            writeln!(self.out)?;
        }
        self.reuse_line = false;
        let prefix_style = match role {
            Role::User => self.theme.user_prefix_style,
            Role::Model => self.theme.model_prefix_style,
        };
        write_styled(&mut self.out, self.interactive, prefix_style, role.label())?;
        queue!(self.out, Print(" "))?;
        self.current_role = Some(role);
        self.line_open = true;
        self.messages_shown += 1;
        Ok(())
    }

    fn draw_pending(&mut self) -> io::Result<()> {
        self.start_message(Role::Model)?;
        write_styled(
            &mut self.out,
            self.interactive,
            self.theme.pending_indicator_style,
            PENDING_PLACEHOLDER,
        )?;
        self.pending_drawn = true;
        self.out.flush()
    }

    fn erase_pending(&mut self) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        self.reuse_line = true;
        self.pending_drawn = false;
        self.line_open = false;
        self.out.flush()
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn append_message(&mut self, role: Role, body: MessageBody) {
        let result = match body {
            MessageBody::Pending if self.interactive => self.draw_pending(),
            // Nothing to draw and nothing to erase later.
            MessageBody::Pending => Ok(()),
            MessageBody::Text(text) => self.start_message(role).and_then(|()| {
                let style = self.text_style();
                write_styled(&mut self.out, self.interactive, style, &text)?;
                self.out.flush()
            }),
        };
        self.report(result);
    }

    fn append_text(&mut self, delta: &str) {
        let style = self.text_style();
        let result = write_styled(&mut self.out, self.interactive, style, delta)
            .and_then(|()| self.out.flush());
        self.report(result);
    }

    fn remove_last(&mut self) {
        if self.pending_drawn {
            let result = self.erase_pending();
            self.report(result);
        }
    }

    fn notice(&mut self, text: &str) {
        self.end_line();
        let style = self.theme.notice_style;
        let result = write_styled(&mut self.out, self.interactive, style, text)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        self.report(result);
    }
}
