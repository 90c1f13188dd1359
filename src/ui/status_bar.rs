//! Status bar UI component.

use crate::app::{App, InputTarget};
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the status bar.
pub(super) fn draw_status(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    let text = if app.search.is_active() {
        format!("/{}", app.search.buffer())
    } else if let Some(ref input) = app.input {
        let prompt = match input.target {
            InputTarget::Parameter(ref name) => name.as_str(),
            InputTarget::BoundingBox => "bbox (W,S,E,N)",
            InputTarget::TimeRange => "time (start/end)",
        };
        format!("{}: {}", prompt, input.buffer)
    } else {
        app.status.clone()
    };

    let paragraph =
        Paragraph::new(text).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    f.render_widget(paragraph, area);
}
