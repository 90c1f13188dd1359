//! Keymap help bar UI component.

use crate::app::Pane;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the keymap help bar.
pub(super) fn draw_keymap(
    f: &mut Frame<'_>,
    area: Rect,
    focus: Pane,
    editing: bool,
    colors: &ThemeColors,
) {
    let keymap_text = if editing {
        "Enter:confirm | Esc:cancel | Type to edit"
    } else {
        match focus {
            Pane::Facets => "q:quit | Tab:pane | jk:nav | hl:fold | Space:check | x:clear | []:domain | /:search",
            Pane::Distributions => "q:quit | Tab:pane | jk:nav | Enter:select | b/d:bbox/time | c:copy tree | /:search",
            Pane::Results => "q:quit | Tab:pane | jk:nav | p:pin | f:favourites | Del:remove | u:copy URL | y:copy info",
            Pane::Parameters => "q:quit | Tab:pane | jk:nav | Enter:edit | a:apply | r:reset | m/t:link map/time",
        }
    };

    let paragraph =
        Paragraph::new(keymap_text).style(Style::default().fg(colors.text).bg(colors.bg));

    f.render_widget(paragraph, area);
}
