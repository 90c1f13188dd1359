//! Browser UI rendering.

use super::formatters::{check_box, format_number, format_param_change, truncate_to_width};
use super::keymap_bar::draw_keymap;
use super::status_bar::draw_status;
use super::ThemeColors;
use crate::app::{App, Pane};
use crate::configurable::{DataConfigurable, DataConfigurableDataSearch};
use crate::util::format_range;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Draw the browser UI.
pub(super) fn draw_browser(f: &mut Frame<'_>, app: &App) {
    let colors = ThemeColors::from_theme(&app.theme);

    // Header, content, status bar and key map bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0], &colors);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(chunks[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(content[2]);

    draw_facets(f, app, content[0], &colors);
    draw_distributions(f, app, content[1], &colors);
    draw_results(f, app, right[0], &colors);
    draw_parameters(f, app, right[1], &colors);

    draw_status(f, chunks[2], app, &colors);
    draw_keymap(
        f,
        chunks[3],
        app.focus,
        app.search.is_active() || app.input.is_some(),
        &colors,
    );
}

fn pane_block(title: String, focused: bool, colors: &ThemeColors) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            colors.focus_border
        } else {
            colors.border
        }))
        .style(Style::default().bg(colors.bg))
}

fn row_style(is_cursor: bool, colors: &ThemeColors) -> Style {
    if is_cursor {
        Style::default()
            .fg(colors.cursor_fg)
            .bg(colors.cursor_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text)
    }
}

fn draw_header(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let mut spans = Vec::new();
    for item in app.domains.items() {
        let active = app.active_domain.as_deref() == Some(item.id.as_str());
        let style = if active {
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.label)
        };
        spans.push(Span::styled(format!(" {} ", item.value), style));
    }

    let query = &app.search.query().text;
    if !query.is_empty() {
        spans.push(Span::styled(
            format!(" | search: {}", query),
            Style::default().fg(colors.value),
        ));
    }
    if let Some(bbox) = app.global_bbox {
        spans.push(Span::styled(
            format!(" | bbox: {}", bbox),
            Style::default().fg(colors.value),
        ));
    }
    if let Some(range) = app.global_range {
        spans.push(Span::styled(
            format!(" | time: {}", format_range(&range)),
            Style::default().fg(colors.value),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.bg));
    f.render_widget(paragraph, area);
}

fn draw_facets(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let focused = app.focus == Pane::Facets;
    let checklist = app.facets.checklist();
    let nodes = checklist.nodes();

    let items: Vec<ListItem<'_>> = app
        .facets
        .visible_rows()
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| {
            let node = &nodes[idx];
            let indent = "  ".repeat(node.level);
            let expand_icon = if node.expandable {
                if app.facets.is_expanded(idx) {
                    "▼ "
                } else {
                    "▶ "
                }
            } else {
                "  "
            };

            let text = format!(
                "{}{}{} {} ({})",
                indent,
                expand_icon,
                check_box(checklist.check_state(idx)),
                node.name,
                format_number(node.count)
            );

            ListItem::new(Line::from(text))
                .style(row_style(focused && pos == app.facets.cursor(), colors))
        })
        .collect();

    let title = format!(
        " {} ",
        app.active_domain_name().unwrap_or("Facets")
    );
    let list = List::new(items).block(pane_block(title, focused, colors));
    f.render_widget(list, area);
}

fn draw_distributions(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let focused = app.focus == Pane::Distributions;
    let visible = app.visible_distributions();
    let width = usize::from(area.width.saturating_sub(4));

    let items: Vec<ListItem<'_>> = visible
        .iter()
        .enumerate()
        .map(|(idx, summary)| {
            let marker = if app.results.get(&summary.id).is_some() {
                "● "
            } else {
                "  "
            };
            let text = format!("{}{}", marker, truncate_to_width(&summary.name, width));
            ListItem::new(Line::from(text))
                .style(row_style(focused && idx == app.distribution_cursor, colors))
        })
        .collect();

    let title = format!(" Distributions ({}) ", format_number(visible.len()));
    let list = List::new(items).block(pane_block(title, focused, colors));
    f.render_widget(list, area);
}

fn draw_results(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let focused = app.focus == Pane::Results;
    let rows = app.result_rows();

    let items: Vec<ListItem<'_>> = rows
        .iter()
        .enumerate()
        .map(|(idx, conf)| {
            let is_cursor = focused && idx == app.view_state.cursor;
            let (marker, marker_style) = result_marker(conf, colors);
            let line = Line::from(vec![
                Span::styled(marker, marker_style),
                Span::raw(conf.name().to_string()),
            ]);
            ListItem::new(line).style(row_style(is_cursor, colors))
        })
        .collect();

    let title = format!(" {} ({}) ", app.view.name(), rows.len());
    let list = List::new(items).block(pane_block(title, focused, colors));
    f.render_widget(list, area);
}

fn result_marker(conf: &DataConfigurable, colors: &ThemeColors) -> (&'static str, Style) {
    match conf {
        DataConfigurable::Loading(_) => ("… ", Style::default().fg(colors.warning)),
        DataConfigurable::Ready(ready) if ready.is_pinned() => {
            ("★ ", Style::default().fg(colors.accent))
        },
        DataConfigurable::Ready(ready) if ready.is_changed() => {
            ("* ", Style::default().fg(colors.warning))
        },
        DataConfigurable::Ready(_) => ("  ", Style::default()),
    }
}

fn draw_parameters(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let focused = app.focus == Pane::Parameters;
    let lines = match app.current_result() {
        Some(DataConfigurable::Ready(conf)) => {
            format_configurable(conf, focused.then_some(app.param_cursor), colors)
        },
        Some(DataConfigurable::Loading(_)) => vec![Line::from(Span::styled(
            "Loading details...",
            Style::default().fg(colors.warning),
        ))],
        None => vec![Line::from(Span::styled(
            "Select a distribution to configure it",
            Style::default().fg(colors.text),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(pane_block(" Details ".to_string(), focused, colors))
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn format_configurable(
    conf: &DataConfigurableDataSearch,
    cursor: Option<usize>,
    colors: &ThemeColors,
) -> Vec<Line<'static>> {
    let details = conf.details();
    let mut lines = vec![];

    // Header
    lines.push(Line::from(Span::styled(
        details.name.clone(),
        Style::default()
            .fg(colors.heading)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        conf.levels().join(" > "),
        Style::default().fg(colors.label),
    )));
    lines.push(Line::from(""));

    let on_off = |on: bool| if on { "ON" } else { "OFF" };
    lines.push(Line::from(vec![
        Span::styled("Map link: ", Style::default().fg(colors.label)),
        Span::styled(on_off(conf.is_spatial_linked()), Style::default().fg(colors.value)),
        Span::styled("  Time link: ", Style::default().fg(colors.label)),
        Span::styled(on_off(conf.is_temporal_linked()), Style::default().fg(colors.value)),
    ]));

    if let Some(ref provider) = details.provider {
        lines.push(Line::from(vec![
            Span::styled("Provider: ", Style::default().fg(colors.label)),
            Span::styled(provider.clone(), Style::default().fg(colors.value)),
        ]));
    }

    if conf.definitions().as_slice().is_empty() {
        return lines;
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Parameters:",
        Style::default()
            .fg(colors.heading)
            .add_modifier(Modifier::BOLD),
    )));

    for (idx, def) in conf.definitions().as_slice().iter().enumerate() {
        let current = conf.current_params().get(&def.name).unwrap_or_default();
        let staged = conf.new_params().get(&def.name).unwrap_or_default();
        let value_style = if current == staged {
            Style::default().fg(colors.value)
        } else {
            Style::default().fg(colors.warning)
        };
        let label_style = if cursor == Some(idx) {
            Style::default()
                .fg(colors.cursor_fg)
                .bg(colors.cursor_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.label)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", def.display_label()), label_style),
            Span::styled(format_param_change(current, staged), value_style),
        ]));
    }

    lines
}
