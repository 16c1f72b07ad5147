//! Rendering of [`FormState`].

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::form::{Focus, FormState, HitAreas, Severity};
use crate::theme::Theme;

const BUTTON_WIDTH: u16 = 12;
const BUTTON_SPACER: u16 = 2;
const SEPARATOR: &str = " │ ";

/// Draws the whole form into `area` and records hit areas for the mouse.
pub fn render(frame: &mut Frame, area: Rect, state: &mut FormState, theme: &dyn Theme) {
    let block = Block::bordered()
        .title(Span::styled(format!(" {} ", state.title()), theme.accent_emphasis_style()))
        .border_style(theme.border_style(false))
        .style(Style::default().bg(theme.roles().background));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [body, status, buttons, hints] = Layout::vertical([
        Constraint::Min(1),    // Fields
        Constraint::Length(1), // Status
        Constraint::Length(3), // Buttons
        Constraint::Length(1), // Hints
    ])
    .areas(inner);

    let mut hit_areas = HitAreas {
        body,
        ..HitAreas::default()
    };
    render_fields(frame, body, state, theme, &mut hit_areas);
    render_status(frame, status, state, theme);
    render_buttons(frame, buttons, state, theme, &mut hit_areas);
    frame.render_widget(Paragraph::new(hint_line(theme)), hints);
    state.hit_areas = hit_areas;
}

fn render_fields(frame: &mut Frame, area: Rect, state: &mut FormState, theme: &dyn Theme, hit_areas: &mut HitAreas) {
    let label_width = state.fields().iter().map(|field| field.name.width()).max().unwrap_or(0);
    let input_width = (area.width as usize).saturating_sub(label_width + SEPARATOR.width());

    let mut lines: Vec<Line> = Vec::new();
    let mut field_lines: Vec<(u16, usize)> = Vec::new();
    let mut cursor: Option<(u16, usize)> = None;
    for (position, group) in state.groups().iter().enumerate() {
        if position > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(group.label.clone(), theme.text_secondary_style())));
        for &index in &group.fields {
            let Some(field) = state.field(index) else {
                continue;
            };
            let focused = state.focus() == Focus::Field(index);
            let line_number = lines.len() as u16;
            let (visible, skipped) = visible_window(field.input.input(), field.input.cursor_column(), input_width);
            if focused {
                cursor = Some((line_number, field.input.cursor_column().saturating_sub(skipped)));
            }
            let label_style = if focused { theme.accent_emphasis_style() } else { theme.text_primary_style() };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>label_width$}", field.name), label_style),
                Span::styled(SEPARATOR, theme.border_style(focused)),
                Span::styled(visible, theme.text_primary_style()),
            ]));
            field_lines.push((line_number, index));
        }
    }

    let focused_line = cursor.map(|(line, _)| line);
    state.clamp_scroll(focused_line, area.height, lines.len() as u16);
    let scroll = state.scroll();
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);

    let visible_rows = scroll..scroll.saturating_add(area.height);
    hit_areas.fields = field_lines
        .into_iter()
        .filter(|(line, _)| visible_rows.contains(line))
        .map(|(line, index)| (Rect::new(area.x, area.y + line - scroll, area.width, 1), index))
        .collect();

    if let Some((line, column)) = cursor
        && visible_rows.contains(&line)
    {
        let x = area.x + (label_width + SEPARATOR.width() + column) as u16;
        frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y + line - scroll));
    }
}

fn render_status(frame: &mut Frame, area: Rect, state: &FormState, theme: &dyn Theme) {
    let line = match state.message() {
        Some((Severity::Error, message)) => Line::from(Span::styled(message.to_string(), theme.status_error())),
        Some((Severity::Info, message)) => Line::from(Span::styled(message.to_string(), theme.status_success())),
        None if state.fields().is_empty() => Line::from(Span::styled(
            "No parameters can be entered for this callable.",
            theme.text_muted_style(),
        )),
        None => Line::default(),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_buttons(frame: &mut Frame, area: Rect, state: &FormState, theme: &dyn Theme, hit_areas: &mut HitAreas) {
    let ok = Rect::new(area.x, area.y, BUTTON_WIDTH.min(area.width), area.height);
    let cancel_x = area.x.saturating_add(BUTTON_WIDTH + BUTTON_SPACER);
    let cancel = Rect::new(
        cancel_x,
        area.y,
        BUTTON_WIDTH.min(area.right().saturating_sub(cancel_x)),
        area.height,
    );
    for (rect, label, focused) in [(ok, "OK", state.focus() == Focus::Ok), (cancel, "Cancel", state.focus() == Focus::Cancel)] {
        let style = if focused { theme.selection_style() } else { theme.text_primary_style() };
        frame.render_widget(
            Paragraph::new(label)
                .centered()
                .block(Block::bordered().border_style(theme.border_style(focused)))
                .style(style),
            rect,
        );
    }
    hit_areas.ok = ok;
    hit_areas.cancel = cancel;
}

fn hint_line(theme: &dyn Theme) -> Line<'static> {
    let hints = [
        ("Tab/Shift+Tab", " focus  "),
        ("Enter", " confirm  "),
        ("Esc", " cancel"),
    ];
    Line::from(
        hints
            .into_iter()
            .flat_map(|(key, description)| {
                [
                    Span::styled(key, theme.accent_emphasis_style()),
                    Span::styled(description, theme.text_muted_style()),
                ]
            })
            .collect::<Vec<_>>(),
    )
}

/// The part of `text` shown in a field `width` columns wide, scrolled so the
/// cursor column stays visible. Returns the text and the number of columns
/// skipped on the left.
fn visible_window(text: &str, cursor_column: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), cursor_column);
    }
    let offset = (cursor_column + 1).saturating_sub(width);
    let mut skipped = 0;
    let mut characters = text.chars();
    while skipped < offset {
        match characters.next() {
            Some(character) => skipped += character.width().unwrap_or(0),
            None => break,
        }
    }
    let mut visible = String::new();
    let mut used = 0;
    for character in characters {
        let character_width = character.width().unwrap_or(0);
        if used + character_width > width {
            break;
        }
        used += character_width;
        visible.push(character);
    }
    (visible, skipped)
}
