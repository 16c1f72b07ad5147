//! Form state: groups, fields, focus, and key handling.
//!
//! `FormState` is the terminal form's model. It implements [`FormSurface`]
//! so the binder can populate it, and turns key and mouse events into
//! [`FormAction`]s for the runtime.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use garg_engine::{FormSurface, GroupHandle};

use crate::text_input::TextInputState;

/// What the runtime should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Confirm,
    Cancel,
}

/// Focus target inside the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Index into the field list.
    Field(usize),
    Ok,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct GroupState {
    pub label: String,
    pub fields: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct FieldState {
    pub name: String,
    pub group: GroupHandle,
    pub input: TextInputState,
}

/// Kind of status line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Screen areas recorded while rendering, used for mouse hits.
#[derive(Debug, Clone, Default)]
pub(crate) struct HitAreas {
    pub fields: Vec<(Rect, usize)>,
    pub ok: Rect,
    pub cancel: Rect,
    pub body: Rect,
}

#[derive(Debug, Clone)]
pub struct FormState {
    title: String,
    groups: Vec<GroupState>,
    fields: Vec<FieldState>,
    focus: Focus,
    message: Option<(Severity, String)>,
    scroll: u16,
    pub(crate) hit_areas: HitAreas,
}

impl FormState {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            groups: Vec::new(),
            fields: Vec::new(),
            focus: Focus::Ok,
            message: None,
            scroll: 0,
            hit_areas: HitAreas::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn groups(&self) -> &[GroupState] {
        &self.groups
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldState> {
        self.fields.get(index)
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn message(&self) -> Option<(Severity, &str)> {
        self.message.as_ref().map(|(severity, text)| (*severity, text.as_str()))
    }

    pub fn set_message(&mut self, severity: Severity, message: impl Into<String>) {
        self.message = Some((severity, message.into()));
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Field indices in display order: groups in creation order, fields in
    /// insertion order within each group.
    pub fn display_order(&self) -> Vec<usize> {
        self.groups.iter().flat_map(|group| group.fields.iter().copied()).collect()
    }

    /// Focus ring: every field in display order, then OK, then Cancel.
    fn focus_ring(&self) -> Vec<Focus> {
        let mut ring: Vec<Focus> = self.display_order().into_iter().map(Focus::Field).collect();
        ring.push(Focus::Ok);
        ring.push(Focus::Cancel);
        ring
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(-1);
    }

    fn step_focus(&mut self, delta: isize) {
        let ring = self.focus_ring();
        let current = ring.iter().position(|focus| *focus == self.focus).unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(ring.len() as isize) as usize;
        self.focus = ring[next];
    }

    fn focused_input(&mut self) -> Option<&mut TextInputState> {
        match self.focus {
            Focus::Field(index) => self.fields.get_mut(index).map(|field| &mut field.input),
            Focus::Ok | Focus::Cancel => None,
        }
    }

    /// Applies a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => FormAction::Cancel,
                KeyCode::Char('a') => self.edit(TextInputState::move_home),
                KeyCode::Char('e') => self.edit(TextInputState::move_end),
                KeyCode::Char('u') => self.edit(TextInputState::clear_to_start),
                _ => FormAction::None,
            };
        }

        match key.code {
            KeyCode::Esc => FormAction::Cancel,
            KeyCode::Enter => match self.focus {
                Focus::Cancel => FormAction::Cancel,
                Focus::Field(_) | Focus::Ok => FormAction::Confirm,
            },
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                FormAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                FormAction::None
            }
            KeyCode::Left | KeyCode::Right if !matches!(self.focus, Focus::Field(_)) => {
                self.focus = if self.focus == Focus::Ok { Focus::Cancel } else { Focus::Ok };
                FormAction::None
            }
            KeyCode::Left => self.edit(TextInputState::move_left),
            KeyCode::Right => self.edit(TextInputState::move_right),
            KeyCode::Home => self.edit(TextInputState::move_home),
            KeyCode::End => self.edit(TextInputState::move_end),
            KeyCode::Backspace => self.edit(TextInputState::backspace),
            KeyCode::Delete => self.edit(TextInputState::delete),
            KeyCode::Char(character) => self.edit(|input| input.insert_char(character)),
            _ => FormAction::None,
        }
    }

    fn edit(&mut self, operation: impl FnOnce(&mut TextInputState)) -> FormAction {
        if let Some(input) = self.focused_input() {
            operation(input);
        }
        FormAction::None
    }

    /// Applies a mouse event against the areas of the last render.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> FormAction {
        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.hit_areas.ok.contains(position) {
                    self.focus = Focus::Ok;
                    return FormAction::Confirm;
                }
                if self.hit_areas.cancel.contains(position) {
                    self.focus = Focus::Cancel;
                    return FormAction::Cancel;
                }
                if let Some((_, index)) = self.hit_areas.fields.iter().find(|(area, _)| area.contains(position)) {
                    self.focus = Focus::Field(*index);
                }
                FormAction::None
            }
            MouseEventKind::ScrollDown if self.hit_areas.body.contains(position) => {
                self.scroll = self.scroll.saturating_add(1);
                FormAction::None
            }
            MouseEventKind::ScrollUp if self.hit_areas.body.contains(position) => {
                self.scroll = self.scroll.saturating_sub(1);
                FormAction::None
            }
            _ => FormAction::None,
        }
    }

    /// Adjusts the scroll offset so the focused field's line is visible in a
    /// body of `height` rows whose content is `content_height` rows tall.
    pub(crate) fn clamp_scroll(&mut self, focused_line: Option<u16>, height: u16, content_height: u16) {
        if let Some(line) = focused_line
            && height > 0
        {
            if line < self.scroll {
                // Keep the group heading above the first field visible.
                self.scroll = line.saturating_sub(1);
            } else if line >= self.scroll + height {
                self.scroll = line + 1 - height;
            }
        }
        self.scroll = self.scroll.min(content_height.saturating_sub(height));
    }
}

impl FormSurface for FormState {
    fn create_group(&mut self, label: &str) -> GroupHandle {
        self.groups.push(GroupState {
            label: label.to_string(),
            fields: Vec::new(),
        });
        GroupHandle::new(self.groups.len() - 1)
    }

    fn create_field(&mut self, group: GroupHandle, name: &str, initial_text: &str) {
        let index = self.fields.len();
        if let Some(entry) = self.groups.get_mut(group.index()) {
            entry.fields.push(index);
        }
        self.fields.push(FieldState {
            name: name.to_string(),
            group,
            input: TextInputState::with_text(initial_text),
        });
        if self.focus == Focus::Ok && index == 0 {
            self.focus = Focus::Field(index);
        }
    }

    fn field_text(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.input.input().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn populated() -> FormState {
        let mut state = FormState::new("f");
        let group = state.create_group("POSITIONAL_OR_KEYWORD");
        state.create_field(group, "a", "");
        state.create_field(group, "b", "'test'");
        let group = state.create_group("KEYWORD_ONLY");
        state.create_field(group, "c", "3");
        state
    }

    #[test]
    fn first_field_takes_focus() {
        let state = populated();
        assert_eq!(state.focus(), Focus::Field(0));
        assert_eq!(state.display_order(), vec![0, 1, 2]);
        assert_eq!(state.field_text("b").as_deref(), Some("'test'"));
        assert_eq!(state.field_text("zzz"), None);
    }

    #[test]
    fn tab_cycles_through_fields_and_buttons() {
        let mut state = populated();
        let mut seen = Vec::new();
        for _ in 0..5 {
            state.handle_key(key(KeyCode::Tab));
            seen.push(state.focus());
        }
        assert_eq!(
            seen,
            vec![Focus::Field(1), Focus::Field(2), Focus::Ok, Focus::Cancel, Focus::Field(0)]
        );
        state.handle_key(key(KeyCode::BackTab));
        assert_eq!(state.focus(), Focus::Cancel);
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut state = populated();
        for character in "[1, 2]".chars() {
            state.handle_key(key(KeyCode::Char(character)));
        }
        state.handle_key(key(KeyCode::Backspace));
        state.handle_key(key(KeyCode::Home));
        state.handle_key(key(KeyCode::Delete));
        assert_eq!(state.field_text("a").as_deref(), Some("1, 2"));

        state.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(state.field_text("a").as_deref(), Some("1, 2"));
        state.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL));
        state.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(state.field_text("a").as_deref(), Some(""));
    }

    #[test]
    fn enter_and_escape_map_to_actions() {
        let mut state = populated();
        assert_eq!(state.handle_key(key(KeyCode::Enter)), FormAction::Confirm);
        state.handle_key(key(KeyCode::BackTab));
        assert_eq!(state.focus(), Focus::Cancel);
        assert_eq!(state.handle_key(key(KeyCode::Enter)), FormAction::Cancel);
        assert_eq!(state.handle_key(key(KeyCode::Esc)), FormAction::Cancel);
        let mut press = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        press.kind = KeyEventKind::Press;
        assert_eq!(state.handle_key(press), FormAction::Cancel);
    }

    #[test]
    fn arrows_switch_buttons() {
        let mut state = populated();
        state.handle_key(key(KeyCode::Up));
        state.handle_key(key(KeyCode::Up));
        assert_eq!(state.focus(), Focus::Ok);
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.focus(), Focus::Cancel);
        state.handle_key(key(KeyCode::Left));
        assert_eq!(state.focus(), Focus::Ok);
    }

    #[test]
    fn empty_form_focuses_ok() {
        let mut state = FormState::new("noop");
        assert_eq!(state.focus(), Focus::Ok);
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focus(), Focus::Cancel);
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focus(), Focus::Ok);
    }

    #[test]
    fn scroll_follows_the_focused_line() {
        let mut state = populated();
        state.clamp_scroll(Some(10), 4, 20);
        assert_eq!(state.scroll(), 7);
        state.clamp_scroll(Some(3), 4, 20);
        assert_eq!(state.scroll(), 2);
        state.clamp_scroll(None, 4, 3);
        assert_eq!(state.scroll(), 0);
    }
}
