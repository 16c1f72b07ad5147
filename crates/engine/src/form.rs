//! The form contract the binder drives, and an in-memory implementation.
//!
//! A form surface owns the field text. The binder only declares groups and
//! fields, reads text back by parameter name, and receives the confirm and
//! cancel callbacks.

use anyhow::Result;
use indexmap::IndexMap;
use tracing::debug;

/// Opaque reference to a group created on a form surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(usize);

impl GroupHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Presentation-agnostic form the binder populates.
pub trait FormSurface {
    fn create_group(&mut self, label: &str) -> GroupHandle;

    /// Adds a text field named after a parameter, pre-filled with `initial_text`.
    fn create_field(&mut self, group: GroupHandle, name: &str, initial_text: &str);

    /// Current text of a field, or `None` when no such field exists.
    fn field_text(&self, name: &str) -> Option<String>;
}

/// What the form should do after a confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmDecision {
    Close,
    /// Keep the form open and show `message` so the user can correct it.
    KeepOpen { message: String },
}

/// Callbacks a form invokes when the user confirms or cancels.
pub trait FormCallbacks {
    fn on_confirm(&mut self, form: &dyn FormSurface) -> ConfirmDecision;

    fn on_cancel(&mut self);
}

/// A form surface that can run a user interaction to completion.
pub trait InteractiveForm: FormSurface {
    /// Blocks until the user confirms (and the callbacks close the form) or
    /// cancels.
    fn run(&mut self, callbacks: &mut dyn FormCallbacks) -> Result<()>;
}

/// A group as recorded by [`MemoryForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormGroup {
    pub label: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
struct MemoryField {
    group: GroupHandle,
    initial_text: String,
    text: String,
}

/// In-memory form for headless runs and tests.
///
/// `run` confirms once with whatever text the fields hold.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    groups: Vec<FormGroup>,
    fields: IndexMap<String, MemoryField>,
    closed: bool,
    message: Option<String>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[FormGroup] {
        &self.groups
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn group_of(&self, name: &str) -> Option<GroupHandle> {
        self.fields.get(name).map(|field| field.group)
    }

    pub fn initial_text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|field| field.initial_text.as_str())
    }

    /// Replaces a field's text. Returns false when the field does not exist.
    pub fn set_text(&mut self, name: &str, text: impl Into<String>) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn confirm(&mut self, callbacks: &mut dyn FormCallbacks) -> ConfirmDecision {
        let decision = callbacks.on_confirm(&*self);
        match &decision {
            ConfirmDecision::Close => {
                self.closed = true;
                self.message = None;
            }
            ConfirmDecision::KeepOpen { message } => self.message = Some(message.clone()),
        }
        decision
    }

    pub fn cancel(&mut self, callbacks: &mut dyn FormCallbacks) {
        callbacks.on_cancel();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Message from the last confirm that kept the form open.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl FormSurface for MemoryForm {
    fn create_group(&mut self, label: &str) -> GroupHandle {
        self.groups.push(FormGroup {
            label: label.to_string(),
            fields: Vec::new(),
        });
        GroupHandle(self.groups.len() - 1)
    }

    fn create_field(&mut self, group: GroupHandle, name: &str, initial_text: &str) {
        if let Some(entry) = self.groups.get_mut(group.0) {
            entry.fields.push(name.to_string());
        }
        self.fields.insert(
            name.to_string(),
            MemoryField {
                group,
                initial_text: initial_text.to_string(),
                text: initial_text.to_string(),
            },
        );
    }

    fn field_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|field| field.text.clone())
    }
}

impl InteractiveForm for MemoryForm {
    fn run(&mut self, callbacks: &mut dyn FormCallbacks) -> Result<()> {
        let decision = self.confirm(callbacks);
        debug!(?decision, "memory form confirmed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Option<String>>,
        cancelled: bool,
        keep_open: bool,
    }

    impl FormCallbacks for Recorder {
        fn on_confirm(&mut self, form: &dyn FormSurface) -> ConfirmDecision {
            self.seen.push(form.field_text("a"));
            if self.keep_open {
                ConfirmDecision::KeepOpen { message: "try again".into() }
            } else {
                ConfirmDecision::Close
            }
        }

        fn on_cancel(&mut self) {
            self.cancelled = true;
        }
    }

    #[test]
    fn records_groups_and_fields() {
        let mut form = MemoryForm::new();
        let group = form.create_group("POSITIONAL_OR_KEYWORD");
        form.create_field(group, "a", "");
        form.create_field(group, "b", "'test'");

        assert_eq!(form.groups().len(), 1);
        assert_eq!(form.groups()[0].fields, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(form.group_of("b"), Some(group));
        assert_eq!(form.initial_text("b"), Some("'test'"));
        assert_eq!(form.field_text("missing"), None);
    }

    #[test]
    fn confirm_reads_current_text_and_applies_the_decision() {
        let mut form = MemoryForm::new();
        let group = form.create_group("G");
        form.create_field(group, "a", "1");
        assert!(form.set_text("a", "2"));
        assert!(!form.set_text("zzz", "2"));

        let mut recorder = Recorder {
            keep_open: true,
            ..Recorder::default()
        };
        form.confirm(&mut recorder);
        assert!(!form.is_closed());
        assert_eq!(form.message(), Some("try again"));

        recorder.keep_open = false;
        form.run(&mut recorder).unwrap();
        assert!(form.is_closed());
        assert_eq!(form.message(), None);
        assert_eq!(recorder.seen, vec![Some("2".to_string()), Some("2".to_string())]);
    }

    #[test]
    fn cancel_closes_the_form() {
        let mut form = MemoryForm::new();
        let mut recorder = Recorder::default();
        form.cancel(&mut recorder);
        assert!(recorder.cancelled);
        assert!(form.is_closed());
    }
}
