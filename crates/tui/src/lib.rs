//! # Garg TUI Library
//!
//! This library renders an argument form in the terminal. It implements the
//! engine's form contract with the Ratatui framework, so an
//! [`ArgumentBinder`](garg_engine::ArgumentBinder) can drive it exactly like
//! any other form.
//!
//! ## Key Features
//!
//! - One titled section per parameter group, one text field per parameter
//! - Keyboard focus cycling between fields and the OK/Cancel buttons
//! - Mouse support for focusing fields and pressing buttons
//! - Confirm errors shown in a status line while the form stays open
//!
//! ## Architecture
//!
//! - **`form`**: Focus, editing and hit-testing state ([`FormState`])
//! - **`view`**: Stateless rendering of that state
//! - **`runtime`**: Terminal lifecycle and the blocking event loop
//! - **`theme`** and **`text_input`**: Styling and single-line editing

pub mod form;
pub mod runtime;
pub mod text_input;
pub mod theme;
pub mod view;

use anyhow::Result;
use garg_engine::{FormCallbacks, FormSurface, GroupHandle, InteractiveForm};

pub use form::{Focus, FormAction, FormState, Severity};
pub use theme::{DraculaTheme, Theme};

/// A form that runs full screen in the current terminal.
#[derive(Debug)]
pub struct TerminalForm {
    state: FormState,
    theme: DraculaTheme,
}

impl TerminalForm {
    /// Creates an empty form; `title` is shown in the outer border.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            state: FormState::new(title),
            theme: DraculaTheme::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }
}

impl FormSurface for TerminalForm {
    fn create_group(&mut self, label: &str) -> GroupHandle {
        self.state.create_group(label)
    }

    fn create_field(&mut self, group: GroupHandle, name: &str, initial_text: &str) {
        self.state.create_field(group, name, initial_text);
    }

    fn field_text(&self, name: &str) -> Option<String> {
        self.state.field_text(name)
    }
}

impl InteractiveForm for TerminalForm {
    fn run(&mut self, callbacks: &mut dyn FormCallbacks) -> Result<()> {
        runtime::run_form(&mut self.state, &self.theme, callbacks)
    }
}
