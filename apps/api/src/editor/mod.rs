//! In-place field editor: static text that turns into an input on a gesture and
//! commits a single save when the edit session ends.
//!
//! The editor keeps its own draft buffer; the document is only touched through the
//! `save` callback, once per session. Keystrokes never reach the document, so the
//! layout engine re-measures once per committed edit instead of once per key.

use serde::{Deserialize, Serialize};

/// Placeholder shown for an empty multiline field.
pub const MULTILINE_PLACEHOLDER: &str = "Cliquez pour ajouter du texte...";
/// Placeholder shown for an empty single-line field.
pub const INLINE_PLACEHOLDER: &str = "Saisir...";

/// Gesture that switches a field into editing mode. Chosen per template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Click,
    DoubleClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Display,
    Editing { draft: String },
}

/// What the field currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldView<'a> {
    Text(&'a str),
    Placeholder(&'static str),
    Input { draft: &'a str, multiline: bool },
}

#[derive(Debug, Clone)]
pub struct FieldEditor {
    value: String,
    multiline: bool,
    activation: Activation,
    mode: Mode,
}

impl FieldEditor {
    pub fn new(value: impl Into<String>, multiline: bool, activation: Activation) -> Self {
        Self {
            value: value.into(),
            multiline,
            activation,
            mode: Mode::Display,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing { .. })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Enters editing mode if `gesture` matches the configured activation.
    pub fn activate(&mut self, gesture: Activation) -> bool {
        if gesture != self.activation || self.is_editing() {
            return false;
        }
        self.mode = Mode::Editing {
            draft: self.value.clone(),
        };
        true
    }

    /// Replaces the draft buffer (one call per input event).
    pub fn input(&mut self, text: impl Into<String>) {
        if let Mode::Editing { draft } = &mut self.mode {
            *draft = text.into();
        }
    }

    /// Handles a key press. Enter commits single-line fields; Escape discards the draft.
    pub fn key(&mut self, key: Key, save: impl FnOnce(String)) {
        match key {
            Key::Enter if !self.multiline => self.commit(save),
            Key::Escape => self.mode = Mode::Display,
            _ => {}
        }
    }

    /// Focus lost: commits the draft.
    pub fn blur(&mut self, save: impl FnOnce(String)) {
        self.commit(save);
    }

    fn commit(&mut self, save: impl FnOnce(String)) {
        if let Mode::Editing { draft } = std::mem::replace(&mut self.mode, Mode::Display) {
            self.value = draft.clone();
            save(draft);
        }
    }

    pub fn view(&self) -> FieldView<'_> {
        match &self.mode {
            Mode::Editing { draft } => FieldView::Input {
                draft,
                multiline: self.multiline,
            },
            Mode::Display if self.value.is_empty() => FieldView::Placeholder(placeholder(self.multiline)),
            Mode::Display => FieldView::Text(&self.value),
        }
    }
}

pub fn placeholder(multiline: bool) -> &'static str {
    if multiline {
        MULTILINE_PLACEHOLDER
    } else {
        INLINE_PLACEHOLDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_save_per_session() {
        let mut editor = FieldEditor::new("Rust", false, Activation::Click);
        let mut saves = Vec::new();

        assert!(editor.activate(Activation::Click));
        editor.input("R");
        editor.input("Ru");
        editor.input("Rust, Go");
        editor.blur(|v| saves.push(v));
        // A second blur after commit is a no-op.
        editor.blur(|v| saves.push(v));

        assert_eq!(saves, vec!["Rust, Go".to_string()]);
        assert_eq!(editor.view(), FieldView::Text("Rust, Go"));
    }

    #[test]
    fn test_enter_commits_single_line_only() {
        let mut saves = Vec::new();

        let mut inline = FieldEditor::new("a", false, Activation::Click);
        inline.activate(Activation::Click);
        inline.input("b");
        inline.key(Key::Enter, |v| saves.push(v));
        assert!(!inline.is_editing());

        let mut multi = FieldEditor::new("a", true, Activation::Click);
        multi.activate(Activation::Click);
        multi.input("line 1\nline 2");
        multi.key(Key::Enter, |v| saves.push(v));
        assert!(multi.is_editing(), "Enter inserts a newline in multiline fields");

        assert_eq!(saves, vec!["b".to_string()]);
    }

    #[test]
    fn test_escape_discards_draft() {
        let mut editor = FieldEditor::new("kept", false, Activation::DoubleClick);
        let mut saved = false;
        editor.activate(Activation::DoubleClick);
        editor.input("discarded");
        editor.key(Key::Escape, |_| saved = true);
        assert!(!saved);
        assert_eq!(editor.value(), "kept");
    }

    #[test]
    fn test_wrong_gesture_does_not_activate() {
        let mut editor = FieldEditor::new("x", false, Activation::DoubleClick);
        assert!(!editor.activate(Activation::Click));
        assert!(!editor.is_editing());
    }

    #[test]
    fn test_empty_value_shows_placeholder_and_commits_empty() {
        let mut editor = FieldEditor::new("", true, Activation::Click);
        assert_eq!(editor.view(), FieldView::Placeholder(MULTILINE_PLACEHOLDER));

        let mut saves = Vec::new();
        editor.activate(Activation::Click);
        editor.blur(|v| saves.push(v));
        assert_eq!(saves, vec![String::new()], "empty strings are valid values");
    }
}
