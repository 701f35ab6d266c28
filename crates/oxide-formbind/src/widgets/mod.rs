//! Form widgets for rendering HTML inputs.
//!
//! A widget turns a field name and its current value into an HTML
//! fragment. The form falls back to [`TextInput`] when a field has none.

mod choice;
mod temporal;

pub use choice::{Checkbox, Select};
pub use temporal::{DateInput, DateTimeInput, TimeInput};

use crate::value::Value;

/// Trait for form widgets that render HTML inputs.
pub trait Widget: Send + Sync {
    /// Renders the widget as HTML.
    ///
    /// # Arguments
    /// * `name` - The field name (used for the name attribute)
    /// * `value` - The field's current value
    fn render(&self, name: &str, value: &Value) -> String;

    /// Returns the HTML input type.
    fn input_type(&self) -> &str {
        "text"
    }

    /// Returns whether the enclosing form must be sent as
    /// `multipart/form-data`.
    fn needs_multipart(&self) -> bool {
        false
    }
}

/// Returns the HTML id used for a field's input and label.
pub fn field_id(name: &str) -> String {
    name.to_lowercase().replace('.', "_")
}

/// A plain text input widget.
#[derive(Debug, Clone, Default)]
pub struct TextInput;

impl Widget for TextInput {
    fn render(&self, name: &str, value: &Value) -> String {
        input_tag("text", name, Some(value))
    }
}

/// A hidden input widget.
#[derive(Debug, Clone, Default)]
pub struct HiddenInput;

impl Widget for HiddenInput {
    fn render(&self, name: &str, value: &Value) -> String {
        input_tag("hidden", name, Some(value))
    }

    fn input_type(&self) -> &str {
        "hidden"
    }
}

/// A password input. The current value is never sent back to the browser.
#[derive(Debug, Clone, Default)]
pub struct PasswordInput;

impl Widget for PasswordInput {
    fn render(&self, name: &str, _value: &Value) -> String {
        input_tag("password", name, None)
    }

    fn input_type(&self) -> &str {
        "password"
    }
}

/// A file upload input.
#[derive(Debug, Clone, Default)]
pub struct FileInput;

impl Widget for FileInput {
    fn render(&self, name: &str, _value: &Value) -> String {
        input_tag("file", name, None)
    }

    fn input_type(&self) -> &str {
        "file"
    }

    fn needs_multipart(&self) -> bool {
        true
    }
}

/// A textarea widget.
#[derive(Debug, Clone)]
pub struct Textarea {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Extra CSS class, e.g. for a rich text editor.
    pub class: Option<String>,
}

impl Default for Textarea {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 40,
            class: None,
        }
    }
}

impl Textarea {
    /// Creates a textarea with the default size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of rows.
    #[must_use]
    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Sets a CSS class.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl Widget for Textarea {
    fn render(&self, name: &str, value: &Value) -> String {
        let class_attr = self
            .class
            .as_ref()
            .map(|c| format!(r#" class="{}""#, html_escape(c)))
            .unwrap_or_default();
        format!(
            r#"<textarea{class_attr} id="{}" name="{}" rows="{}" cols="{}">{}</textarea>"#,
            field_id(name),
            html_escape(name),
            self.rows,
            self.cols,
            html_escape(&value.to_string())
        )
    }

    fn input_type(&self) -> &str {
        "textarea"
    }
}

/// Renders an `<input/>` tag, with a value attribute if one is given.
pub(crate) fn input_tag(input_type: &str, name: &str, value: Option<&Value>) -> String {
    let value_attr = value
        .map(|v| format!(r#" value="{}""#, html_escape(&v.to_string())))
        .unwrap_or_default();
    format!(
        r#"<input id="{}" type="{input_type}" name="{}"{value_attr}/>"#,
        field_id(name),
        html_escape(name)
    )
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
