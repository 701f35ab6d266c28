//! Selection widgets.

use super::{field_id, html_escape, Widget};
use crate::value::Value;

/// A dropdown selection.
///
/// The option whose value equals the field's current value is marked as
/// selected. For list values every contained option is selected.
#[derive(Debug, Clone, Default)]
pub struct Select {
    /// The choices as (value, label) pairs.
    pub choices: Vec<(String, String)>,
    /// Whether multiple options may be selected.
    pub multiple: bool,
}

impl Select {
    /// Creates a new select with the given choices.
    pub fn new<V, L>(choices: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            multiple: false,
        }
    }

    /// Allows several options to be selected.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    fn is_selected(value: &Value, option: &str) -> bool {
        match value {
            Value::Null => false,
            Value::List(items) => items.iter().any(|item| item.to_string() == option),
            other => other.to_string() == option,
        }
    }
}

impl Widget for Select {
    fn render(&self, name: &str, value: &Value) -> String {
        let options: String = self
            .choices
            .iter()
            .map(|(opt_value, label)| {
                let selected_attr = if Self::is_selected(value, opt_value) {
                    " selected"
                } else {
                    ""
                };
                format!(
                    "<option value=\"{}\"{selected_attr}>{}</option>\n",
                    html_escape(opt_value),
                    html_escape(label)
                )
            })
            .collect();
        let multiple_attr = if self.multiple { " multiple" } else { "" };
        format!(
            "<select id=\"{}\" name=\"{}\"{multiple_attr}>\n{options}</select>",
            field_id(name),
            html_escape(name)
        )
    }

    fn input_type(&self) -> &str {
        "select"
    }
}

/// A checkbox for boolean fields.
///
/// Browsers only submit checked boxes, which matches the presence
/// semantics of boolean coercion.
#[derive(Debug, Clone, Default)]
pub struct Checkbox;

impl Widget for Checkbox {
    fn render(&self, name: &str, value: &Value) -> String {
        let checked = if value.is_zero() { "" } else { " checked" };
        format!(
            r#"<input id="{}" type="checkbox" name="{}" value="on"{checked}/>"#,
            field_id(name),
            html_escape(name)
        )
    }

    fn input_type(&self) -> &str {
        "checkbox"
    }
}
