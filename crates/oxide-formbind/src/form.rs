//! Form definition, filling and rendering.
//!
//! A [`Form`] binds a list of [`FieldDef`]s to a record or map. Filling it
//! with submitted values coerces and stores each value at its dotted path,
//! then runs the field validators. [`Form::render_data`] produces a
//! snapshot that templates can turn into HTML.

use std::collections::HashSet;

use ironhtml::html;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::accessor;
use crate::bind::Bindable;
use crate::coercion::{CoercionConfig, Coercer};
use crate::error::{CoercionError, FormError, Result, ValidationErrors};
use crate::validation::Validator;
use crate::value::{Kind, Value};
use crate::values::FormValues;
use crate::widgets::{field_id, TextInput, Widget};

/// Value of [`RenderData::enctype_attr`] when a field uploads files.
pub const MULTIPART_ENCTYPE: &str = r#"enctype="multipart/form-data""#;

/// Definition of a form field.
pub struct FieldDef {
    /// Dotted path of the field, e.g. `Address.City`.
    pub name: String,
    /// Field label.
    pub label: String,
    /// Help text.
    pub help_text: String,
    /// Validator run after every fill.
    pub validator: Option<Box<dyn Validator>>,
    /// The widget to render; a text input if unset.
    pub widget: Option<Box<dyn Widget>>,
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("help_text", &self.help_text)
            .field("validator", &self.validator.is_some())
            .field("widget", &self.widget.as_ref().map(|w| w.input_type()))
            .finish()
    }
}

impl FieldDef {
    /// Creates a new field definition.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            help_text: String::new(),
            validator: None,
            widget: None,
        }
    }

    /// Sets help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Sets the widget.
    #[must_use]
    pub fn widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widget = Some(Box::new(widget));
        self
    }
}

/// Render data of a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldRenderData {
    /// Dotted path of the field.
    pub name: String,
    /// Field label.
    pub label: String,
    /// HTML of the label, e.g. `<label for="name">Your name</label>`.
    pub label_tag: String,
    /// HTML of the input, as produced by the widget.
    pub input: String,
    /// Help text.
    pub help: String,
    /// Errors of the field.
    pub errors: Vec<String>,
}

/// Render data of a whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderData {
    /// Fields in declaration order.
    pub fields: Vec<FieldRenderData>,
    /// Errors not attached to a field.
    pub errors: Vec<String>,
    /// [`MULTIPART_ENCTYPE`] if any widget uploads files, empty otherwise.
    pub enctype_attr: String,
    /// Target of the form.
    pub action: String,
}

/// A form bound to a record or map.
///
/// The form borrows the data mutably for its whole lifetime, so nothing
/// else can touch the data while a fill is in progress.
pub struct Form<'a, D: Bindable> {
    data: &'a mut D,
    fields: Vec<FieldDef>,
    errors: ValidationErrors,
    coercer: Coercer,
    action: String,
}

impl<D: Bindable> std::fmt::Debug for Form<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields)
            .field("errors", &self.errors)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl<'a, D: Bindable> Form<'a, D> {
    /// Creates a form with the default coercion config.
    ///
    /// # Errors
    ///
    /// See [`Form::with_config`].
    pub fn new(data: &'a mut D, fields: impl IntoIterator<Item = FieldDef>) -> Result<Self> {
        Self::with_config(data, fields, CoercionConfig::default())
    }

    /// Creates a form.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnsupportedContainer`] if the data is not a
    /// record or a map, [`FormError::DuplicateField`] if two fields share a
    /// name, and [`FormError::Resolve`] if a field path does not exist in
    /// the data.
    pub fn with_config(
        data: &'a mut D,
        fields: impl IntoIterator<Item = FieldDef>,
        config: CoercionConfig,
    ) -> Result<Self> {
        let shape = data.container().shape_name();
        if !matches!(shape, "record" | "map") {
            return Err(FormError::UnsupportedContainer(shape));
        }

        let fields: Vec<FieldDef> = fields.into_iter().collect();
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
            accessor::resolve(&*data, &field.name)?;
        }

        debug!(shape, fields = fields.len(), "Form created");
        Ok(Self {
            data,
            fields,
            errors: ValidationErrors::new(),
            coercer: Coercer::new(config),
            action: String::new(),
        })
    }

    /// Sets the target of the form.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Sets the target of the form.
    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
    }

    /// Returns the target of the form.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the bound data.
    pub fn data(&self) -> &D {
        &*self.data
    }

    /// Returns the bound data mutably.
    pub fn data_mut(&mut self) -> &mut D {
        &mut *self.data
    }

    /// Returns the field definitions.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Returns the coercer used for submitted values.
    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    /// Fills the data with submitted values and validates it.
    ///
    /// Previous errors are discarded. A value that cannot be coerced to
    /// its field's type becomes an error of that field and leaves the
    /// field unchanged. Submitted keys without a field are ignored.
    ///
    /// Returns `Ok(true)` if no field has errors afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Resolve`] if a field path no longer resolves,
    /// e.g. because an optional value on the way was cleared.
    pub fn fill(&mut self, values: &FormValues) -> Result<bool> {
        self.errors.clear();

        for (key, _) in values.iter() {
            if !self.fields.iter().any(|field| field.name == key) {
                trace!(key, "Ignoring submitted value without a field");
            }
        }

        let Self {
            data,
            fields,
            errors,
            coercer,
            ..
        } = self;
        for field in fields.iter() {
            if !values.contains_key(&field.name) {
                continue;
            }
            fill_field(
                &mut **data,
                coercer,
                errors,
                &field.name,
                values.get_all(&field.name),
            )?;
        }

        self.validate()
    }

    /// Reads every field and runs its validator, recording the messages.
    ///
    /// Fields that already failed coercion are not validated.
    fn validate(&mut self) -> Result<bool> {
        for field in &self.fields {
            let value = accessor::read(&*self.data, &field.name)?;
            let Some(validator) = &field.validator else {
                continue;
            };
            if self.errors.get(&field.name).is_some() {
                continue;
            }
            if let Err(messages) = validator.validate(&value) {
                trace!(field = %field.name, errors = messages.len(), "Field failed validation");
                self.errors.extend(&field.name, messages);
            }
        }
        Ok(self.errors.is_empty())
    }

    /// Adds an error to a field. An empty field name adds an error to the
    /// whole form.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Returns all errors.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns the errors of a field.
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the errors not attached to a field.
    pub fn form_errors(&self) -> &[String] {
        self.errors.form_errors()
    }

    /// Returns whether there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Builds the render data of the form.
    pub fn render_data(&self) -> RenderData {
        let mut render = RenderData {
            errors: self.form_errors().to_vec(),
            action: self.action.clone(),
            ..RenderData::default()
        };

        for field in &self.fields {
            let widget: &dyn Widget = field.widget.as_deref().unwrap_or(&TextInput);
            if widget.needs_multipart() {
                render.enctype_attr = MULTIPART_ENCTYPE.to_string();
            }

            let value = accessor::read(&*self.data, &field.name).unwrap_or_else(|err| {
                warn!(field = %field.name, error = %err, "Rendering field without a value");
                Value::String(String::new())
            });

            render.fields.push(FieldRenderData {
                name: field.name.clone(),
                label: field.label.clone(),
                label_tag: label_tag(&field.name, &field.label),
                input: widget.render(&field.name, &value),
                help: field.help_text.clone(),
                errors: self.field_errors(&field.name).to_vec(),
            });
        }

        render
    }
}

fn fill_field(
    data: &mut dyn Bindable,
    coercer: &Coercer,
    errors: &mut ValidationErrors,
    name: &str,
    submitted: &[String],
) -> Result<()> {
    let kind = accessor::resolve(data, name)?.kind();
    debug!(field = name, kind = kind.name(), values = submitted.len(), "Filling field");

    if let Kind::List(element) = &kind {
        let mut items = Vec::with_capacity(submitted.len());
        for source in submitted {
            match coercer.coerce(source, element) {
                Ok(item) => items.push(item),
                Err(err) => {
                    reject(coercer, errors, name, &err);
                    return Ok(());
                }
            }
        }
        return store(data, coercer, errors, name, Value::List(items));
    }

    for source in submitted {
        match coercer.coerce(source, &kind) {
            Ok(value) => store(data, coercer, errors, name, value)?,
            Err(err) => reject(coercer, errors, name, &err),
        }
    }
    Ok(())
}

fn store(
    data: &mut dyn Bindable,
    coercer: &Coercer,
    errors: &mut ValidationErrors,
    name: &str,
    value: Value,
) -> Result<()> {
    match accessor::write(data, name, value) {
        Err(FormError::Coercion { source, .. }) => {
            reject(coercer, errors, name, &source);
            Ok(())
        }
        other => other,
    }
}

fn reject(coercer: &Coercer, errors: &mut ValidationErrors, name: &str, error: &CoercionError) {
    warn!(field = name, error = %error, "Submitted value rejected");
    errors.add(name, coercer.message_for(error));
}

fn label_tag(name: &str, label: &str) -> String {
    let id = field_id(name);
    html! {
        label.for_(#id) { #label }
    }
    .render()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::validation::required;
    use crate::widgets::FileInput;

    fn profile() -> HashMap<String, Value> {
        let mut data = HashMap::new();
        data.insert("Name".to_string(), Value::from(""));
        data.insert("Age".to_string(), Value::Int(0));
        data
    }

    #[test]
    fn test_field_def_builder() {
        let field = FieldDef::new("Name", "Your name")
            .help_text("Your full name")
            .validator(required("Req!"));

        assert_eq!(field.name, "Name");
        assert_eq!(field.label, "Your name");
        assert_eq!(field.help_text, "Your full name");
        assert!(field.validator.is_some());
        assert!(field.widget.is_none());
    }

    #[test]
    fn test_rejects_scalar_root() {
        let mut data = 5_i64;
        let err = Form::new(&mut data, Vec::new()).unwrap_err();
        assert!(matches!(err, FormError::UnsupportedContainer("scalar")));
    }

    #[test]
    fn test_rejects_duplicate_field() {
        let mut data = profile();
        let err = Form::new(
            &mut data,
            [FieldDef::new("Name", "A"), FieldDef::new("Name", "B")],
        )
        .unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(ref name) if name == "Name"));
    }

    #[test]
    fn test_rejects_unknown_path() {
        let mut data = profile();
        let err = Form::new(&mut data, [FieldDef::new("Email", "Email")]).unwrap_err();
        assert!(matches!(err, FormError::Resolve(_)));
    }

    #[test]
    fn test_fill_map_keeps_dynamic_kind() {
        let mut data = profile();
        let mut form = Form::new(
            &mut data,
            [FieldDef::new("Name", "Name"), FieldDef::new("Age", "Age")],
        )
        .unwrap();

        let values = FormValues::new().with("Name", "Foo").with("Age", "14");
        assert!(form.fill(&values).unwrap());
        assert_eq!(data.get("Name"), Some(&Value::from("Foo")));
        assert_eq!(data.get("Age"), Some(&Value::Int(14)));
    }

    #[test]
    fn test_add_error_reaches_render_data() {
        let mut data = profile();
        let mut form = Form::new(&mut data, [FieldDef::new("Name", "Name")]).unwrap();
        form.add_error("", "Username taken.");
        form.add_error("Name", "Too short.");

        assert!(!form.is_valid());
        let render = form.render_data();
        assert_eq!(render.errors, vec!["Username taken.".to_string()]);
        assert_eq!(render.fields[0].errors, vec!["Too short.".to_string()]);
    }

    #[test]
    fn test_enctype_and_action() {
        let mut data = profile();
        let form = Form::new(&mut data, [FieldDef::new("Name", "Name")])
            .unwrap()
            .with_action("/save");
        let render = form.render_data();
        assert_eq!(render.enctype_attr, "");
        assert_eq!(render.action, "/save");

        let mut data = profile();
        let form = Form::new(
            &mut data,
            [FieldDef::new("Name", "Upload").widget(FileInput)],
        )
        .unwrap();
        assert_eq!(form.render_data().enctype_attr, MULTIPART_ENCTYPE);
    }

    #[test]
    fn test_label_tag() {
        assert_eq!(
            label_tag("Extra.Field", "Extra"),
            r#"<label for="extra_field">Extra</label>"#
        );
        assert_eq!(label_tag("Name", "Your name"), r#"<label for="name">Your name</label>"#);
    }

    #[test]
    fn test_custom_invalid_message() {
        let mut data: HashMap<String, i32> = HashMap::new();
        data.insert("Age".to_string(), 3);
        let mut form = Form::with_config(
            &mut data,
            [FieldDef::new("Age", "Age")],
            CoercionConfig::new().invalid_value_message("Please check this value."),
        )
        .unwrap();

        assert!(!form.fill(&FormValues::new().with("Age", "x")).unwrap());
        assert_eq!(form.field_errors("Age"), ["Please check this value."]);
        assert_eq!(data.get("Age"), Some(&3));
    }
}
