//! # oxide-formbind
//!
//! Binds HTML form submissions to typed records and maps.
//!
//! This crate provides:
//! - Dotted-path access into nested records and maps (`Address.City`)
//! - Coercion of submitted text into integers, floats, booleans, dates
//!   and times
//! - Composable field validators
//! - Render data for templates, with pluggable widgets
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_formbind::{FieldDef, Form, FormValues, Record};
//! use oxide_formbind::validation::required;
//!
//! #[derive(Debug, Default, Record)]
//! struct Signup {
//!     name: String,
//!     age: i32,
//! }
//!
//! let mut data = Signup::default();
//! let mut form = Form::new(
//!     &mut data,
//!     [
//!         FieldDef::new("Name", "Your name").validator(required("Req!")),
//!         FieldDef::new("Age", "Your age").help_text("Years since your birth."),
//!     ],
//! )?;
//!
//! let values = FormValues::new().with("Name", "Foo").with("Age", "14");
//! assert!(form.fill(&values)?);
//!
//! let render = form.render_data();
//! assert_eq!(render.fields[1].input, r#"<input id="age" type="text" name="Age" value="14"/>"#);
//!
//! drop(form);
//! assert_eq!(data.age, 14);
//! # Ok::<(), oxide_formbind::FormError>(())
//! ```
//!
//! ## Maps
//!
//! Forms can also be bound to maps. Map keys match exactly, record fields
//! match ignoring case and underscores.
//!
//! ```rust
//! use std::collections::HashMap;
//! use oxide_formbind::{FieldDef, Form, FormValues};
//!
//! let mut data: HashMap<String, String> = HashMap::new();
//! data.insert("City".to_string(), String::new());
//!
//! let mut form = Form::new(&mut data, [FieldDef::new("City", "City")])?;
//! form.fill(&FormValues::new().with("City", "Berlin"))?;
//! drop(form);
//! assert_eq!(data["City"], "Berlin");
//! # Ok::<(), oxide_formbind::FormError>(())
//! ```
//!
//! ## Widgets
//!
//! Fields render as a text input unless a widget is set:
//! - `TextInput`, `PasswordInput`, `HiddenInput`, `Textarea`
//! - `Select`, `Checkbox`
//! - `DateInput`, `TimeInput`, `DateTimeInput`
//! - `FileInput`, which switches the form to multipart encoding

extern crate self as oxide_formbind;

pub mod accessor;
pub mod bind;
pub mod coercion;
mod error;
mod form;
pub mod validation;
pub mod value;
mod values;
pub mod widgets;

pub use bind::{Bindable, MapNode, Record};
pub use coercion::{BoolPolicy, CoercionConfig, Coercer};
pub use error::{CoercionError, FormError, ResolveError, Result, ValidationErrors};
pub use form::{FieldDef, FieldRenderData, Form, RenderData, MULTIPART_ENCTYPE};
pub use value::{Kind, Value};
pub use values::FormValues;

#[cfg(feature = "derive")]
pub use oxide_formbind_derive::Record;
