//! The `Bindable` capability and its implementations.
//!
//! Every node of a form's data tree implements [`Bindable`]. Leaves report
//! a [`Kind`] for coercion and accept [`Value`]s; records and maps expose
//! themselves through [`Container`] so dotted paths can descend into them.
//!
//! Structs get the record capability from `#[derive(Record)]`:
//!
//! ```rust
//! use oxide_formbind::{Bindable, Record, Value};
//!
//! #[derive(Default, Record)]
//! struct Signup {
//!     name: String,
//!     age: i32,
//! }
//!
//! let mut signup = Signup::default();
//! let age = signup.field_mut("age").unwrap();
//! age.assign(Value::Int(14)).unwrap();
//! assert_eq!(signup.age, 14);
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::CoercionError;
use crate::value::{Kind, Value};

/// A type that can be a node in a form's data tree.
pub trait Bindable {
    /// Returns the coercion tag of this slot.
    fn kind(&self) -> Kind;

    /// Returns the current value.
    fn to_value(&self) -> Value;

    /// Replaces the current value.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] if the value does not fit the slot.
    fn assign(&mut self, value: Value) -> Result<(), CoercionError>;

    /// Returns the record-or-map view of this node.
    fn container(&self) -> Container<'_> {
        Container::Scalar
    }

    /// Returns the mutable record-or-map view of this node.
    fn container_mut(&mut self) -> ContainerMut<'_> {
        ContainerMut::Scalar
    }
}

/// The traversable shape of a node.
pub enum Container<'a> {
    /// A structured record.
    Record(&'a dyn Record),
    /// A string-keyed map.
    Map(&'a dyn MapNode),
    /// An unset optional.
    Null,
    /// Anything else.
    Scalar,
}

/// The mutable traversable shape of a node.
pub enum ContainerMut<'a> {
    /// A structured record.
    Record(&'a mut dyn Record),
    /// A string-keyed map.
    Map(&'a mut dyn MapNode),
    /// An unset optional.
    Null,
    /// Anything else.
    Scalar,
}

impl Container<'_> {
    /// Returns a short name of the shape, used in error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Record(_) => "record",
            Self::Map(_) => "map",
            Self::Null => "null",
            Self::Scalar => "scalar",
        }
    }
}

/// A structured record with named fields.
///
/// Usually derived with `#[derive(Record)]`.
pub trait Record {
    /// Returns the declared field names in declaration order.
    fn field_names(&self) -> &'static [&'static str];

    /// Returns the field with exactly this name.
    fn field(&self, name: &str) -> Option<&dyn Bindable>;

    /// Returns the field with exactly this name, mutably.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Bindable>;
}

/// A map from string keys to bindable entries.
pub trait MapNode {
    /// Returns the keys in sorted order.
    fn key_names(&self) -> Vec<&str>;

    /// Returns the entry for a key.
    fn get_entry(&self, key: &str) -> Option<&dyn Bindable>;

    /// Returns the entry for a key, mutably.
    fn get_entry_mut(&mut self, key: &str) -> Option<&mut dyn Bindable>;

    /// Replaces the entry for a key, inserting it if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] if the value does not fit the entry type.
    fn replace_entry(&mut self, key: &str, value: Value) -> Result<(), CoercionError>;
}

/// Finds the declared field name matching `segment`.
///
/// An exact match wins. Otherwise case and underscores are ignored, so
/// `FirstName` finds `first_name`.
pub fn match_field_name(names: &[&'static str], segment: &str) -> Option<&'static str> {
    if let Some(name) = names.iter().copied().find(|name| *name == segment) {
        return Some(name);
    }
    let wanted = fold_field_name(segment);
    names
        .iter()
        .copied()
        .find(|name| fold_field_name(name) == wanted)
}

fn fold_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Builds a map value from a record's fields.
pub fn record_value(record: &dyn Record) -> Value {
    Value::Map(
        record
            .field_names()
            .iter()
            .filter_map(|name| {
                record
                    .field(name)
                    .map(|field| ((*name).to_string(), field.to_value()))
            })
            .collect(),
    )
}

/// Assigns a map value to a record field by field.
///
/// Keys are matched like path segments; keys without a field are skipped.
///
/// # Errors
///
/// Returns a [`CoercionError`] if the value is not a map or a field rejects
/// its entry.
pub fn assign_record(record: &mut dyn Record, value: Value) -> Result<(), CoercionError> {
    let Value::Map(entries) = value else {
        return Err(mismatch("record", &value));
    };
    for (key, entry) in entries {
        let Some(name) = match_field_name(record.field_names(), &key) else {
            continue;
        };
        if let Some(field) = record.field_mut(name) {
            field.assign(entry)?;
        }
    }
    Ok(())
}

fn mismatch(expected: &'static str, found: &Value) -> CoercionError {
    CoercionError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

impl Bindable for String {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::String(s) => {
                *self = s;
                Ok(())
            }
            other => Err(mismatch("string", &other)),
        }
    }
}

impl Bindable for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(mismatch("bool", &other)),
        }
    }
}

macro_rules! bind_int {
    ($($ty:ty),* $(,)?) => {$(
        impl Bindable for $ty {
            fn kind(&self) -> Kind {
                Kind::Int
            }

            fn to_value(&self) -> Value {
                i64::try_from(*self).map_or_else(|_| Value::String(self.to_string()), Value::Int)
            }

            fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
                match value {
                    Value::Int(i) => {
                        *self = <$ty>::try_from(i).map_err(|_| CoercionError::OutOfRange {
                            value: i.to_string(),
                            target: stringify!($ty),
                        })?;
                        Ok(())
                    }
                    other => Err(mismatch("integer", &other)),
                }
            }
        }
    )*};
}

bind_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Bindable for f64 {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Float(x) => *self = x,
            Value::Int(i) => *self = i as f64,
            other => return Err(mismatch("float", &other)),
        }
        Ok(())
    }
}

impl Bindable for f32 {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Float(x) => *self = x as f32,
            Value::Int(i) => *self = i as f32,
            other => return Err(mismatch("float", &other)),
        }
        Ok(())
    }
}

impl Bindable for NaiveDate {
    fn kind(&self) -> Kind {
        Kind::Date
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Date(d) => *self = d,
            Value::DateTime(dt) => *self = dt.date_naive(),
            other => return Err(mismatch("date", &other)),
        }
        Ok(())
    }
}

impl Bindable for NaiveTime {
    fn kind(&self) -> Kind {
        Kind::Time
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::Time(t) => *self = t,
            Value::DateTime(dt) => *self = dt.time(),
            other => return Err(mismatch("time", &other)),
        }
        Ok(())
    }
}

impl Bindable for NaiveDateTime {
    fn kind(&self) -> Kind {
        Kind::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.and_utc().fixed_offset())
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::DateTime(dt) => {
                *self = dt.naive_local();
                Ok(())
            }
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl Bindable for DateTime<FixedOffset> {
    fn kind(&self) -> Kind {
        Kind::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::DateTime(dt) => {
                *self = dt;
                Ok(())
            }
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl Bindable for DateTime<Utc> {
    fn kind(&self) -> Kind {
        Kind::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.fixed_offset())
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match value {
            Value::DateTime(dt) => {
                *self = dt.with_timezone(&Utc);
                Ok(())
            }
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl<T: Bindable + Default> Bindable for Option<T> {
    fn kind(&self) -> Kind {
        let inner = match self {
            Some(value) => value.kind(),
            None => T::default().kind(),
        };
        Kind::Optional(Box::new(inner))
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Bindable::to_value)
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn container(&self) -> Container<'_> {
        match self {
            Some(value) => value.container(),
            None => Container::Null,
        }
    }

    fn container_mut(&mut self) -> ContainerMut<'_> {
        match self {
            Some(value) => value.container_mut(),
            None => ContainerMut::Null,
        }
    }
}

impl<T: Bindable + ?Sized> Bindable for Box<T> {
    fn kind(&self) -> Kind {
        (**self).kind()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        (**self).assign(value)
    }

    fn container(&self) -> Container<'_> {
        (**self).container()
    }

    fn container_mut(&mut self) -> ContainerMut<'_> {
        (**self).container_mut()
    }
}

impl<T: Bindable + Default> Bindable for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::List(Box::new(T::default().kind()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Bindable::to_value).collect())
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        let items = match value {
            Value::List(items) => items,
            Value::Null => Vec::new(),
            single => vec![single],
        };
        let mut fresh = Self::with_capacity(items.len());
        for item in items {
            let mut slot = T::default();
            slot.assign(item)?;
            fresh.push(slot);
        }
        *self = fresh;
        Ok(())
    }
}

macro_rules! bind_map {
    ($($map:ident),* $(,)?) => {$(
        impl<T: Bindable + Default> MapNode for $map<String, T> {
            fn key_names(&self) -> Vec<&str> {
                let mut keys: Vec<&str> = $map::keys(self).map(String::as_str).collect();
                keys.sort_unstable();
                keys
            }

            fn get_entry(&self, key: &str) -> Option<&dyn Bindable> {
                self.get(key).map(|entry| entry as &dyn Bindable)
            }

            fn get_entry_mut(&mut self, key: &str) -> Option<&mut dyn Bindable> {
                self.get_mut(key).map(|entry| entry as &mut dyn Bindable)
            }

            fn replace_entry(&mut self, key: &str, value: Value) -> Result<(), CoercionError> {
                let mut entry = T::default();
                entry.assign(value)?;
                self.insert(key.to_string(), entry);
                Ok(())
            }
        }

        impl<T: Bindable + Default> Bindable for $map<String, T> {
            fn kind(&self) -> Kind {
                Kind::Map
            }

            fn to_value(&self) -> Value {
                Value::Map(
                    self.iter()
                        .map(|(key, entry)| (key.clone(), entry.to_value()))
                        .collect(),
                )
            }

            fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
                let Value::Map(entries) = value else {
                    return Err(mismatch("map", &value));
                };
                let mut fresh = Self::new();
                for (key, item) in entries {
                    let mut entry = T::default();
                    entry.assign(item)?;
                    fresh.insert(key, entry);
                }
                *self = fresh;
                Ok(())
            }

            fn container(&self) -> Container<'_> {
                Container::Map(self)
            }

            fn container_mut(&mut self) -> ContainerMut<'_> {
                ContainerMut::Map(self)
            }
        }
    )*};
}

bind_map!(HashMap, BTreeMap);

impl Bindable for Value {
    fn kind(&self) -> Kind {
        match self {
            Self::Null | Self::String(_) => Kind::String,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Date(_) => Kind::Date,
            Self::Time(_) => Kind::Time,
            Self::DateTime(_) => Kind::DateTime,
            Self::List(items) => Kind::List(Box::new(
                items.first().map_or(Kind::String, Bindable::kind),
            )),
            Self::Map(_) => Kind::Map,
        }
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        *self = value;
        Ok(())
    }

    fn container(&self) -> Container<'_> {
        match self {
            Self::Map(entries) => Container::Map(entries),
            Self::Null => Container::Null,
            _ => Container::Scalar,
        }
    }

    fn container_mut(&mut self) -> ContainerMut<'_> {
        match self {
            Self::Map(entries) => ContainerMut::Map(entries),
            Self::Null => ContainerMut::Null,
            _ => ContainerMut::Scalar,
        }
    }
}

impl Bindable for serde_json::Value {
    fn kind(&self) -> Kind {
        match self {
            Self::Null | Self::String(_) => Kind::String,
            Self::Bool(_) => Kind::Bool,
            Self::Number(n) if n.is_i64() || n.is_u64() => Kind::Int,
            Self::Number(_) => Kind::Float,
            Self::Array(items) => Kind::List(Box::new(
                items.first().map_or(Kind::String, Bindable::kind),
            )),
            Self::Object(_) => Kind::Map,
        }
    }

    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        *self = Self::from(value);
        Ok(())
    }

    fn container(&self) -> Container<'_> {
        match self {
            Self::Object(entries) => Container::Map(entries),
            Self::Null => Container::Null,
            _ => Container::Scalar,
        }
    }

    fn container_mut(&mut self) -> ContainerMut<'_> {
        match self {
            Self::Object(entries) => ContainerMut::Map(entries),
            Self::Null => ContainerMut::Null,
            _ => ContainerMut::Scalar,
        }
    }
}

impl MapNode for serde_json::Map<String, serde_json::Value> {
    fn key_names(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn get_entry(&self, key: &str) -> Option<&dyn Bindable> {
        self.get(key).map(|entry| entry as &dyn Bindable)
    }

    fn get_entry_mut(&mut self, key: &str) -> Option<&mut dyn Bindable> {
        self.get_mut(key).map(|entry| entry as &mut dyn Bindable)
    }

    fn replace_entry(&mut self, key: &str, value: Value) -> Result<(), CoercionError> {
        self.insert(key.to_string(), serde_json::Value::from(value));
        Ok(())
    }
}

impl Bindable for serde_json::Map<String, serde_json::Value> {
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, entry)| (key.clone(), Value::from(entry.clone())))
                .collect(),
        )
    }

    fn assign(&mut self, value: Value) -> Result<(), CoercionError> {
        match serde_json::Value::from(value) {
            serde_json::Value::Object(entries) => {
                *self = entries;
                Ok(())
            }
            other => Err(CoercionError::TypeMismatch {
                expected: "map",
                found: Value::from(other).type_name(),
            }),
        }
    }

    fn container(&self) -> Container<'_> {
        Container::Map(self)
    }

    fn container_mut(&mut self) -> ContainerMut<'_> {
        ContainerMut::Map(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_int_out_of_range() {
        let mut small: u8 = 0;
        let err = small.assign(Value::Int(300)).unwrap_err();
        assert_eq!(
            err,
            CoercionError::OutOfRange {
                value: "300".to_string(),
                target: "u8",
            }
        );
        small.assign(Value::Int(200)).unwrap();
        assert_eq!(small, 200);
    }

    #[test]
    fn test_type_mismatch() {
        let mut name = String::new();
        let err = name.assign(Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            CoercionError::TypeMismatch {
                expected: "string",
                found: "integer",
            }
        );
    }

    #[test]
    fn test_option_allocates_and_clears() {
        let mut age: Option<i32> = None;
        assert!(matches!(age.kind(), Kind::Optional(inner) if matches!(*inner, Kind::Int)));

        age.assign(Value::Int(7)).unwrap();
        assert_eq!(age, Some(7));
        assert_eq!(age.to_value(), Value::Int(7));

        age.assign(Value::Null).unwrap();
        assert_eq!(age, None);
        assert_eq!(age.to_value(), Value::Null);
    }

    #[test]
    fn test_vec_collects_list() {
        let mut tags: Vec<String> = Vec::new();
        assert!(matches!(tags.kind(), Kind::List(inner) if matches!(*inner, Kind::String)));

        tags.assign(Value::from(vec!["a", "b"])).unwrap();
        assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);

        tags.assign(Value::from("only")).unwrap();
        assert_eq!(tags, vec!["only".to_string()]);
    }

    #[test]
    fn test_hash_map_node() {
        let mut map: HashMap<String, i64> = HashMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);

        assert_eq!(map.key_names(), vec!["a", "b"]);
        assert_eq!(map.get_entry("a").map(Bindable::to_value), Some(Value::Int(1)));
        assert!(map.get_entry("A").is_none());

        map.replace_entry("c", Value::Int(3)).unwrap();
        assert_eq!(map.get("c"), Some(&3));
        assert!(map.replace_entry("d", Value::from("x")).is_err());
    }

    #[test]
    fn test_dynamic_value_kind_follows_content() {
        assert!(matches!(Value::Int(3).kind(), Kind::Int));
        assert!(matches!(Value::from("x").kind(), Kind::String));
        assert!(matches!(Value::Null.kind(), Kind::String));

        let mut slot = Value::Int(3);
        slot.assign(Value::from("replaced")).unwrap();
        assert_eq!(slot, Value::from("replaced"));
    }

    #[test]
    fn test_json_value_container() {
        let mut json = serde_json::json!({"age": 3, "ratio": 0.5, "name": "x"});
        let Container::Map(map) = json.container() else {
            panic!("object should be a map");
        };
        assert!(matches!(map.get_entry("age").map(Bindable::kind), Some(Kind::Int)));
        assert!(matches!(map.get_entry("ratio").map(Bindable::kind), Some(Kind::Float)));

        let ContainerMut::Map(map) = json.container_mut() else {
            panic!("object should be a map");
        };
        map.replace_entry("age", Value::Int(4)).unwrap();
        assert_eq!(json["age"], serde_json::json!(4));
    }

    #[test]
    fn test_match_field_name_ignores_case() {
        let names = &["name", "Age", "age"];
        assert_eq!(match_field_name(names, "AGE"), Some("Age"));
        assert_eq!(match_field_name(names, "NAME"), Some("name"));
        assert_eq!(match_field_name(names, "missing"), None);
    }

    #[test]
    fn test_match_field_name_ignores_underscores() {
        let names = &["first_name", "last_name", "Age"];
        assert_eq!(match_field_name(names, "FirstName"), Some("first_name"));
        assert_eq!(match_field_name(names, "LAST_NAME"), Some("last_name"));
        assert_eq!(match_field_name(names, "Age"), Some("Age"));
        assert_eq!(match_field_name(names, "First.Name"), None);
    }
}
