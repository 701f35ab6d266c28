//! Dotted-path access into records and maps.
//!
//! A path such as `Extra.ExtraField` is split on `.` and consumed one
//! segment per step. Records match segments case-insensitively against
//! their declared field names, maps match keys exactly. Optional and boxed
//! nodes expose their inner container directly, so indirection never
//! consumes a segment.

use crate::bind::{match_field_name, Bindable, Container, ContainerMut, MapNode, Record};
use crate::error::{FormError, ResolveError};
use crate::value::Value;

/// Splits a dotted path into its segments.
///
/// # Errors
///
/// Returns [`ResolveError::EmptySegment`] for an empty path or a path with
/// an empty segment such as `a..b`.
pub fn segments(path: &str) -> Result<Vec<&str>, ResolveError> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(ResolveError::EmptySegment(path.to_string()));
    }
    Ok(parts)
}

/// Locates the slot addressed by `path`.
///
/// # Errors
///
/// Returns a [`ResolveError`] if a segment does not resolve.
pub fn resolve<'c>(root: &'c dyn Bindable, path: &str) -> Result<&'c dyn Bindable, ResolveError> {
    let mut node = root;
    for segment in segments(path)? {
        node = step(node, path, segment)?;
    }
    Ok(node)
}

/// Locates the slot addressed by `path`, mutably.
///
/// # Errors
///
/// Returns a [`ResolveError`] if a segment does not resolve.
pub fn resolve_mut<'c>(
    root: &'c mut dyn Bindable,
    path: &str,
) -> Result<&'c mut dyn Bindable, ResolveError> {
    let mut node = root;
    for segment in segments(path)? {
        node = step_mut(node, path, segment)?;
    }
    Ok(node)
}

/// Reads the current value at `path`.
///
/// # Errors
///
/// Returns a [`ResolveError`] if the path does not resolve.
pub fn read(root: &dyn Bindable, path: &str) -> Result<Value, ResolveError> {
    resolve(root, path).map(Bindable::to_value)
}

/// Writes `value` at `path`.
///
/// A record field is assigned in place. A map entry is replaced wholesale,
/// and inserted if the key is new.
///
/// # Errors
///
/// Returns [`FormError::Resolve`] if the parent of the last segment does not
/// resolve, and [`FormError::Coercion`] if the slot rejects the value.
pub fn write(root: &mut dyn Bindable, path: &str, value: Value) -> Result<(), FormError> {
    let parts = segments(path)?;
    let Some((last, parents)) = parts.split_last() else {
        return Err(ResolveError::EmptySegment(path.to_string()).into());
    };

    let mut parent = root;
    for segment in parents {
        parent = step_mut(parent, path, segment)?;
    }

    let stored = match parent.container_mut() {
        ContainerMut::Record(record) => {
            let field = record_field_mut(record, path, last)?;
            field.assign(value)
        }
        ContainerMut::Map(map) => map.replace_entry(last, value),
        ContainerMut::Null => return Err(null_indirection(path, last).into()),
        ContainerMut::Scalar => return Err(not_a_container(path, last).into()),
    };

    stored.map_err(|source| FormError::Coercion {
        field: path.to_string(),
        source,
    })
}

fn step<'c>(
    node: &'c dyn Bindable,
    path: &str,
    segment: &str,
) -> Result<&'c dyn Bindable, ResolveError> {
    match node.container() {
        Container::Record(record) => record_field(record, path, segment),
        Container::Map(map) => map_entry(map, path, segment),
        Container::Null => Err(null_indirection(path, segment)),
        Container::Scalar => Err(not_a_container(path, segment)),
    }
}

fn step_mut<'c>(
    node: &'c mut dyn Bindable,
    path: &str,
    segment: &str,
) -> Result<&'c mut dyn Bindable, ResolveError> {
    match node.container_mut() {
        ContainerMut::Record(record) => record_field_mut(record, path, segment),
        ContainerMut::Map(map) => map
            .get_entry_mut(segment)
            .ok_or_else(|| key_not_found(path, segment)),
        ContainerMut::Null => Err(null_indirection(path, segment)),
        ContainerMut::Scalar => Err(not_a_container(path, segment)),
    }
}

fn record_field<'c>(
    record: &'c dyn Record,
    path: &str,
    segment: &str,
) -> Result<&'c dyn Bindable, ResolveError> {
    match_field_name(record.field_names(), segment)
        .and_then(|name| record.field(name))
        .ok_or_else(|| field_not_found(path, segment))
}

fn record_field_mut<'c>(
    record: &'c mut dyn Record,
    path: &str,
    segment: &str,
) -> Result<&'c mut dyn Bindable, ResolveError> {
    let name = match_field_name(record.field_names(), segment)
        .ok_or_else(|| field_not_found(path, segment))?;
    record
        .field_mut(name)
        .ok_or_else(|| field_not_found(path, segment))
}

fn map_entry<'c>(
    map: &'c dyn MapNode,
    path: &str,
    segment: &str,
) -> Result<&'c dyn Bindable, ResolveError> {
    map.get_entry(segment)
        .ok_or_else(|| key_not_found(path, segment))
}

fn field_not_found(path: &str, segment: &str) -> ResolveError {
    ResolveError::FieldNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

fn key_not_found(path: &str, segment: &str) -> ResolveError {
    ResolveError::KeyNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

fn null_indirection(path: &str, segment: &str) -> ResolveError {
    ResolveError::NullIndirection {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

fn not_a_container(path: &str, segment: &str) -> ResolveError {
    ResolveError::NotAContainer {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;

    fn nested() -> HashMap<String, Value> {
        let mut inner = BTreeMap::new();
        inner.insert("City".to_string(), Value::from("Berlin"));
        inner.insert("Zip".to_string(), Value::Int(10115));

        let mut root = HashMap::new();
        root.insert("Name".to_string(), Value::from("Foo"));
        root.insert("Address".to_string(), Value::Map(inner));
        root
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("a.b.c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(segments("").unwrap_err(), ResolveError::EmptySegment(String::new()));
        assert!(segments("a..b").is_err());
        assert!(segments("a.").is_err());
    }

    #[test]
    fn test_read_nested_map() {
        let data = nested();
        assert_eq!(read(&data, "Name").unwrap(), Value::from("Foo"));
        assert_eq!(read(&data, "Address.Zip").unwrap(), Value::Int(10115));
    }

    #[test]
    fn test_map_keys_are_exact() {
        let data = nested();
        assert_eq!(
            read(&data, "address.City").unwrap_err(),
            ResolveError::KeyNotFound {
                path: "address.City".to_string(),
                segment: "address".to_string(),
            }
        );
    }

    #[test]
    fn test_scalar_with_segments_left() {
        let data = nested();
        assert!(matches!(
            read(&data, "Name.First"),
            Err(ResolveError::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_write_replaces_map_entry() {
        let mut data = nested();
        write(&mut data, "Address.City", Value::from("Hamburg")).unwrap();
        assert_eq!(read(&data, "Address.City").unwrap(), Value::from("Hamburg"));

        write(&mut data, "Address.Country", Value::from("DE")).unwrap();
        assert_eq!(read(&data, "Address.Country").unwrap(), Value::from("DE"));
    }

    #[test]
    fn test_write_into_typed_map_checks_type() {
        let mut data: HashMap<String, i64> = HashMap::new();
        data.insert("Age".to_string(), 1);

        write(&mut data, "Age", Value::Int(14)).unwrap();
        assert_eq!(data.get("Age"), Some(&14));

        let err = write(&mut data, "Age", Value::from("x")).unwrap_err();
        assert!(matches!(err, FormError::Coercion { ref field, .. } if field == "Age"));
    }

    #[test]
    fn test_unset_optional_blocks_descent() {
        let mut data: HashMap<String, Option<BTreeMap<String, String>>> = HashMap::new();
        data.insert("Extra".to_string(), None);

        assert!(matches!(
            read(&data, "Extra.Field"),
            Err(ResolveError::NullIndirection { .. })
        ));

        let mut extra = BTreeMap::new();
        extra.insert("Field".to_string(), "x".to_string());
        data.insert("Extra".to_string(), Some(extra));
        assert_eq!(read(&data, "Extra.Field").unwrap(), Value::from("x"));
    }
}
