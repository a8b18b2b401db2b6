//! Dotted-path read/write over a [`Value`] object, per §4.A.

use super::{Object, Value};

/// Read `root.<a>.<b>...` Missing keys and descents through a non-object
/// both yield `Value::Null` rather than an error — the engine never fails
/// a read, only a write.
pub fn get_path(root: &Value, path: &str) -> Value {
    if path.is_empty() {
        return root.clone();
    }
    let mut current = root;
    for segment in path.split('.') {
        match current.as_object().and_then(|o| o.get(segment)) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Write `value` at `root.<a>.<b>...`, creating intermediate objects as
/// needed. Fails if an intermediate segment already exists and is not an
/// object (§4.A).
pub fn set_path(root: &mut Value, path: &str, value: Value) -> Result<(), String> {
    if path.is_empty() {
        *root = value;
        return Ok(());
    }
    if !matches!(root, Value::Object(_)) {
        *root = Value::object();
    }
    let segments: Vec<&str> = path.split('.').collect();
    set_segments(root.as_object_mut().expect("just coerced to object"), &segments, value)
}

fn set_segments(obj: &mut Object, segments: &[&str], value: Value) -> Result<(), String> {
    let (head, rest) = segments
        .split_first()
        .expect("set_path never called with an empty segment list");

    if rest.is_empty() {
        obj.insert((*head).to_string(), value);
        return Ok(());
    }

    match obj.get_mut(*head) {
        Some(existing @ Value::Object(_)) => {
            let inner = existing.as_object_mut().expect("matched Object above");
            set_segments(inner, rest, value)
        }
        Some(other) => Err(format!(
            "cannot descend into path segment '{head}': existing value is a {}, not an object",
            other.type_name()
        )),
        None => {
            let mut inner = Object::new();
            set_segments(&mut inner, rest, value)?;
            obj.insert((*head).to_string(), Value::Object(inner));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(pairs: Vec<(&str, Value)>) -> Value {
        let mut o = Object::new();
        for (k, v) in pairs {
            o.insert(k.to_string(), v);
        }
        Value::Object(o)
    }

    #[test]
    fn get_missing_key_yields_null() {
        let root = obj(vec![("a", Value::Number(1.0))]);
        assert_eq!(get_path(&root, "b"), Value::Null);
    }

    #[test]
    fn get_through_non_object_yields_null() {
        let root = obj(vec![("a", Value::Number(1.0))]);
        assert_eq!(get_path(&root, "a.b"), Value::Null);
    }

    #[test]
    fn get_nested_path() {
        let inner = obj(vec![("b", Value::Number(2.0))]);
        let root = obj(vec![("a", inner)]);
        assert_eq!(get_path(&root, "a.b"), Value::Number(2.0));
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut root = Value::object();
        set_path(&mut root, "a.b.c", Value::Number(3.0)).unwrap();
        assert_eq!(get_path(&root, "a.b.c"), Value::Number(3.0));
    }

    #[test]
    fn set_fails_through_non_object_intermediate() {
        let mut root = obj(vec![("a", Value::Number(1.0))]);
        let err = set_path(&mut root, "a.b", Value::Number(2.0)).unwrap_err();
        assert!(err.contains("not an object"));
    }

    #[test]
    fn set_on_empty_path_replaces_root() {
        let mut root = obj(vec![("a", Value::Number(1.0))]);
        set_path(&mut root, "", Value::Number(9.0)).unwrap();
        assert_eq!(root, Value::Number(9.0));
    }
}
