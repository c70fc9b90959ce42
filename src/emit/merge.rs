//! Deep merge of a caller-supplied asconfig base under a computed
//! configuration.
//!
//! Object values merge key-by-key recursively. On any other conflict the
//! computed side wins: the emitter owns its keys, and the owned array keys
//! (`library-path`, `source-path`, `include-sources`) are replaced
//! wholesale rather than concatenated.

use serde_json::Value;

/// Merges `computed` over `base`, computed side winning on conflicts.
pub fn merge_under(base: Value, computed: Value) -> Value {
    match (base, computed) {
        (Value::Object(mut base_map), Value::Object(computed_map)) => {
            for (key, computed_value) in computed_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge_under(base_value, computed_value),
                    None => computed_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, computed) => computed,
    }
}
