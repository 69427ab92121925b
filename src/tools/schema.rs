//! JSON-Schema generation for tool parameters.
//!
//! Tools with a trivial parameter shape write their schema by hand inline
//! (a single `json!` literal reads better than a derive for two fields).
//! Tools whose arguments are modeled as a real Rust struct can instead
//! derive `schemars::JsonSchema` and call `schema_for::<Args>()`, which
//! normalizes the schemars output down to the
//! `{type:"object", properties, required}` shape the dispatcher expects.

use schemars::{schema_for, JsonSchema};
use serde_json::{json, Value};

/// Build a dispatcher-facing JSON-Schema object from a `JsonSchema` type,
/// stripping schemars' `$schema`/`title` wrapper fields that tool callers
/// never need.
pub fn schema_for_args<T: JsonSchema>() -> Value {
    let root = schema_for!(T);
    let mut value = serde_json::to_value(&root.schema).unwrap_or_else(|_| json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.entry("type").or_insert_with(|| json!("object"));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct SampleArgs {
        path: String,
        #[serde(default)]
        recursive: bool,
    }

    #[test]
    fn test_schema_for_args_produces_object_schema() {
        let schema = schema_for_args::<SampleArgs>();
        assert_eq!(schema["type"], json!("object"));
        assert!(schema["properties"]["path"].is_object());
    }
}
