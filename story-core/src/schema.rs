//! Response schemas for structured model output.

/// A type the model can be asked to produce as JSON.
///
/// Usually derived with `#[derive(Schema)]`, which reads field names, types
/// and doc comments. The schema uses the upper-case type names of the Gemini
/// `responseSchema` dialect (`OBJECT`, `STRING`, `NUMBER`, ...).
pub trait ResponseSchema {
    fn response_schema() -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;
    use serde::Deserialize;

    /// A tiny record
    #[derive(Schema, Deserialize)]
    #[serde(rename_all = "camelCase")]
    #[allow(dead_code)]
    struct Inner {
        /// How loud it is
        volume_level: f32,
    }

    #[derive(Schema, Deserialize)]
    #[serde(rename_all = "camelCase")]
    #[allow(dead_code)]
    struct Outer {
        key_locations: Vec<String>,
        #[serde(rename = "ok")]
        is_ok: bool,
        count: u32,
        inner: Inner,
        note: Option<String>,
        #[schema(optional)]
        hint: String,
    }

    #[test]
    fn test_schema_types_and_names() {
        let schema = Outer::response_schema();
        assert_eq!(schema["type"], "OBJECT");

        let props = &schema["properties"];
        assert_eq!(props["keyLocations"]["type"], "ARRAY");
        assert_eq!(props["keyLocations"]["items"]["type"], "STRING");
        assert_eq!(props["ok"]["type"], "BOOLEAN");
        assert_eq!(props["count"]["type"], "INTEGER");
        assert_eq!(props["note"]["nullable"], true);
    }

    #[test]
    fn test_schema_nested_object() {
        let schema = Outer::response_schema();
        let inner = &schema["properties"]["inner"];
        assert_eq!(inner["type"], "OBJECT");
        assert_eq!(inner["description"], "A tiny record");
        assert_eq!(inner["properties"]["volumeLevel"]["type"], "NUMBER");
        assert_eq!(inner["properties"]["volumeLevel"]["description"], "How loud it is");
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = Outer::response_schema();
        let required = schema["required"].as_array().unwrap();
        for name in ["keyLocations", "ok", "count", "inner"] {
            assert!(required.iter().any(|v| v == name), "{name} should be required");
        }
        assert!(!required.iter().any(|v| v == "note"));
        assert!(!required.iter().any(|v| v == "hint"));
    }
}
