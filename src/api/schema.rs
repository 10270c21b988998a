//! Structured Output Schemas
//!
//! Builder for the response schema sent with every structured call, in the
//! OpenAPI subset the generation service accepts, plus the declarations for
//! each operation.

use serde::Serialize;
use std::collections::BTreeMap;

/// JSON type of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// A response schema node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,

    /// Declaration order of `properties`; the upstream emits fields in this order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    /// Attach a human-readable description the model sees
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a required property
    pub fn property(mut self, name: &str, schema: Schema) -> Self {
        self.properties.insert(name.to_string(), schema);
        self.property_ordering.push(name.to_string());
        self.required.push(name.to_string());
        self
    }
}

/// `[{title, summary}]`
pub fn story_ideas() -> Schema {
    Schema::array(
        Schema::object()
            .property("title", Schema::string().describe("Title of the story"))
            .property("summary", Schema::string().describe("Short summary of the story")),
    )
}

/// `[{name, prompt}]`
pub fn characters() -> Schema {
    Schema::array(
        Schema::object()
            .property("name", Schema::string().describe("Name of the character"))
            .property(
                "prompt",
                Schema::string().describe("English image generation prompt for the character"),
            ),
    )
}

/// `{summary, scenes: [{id, description, narration, veo_prompt, characters_present}]}`
pub fn script() -> Schema {
    let scene = Schema::object()
        .property("id", Schema::integer())
        .property("description", Schema::string())
        .property("narration", Schema::string())
        .property("veo_prompt", Schema::string())
        .property("characters_present", Schema::array(Schema::string()));

    Schema::object()
        .property("summary", Schema::string())
        .property("scenes", Schema::array(scene))
}
