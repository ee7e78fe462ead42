use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Generator family a field belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Bool,
    Enum,
    Id,
}

impl FieldType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "date" => FieldType::Date,
            "bool" => FieldType::Bool,
            "enum" => FieldType::Enum,
            "id" => FieldType::Id,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Bool => "bool",
            FieldType::Enum => "enum",
            FieldType::Id => "id",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags carried by the field-name suffix.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub required: bool,
    pub nullable: bool,
    pub children: bool,
}

/// Strip one modifier suffix (`!`, `?` or `[]`) from a raw field name.
pub fn split_field_name(raw: &str) -> Result<(&str, Modifiers), SchemaError> {
    let mut modifiers = Modifiers::default();
    let name = if let Some(name) = raw.strip_suffix('!') {
        modifiers.required = true;
        name
    } else if let Some(name) = raw.strip_suffix('?') {
        modifiers.nullable = true;
        name
    } else if let Some(name) = raw.strip_suffix("[]") {
        modifiers.children = true;
        name
    } else {
        raw
    };

    if name.is_empty() || name.ends_with(['!', '?', ']']) {
        return Err(SchemaError::InvalidFieldName(raw.to_string()));
    }
    Ok((name, modifiers))
}

/// Parsed, typed form of one spec-string plus its name modifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Raw parameter section, without the leading `:`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub children: bool,
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            subtype: None,
            params: None,
            required: false,
            nullable: false,
            children: false,
        }
    }

    pub fn parse(spec: &str) -> Result<Self, SchemaError> {
        crate::spec::parse(spec)
    }

    pub fn with_modifiers(mut self, m: Modifiers) -> Self {
        self.required = m.required;
        self.nullable = m.nullable;
        self.children = m.children;
        self
    }

    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Comma-separated parameter tokens, verbatim.
    pub fn param_list(&self) -> Vec<&str> {
        match self.params.as_deref() {
            Some(p) => p.split(',').collect(),
            None => Vec::new(),
        }
    }

    pub fn is_uuid(&self) -> bool {
        self.field_type == FieldType::Id && self.subtype() == Some("uuid")
    }

    /// Auto-increment identifier: `id` with any subtype other than `uuid`.
    pub fn is_sequence(&self) -> bool {
        self.field_type == FieldType::Id && !self.is_uuid()
    }

    /// Render back to `type[.subtype][:params]`.
    pub fn spec_string(&self) -> String {
        crate::spec::render(self)
    }
}
