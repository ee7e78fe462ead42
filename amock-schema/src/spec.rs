//! Spec-string grammar: `<type>[.<subtype>][:<params>]`.
//!
//! `type` is lower-case ASCII letters. `subtype` is ASCII letters (camel case is allowed,
//! e.g. `string.streetName`); an empty subtype means the family's root generator.
//! Everything after the first `:` is the raw parameter section.

use crate::{FieldDescriptor, FieldType, SchemaError};

pub fn parse(spec: &str) -> Result<FieldDescriptor, SchemaError> {
    let spec = spec.trim();
    let malformed = |reason: &str| SchemaError::MalformedSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let (head, params) = match spec.split_once(':') {
        Some((head, params)) => (head, Some(params)),
        None => (spec, None),
    };
    let (tag, subtype) = match head.split_once('.') {
        Some((tag, subtype)) => (tag, Some(subtype)),
        None => (head, None),
    };

    if tag.is_empty() {
        return Err(malformed("missing type"));
    }
    if !tag.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(malformed("type must be lower-case letters"));
    }
    let field_type = FieldType::from_tag(tag).ok_or_else(|| SchemaError::UnknownType(tag.to_string()))?;

    let subtype = match subtype {
        None | Some("") => None,
        Some(s) if s.bytes().all(|b| b.is_ascii_alphabetic()) => Some(s.to_string()),
        Some(_) => return Err(malformed("subtype must be letters")),
    };

    let mut descriptor = FieldDescriptor::new(field_type);
    descriptor.subtype = subtype;
    descriptor.params = params.filter(|p| !p.is_empty()).map(str::to_string);
    Ok(descriptor)
}

pub fn render(d: &FieldDescriptor) -> String {
    let mut out = d.field_type.as_str().to_string();
    if let Some(subtype) = &d.subtype {
        out.push('.');
        out.push_str(subtype);
    }
    if let Some(params) = &d.params {
        out.push(':');
        out.push_str(params);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_form() {
        let d = parse("number.range:1,10").unwrap();
        assert_eq!(d.field_type, FieldType::Number);
        assert_eq!(d.subtype(), Some("range"));
        assert_eq!(d.param_list(), vec!["1", "10"]);
    }

    #[test]
    fn type_only_and_type_with_params() {
        let d = parse("bool").unwrap();
        assert_eq!(d.field_type, FieldType::Bool);
        assert!(d.subtype.is_none() && d.params.is_none());

        let d = parse("enum:red,green,blue").unwrap();
        assert_eq!(d.subtype, None);
        assert_eq!(d.param_list(), vec!["red", "green", "blue"]);
    }

    #[test]
    fn empty_subtype_means_root() {
        let d = parse("date.:yyyy-MM-dd").unwrap();
        assert_eq!(d.subtype, None);
        assert_eq!(d.params.as_deref(), Some("yyyy-MM-dd"));

        let d = parse("string.").unwrap();
        assert_eq!(d.subtype, None);
    }

    #[test]
    fn empty_params_are_absent() {
        assert_eq!(parse("id:").unwrap().params, None);
    }

    #[test]
    fn camel_case_subtype() {
        assert_eq!(parse("string.streetName").unwrap().subtype(), Some("streetName"));
    }

    #[test]
    fn malformed_specs_fail() {
        assert!(matches!(parse(""), Err(SchemaError::MalformedSpec { .. })));
        assert!(matches!(parse(".int"), Err(SchemaError::MalformedSpec { .. })));
        assert!(matches!(parse("Number"), Err(SchemaError::MalformedSpec { .. })));
        assert!(matches!(parse("number.in-t"), Err(SchemaError::MalformedSpec { .. })));
        assert!(matches!(parse("widget"), Err(SchemaError::UnknownType(t)) if t == "widget"));
    }
}
