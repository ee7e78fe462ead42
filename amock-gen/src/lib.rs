//! Generator dispatch for the field specification language.
//!
//! ```text
//! FieldDescriptor ──► Generator::for_descriptor   (type, subtype) -> closed enum
//!        │
//!        └────────► resolve_params              raw params -> argument list
//!                          │
//!                          ▼
//!                  Generator::generate ──► GeneratedValue
//! ```
//!
//! Every `(type, subtype)` pair maps to exactly one [`Generator`] variant, and each variant
//! declares the argument counts it accepts. [`check`] runs the whole pipeline once so that
//! schema mistakes surface when a table is built, not on a later write.

pub mod generators;
pub mod resolve;

use std::fmt;

use amock_schema::{FieldDescriptor, FieldType};
use amock_types::GeneratedValue;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

pub use generators::date::DateKind;
pub use generators::number::NumberKind;
pub use generators::string::TextKind;
pub use resolve::{resolve_params, UNBOUNDED};

#[derive(Debug, Error)]
pub enum GenError {
    #[error("unknown subtype {subtype:?} for type {field_type}")]
    UnknownSubtype { field_type: FieldType, subtype: String },
    #[error("{generator} takes {expected} argument(s), got {got}")]
    Arity {
        generator: String,
        expected: Arity,
        got: usize,
    },
    #[error("invalid parameter {param:?}: {reason}")]
    InvalidParam { param: String, reason: String },
}

/// Argument counts a generator accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    Exactly(usize),
    OneOf(&'static [usize]),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == *k,
            Arity::OneOf(ks) => ks.contains(&n),
            Arity::AtLeast(k) => n >= *k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "{k}"),
            Arity::OneOf(ks) => {
                let parts: Vec<String> = ks.iter().map(|k| k.to_string()).collect();
                write!(f, "{}", parts.join(" or "))
            }
            Arity::AtLeast(k) => write!(f, "at least {k}"),
        }
    }
}

/// One concrete generator, resolved from `(type, subtype)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Generator {
    Text(TextKind),
    Number(NumberKind),
    Date(DateKind),
    Bool,
    Enum,
    Sequence,
    Uuid,
}

impl Generator {
    /// Absent subtype (or `root`) selects the family's root generator; any other
    /// subtype must match exactly.
    pub fn lookup(field_type: FieldType, subtype: Option<&str>) -> Result<Self, GenError> {
        let unknown = |s: &str| GenError::UnknownSubtype {
            field_type,
            subtype: s.to_string(),
        };
        let subtype = subtype.filter(|s| *s != "root");

        Ok(match (field_type, subtype) {
            (FieldType::String, None) => Generator::Text(TextKind::Root),
            (FieldType::String, Some(s)) => Generator::Text(TextKind::from_subtype(s).ok_or_else(|| unknown(s))?),
            (FieldType::Number, None) => Generator::Number(NumberKind::Root),
            (FieldType::Number, Some(s)) => Generator::Number(NumberKind::from_subtype(s).ok_or_else(|| unknown(s))?),
            (FieldType::Date, None) => Generator::Date(DateKind::Root),
            (FieldType::Date, Some(s)) => Generator::Date(DateKind::from_subtype(s).ok_or_else(|| unknown(s))?),
            (FieldType::Bool, None) => Generator::Bool,
            (FieldType::Enum, None) => Generator::Enum,
            (FieldType::Id, None | Some("sequence")) => Generator::Sequence,
            (FieldType::Id, Some("uuid")) => Generator::Uuid,
            (FieldType::Bool | FieldType::Enum | FieldType::Id, Some(s)) => return Err(unknown(s)),
        })
    }

    pub fn for_descriptor(d: &FieldDescriptor) -> Result<Self, GenError> {
        Self::lookup(d.field_type, d.subtype())
    }

    pub fn name(&self) -> String {
        match self {
            Generator::Text(k) => format!("string.{}", k.as_str()),
            Generator::Number(k) => format!("number.{}", k.as_str()),
            Generator::Date(k) => format!("date.{}", k.as_str()),
            Generator::Bool => "bool".into(),
            Generator::Enum => "enum".into(),
            Generator::Sequence => "id.sequence".into(),
            Generator::Uuid => "id.uuid".into(),
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Generator::Text(k) => k.arity(),
            Generator::Number(k) => k.arity(),
            Generator::Date(k) => k.arity(),
            Generator::Bool | Generator::Uuid => Arity::Exactly(0),
            Generator::Enum => Arity::AtLeast(1),
            Generator::Sequence => Arity::Exactly(1),
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, args: &[String], rng: &mut R) -> Result<GeneratedValue, GenError> {
        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(GenError::Arity {
                generator: self.name(),
                expected: arity,
                got: args.len(),
            });
        }

        match self {
            Generator::Text(k) => generators::string::generate(*k, args, rng),
            Generator::Number(k) => generators::number::generate(*k, args, rng),
            Generator::Date(k) => generators::date::generate(*k, args, rng),
            Generator::Bool => Ok(GeneratedValue::Bool(rng.gen_bool(0.5))),
            Generator::Enum => Ok(generators::pick_enum(args, rng)),
            Generator::Sequence => generators::id::sequence(&args[0]),
            Generator::Uuid => Ok(generators::id::uuid(rng)),
        }
    }
}

/// Produce one value for `d`, advancing `last_auto_id` when it hands out a sequence id.
pub fn generate_field<R: Rng + ?Sized>(
    d: &FieldDescriptor,
    last_auto_id: &mut u64,
    rng: &mut R,
) -> Result<GeneratedValue, GenError> {
    let generator = Generator::for_descriptor(d)?;
    let args = resolve_params(d, last_auto_id)?;
    generator.generate(&args, rng)
}

/// Dry-run `d` through lookup, resolution and generation without touching any table state.
pub fn check(d: &FieldDescriptor) -> Result<Generator, GenError> {
    let generator = Generator::for_descriptor(d)?;
    let mut scratch = 1;
    let args = resolve_params(d, &mut scratch)?;
    generator.generate(&args, &mut StdRng::seed_from_u64(0))?;
    Ok(generator)
}
