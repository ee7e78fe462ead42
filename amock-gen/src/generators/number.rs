//! Numeric generators. Bounds arrive as resolved `(min, max)` pairs where `x` is open.

use amock_types::GeneratedValue;
use rand::Rng;

use crate::resolve::parse_bound;
use crate::{Arity, GenError};

/// Upper bound used when a range is open on the right.
const OPEN_MAX: i64 = i32::MAX as i64;
const DEFAULT_PRECISION: usize = 2;
const MAX_PRECISION: usize = 15;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumberKind {
    /// Integer, same contract as `Int`.
    Root,
    Int,
    Float,
    /// Float between two required bounds.
    Range,
    /// `precision[, min, max]`, rounded to `precision` places.
    Decimal,
}

impl NumberKind {
    pub fn from_subtype(s: &str) -> Option<Self> {
        Some(match s {
            "int" => NumberKind::Int,
            "float" => NumberKind::Float,
            "range" => NumberKind::Range,
            "decimal" => NumberKind::Decimal,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::Root => "root",
            NumberKind::Int => "int",
            NumberKind::Float => "float",
            NumberKind::Range => "range",
            NumberKind::Decimal => "decimal",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            NumberKind::Root | NumberKind::Int | NumberKind::Float => Arity::OneOf(&[0, 2]),
            NumberKind::Range => Arity::Exactly(2),
            NumberKind::Decimal => Arity::OneOf(&[0, 1, 3]),
        }
    }
}

pub fn generate<R: Rng + ?Sized>(kind: NumberKind, args: &[String], rng: &mut R) -> Result<GeneratedValue, GenError> {
    match kind {
        NumberKind::Root | NumberKind::Int => {
            let (min, max) = bounds::<i64>(args)?;
            int_range(rng, min, max).map(GeneratedValue::Int)
        }
        NumberKind::Float | NumberKind::Range => {
            let (min, max) = bounds::<f64>(args)?;
            float_range(rng, min, max).map(GeneratedValue::Float)
        }
        NumberKind::Decimal => {
            let precision = match args.first() {
                Some(p) => p.trim().parse::<usize>().map_err(|_| GenError::InvalidParam {
                    param: p.clone(),
                    reason: "decimal precision must be a non-negative integer".into(),
                })?,
                None => DEFAULT_PRECISION,
            };
            let (min, max) = if args.len() == 3 { bounds::<f64>(&args[1..])? } else { (None, None) };
            let value = float_range(rng, min, max)?;
            Ok(GeneratedValue::Float(round_to(value, precision.min(MAX_PRECISION))))
        }
    }
}

fn bounds<T: std::str::FromStr>(args: &[String]) -> Result<(Option<T>, Option<T>), GenError> {
    match args {
        [min, max] => Ok((parse_bound(min)?, parse_bound(max)?)),
        _ => Ok((None, None)),
    }
}

/// Both sides open means unconstrained: `[0, OPEN_MAX]`.
pub fn int_range<R: Rng + ?Sized>(rng: &mut R, min: Option<i64>, max: Option<i64>) -> Result<i64, GenError> {
    let lo = min.unwrap_or_else(|| max.map_or(0, |hi| hi.min(0)));
    let hi = max.unwrap_or_else(|| lo.max(OPEN_MAX));
    if lo > hi {
        return Err(empty_range(lo, hi));
    }
    Ok(rng.gen_range(lo..=hi))
}

/// Both sides open means unconstrained: `[0, 1)`.
pub fn float_range<R: Rng + ?Sized>(rng: &mut R, min: Option<f64>, max: Option<f64>) -> Result<f64, GenError> {
    if min.is_none() && max.is_none() {
        return Ok(rng.gen::<f64>());
    }
    let lo = min.unwrap_or_else(|| max.map_or(0.0, |hi| hi.min(0.0)));
    let hi = max.unwrap_or_else(|| lo.max(OPEN_MAX as f64));
    if !(lo.is_finite() && hi.is_finite()) || lo > hi {
        return Err(empty_range(lo, hi));
    }
    Ok(rng.gen_range(lo..=hi))
}

fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

fn empty_range(lo: impl std::fmt::Display, hi: impl std::fmt::Display) -> GenError {
    GenError::InvalidParam {
        param: format!("{lo}-{hi}"),
        reason: "range is empty".into(),
    }
}
