//! Turns a descriptor's raw parameter section into the argument list a generator expects.

use amock_schema::{FieldDescriptor, FieldType};
use amock_types::MAX_SEQUENCE;

use crate::GenError;

/// Marks an open side of a numeric range (`x-10`, `5-x`).
pub const UNBOUNDED: &str = "x";

/// Resolve the arguments for one generation of `d`.
///
/// A sequence identifier consumes the table counter; a literal parameter (`id:100`) is a
/// starting value the counter jumps to. Numeric range tokens expand to two arguments
/// (min, max); everything else passes through verbatim.
pub fn resolve_params(d: &FieldDescriptor, last_auto_id: &mut u64) -> Result<Vec<String>, GenError> {
    if d.is_sequence() {
        let id = next_sequence(d.params.as_deref(), *last_auto_id)?;
        // `id <= MAX_SEQUENCE`, so this cannot overflow a u64.
        *last_auto_id = id + 1;
        return Ok(vec![id.to_string()]);
    }

    let mut args = Vec::new();
    for token in d.param_list() {
        if d.field_type == FieldType::Number {
            if let Some((min, max)) = split_range(token)? {
                args.push(min.to_string());
                args.push(max.to_string());
                continue;
            }
        }
        args.push(token.to_string());
    }
    Ok(args)
}

/// The id to hand out: the counter, or the literal start if it is ahead of the counter.
fn next_sequence(start: Option<&str>, counter: u64) -> Result<u64, GenError> {
    let id = match start {
        None => counter,
        Some(raw) => {
            let start = raw.trim().parse::<u64>().map_err(|_| GenError::InvalidParam {
                param: raw.to_string(),
                reason: "sequence start must be a non-negative integer".into(),
            })?;
            start.max(counter)
        }
    };
    if id > MAX_SEQUENCE {
        return Err(GenError::InvalidParam {
            param: id.to_string(),
            reason: format!("sequence exhausted (ids stop at {MAX_SEQUENCE})"),
        });
    }
    Ok(id)
}

/// Split `<min>-<max>`. A leading `-` is a sign, not the separator.
fn split_range(token: &str) -> Result<Option<(&str, &str)>, GenError> {
    let token = token.trim();
    let Some(pos) = token
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i)
    else {
        return Ok(None);
    };

    let (min, max) = (token[..pos].trim(), token[pos + 1..].trim());
    for bound in [min, max] {
        if bound != UNBOUNDED && bound.parse::<f64>().is_err() {
            return Err(GenError::InvalidParam {
                param: token.to_string(),
                reason: format!("range bound {bound:?} is neither a number nor `{UNBOUNDED}`"),
            });
        }
    }
    Ok(Some((min, max)))
}

/// Parse one resolved bound; `x` yields `None`.
pub(crate) fn parse_bound<T: std::str::FromStr>(raw: &str) -> Result<Option<T>, GenError> {
    let raw = raw.trim();
    if raw == UNBOUNDED {
        return Ok(None);
    }
    raw.parse::<T>().map(Some).map_err(|_| GenError::InvalidParam {
        param: raw.to_string(),
        reason: "not a number".into(),
    })
}
