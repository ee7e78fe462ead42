//! Generator families. Each family module owns its subtype enum and argument contract.

pub mod date;
pub mod id;
pub mod number;
pub mod string;

use amock_types::GeneratedValue;
use rand::Rng;

/// Return one candidate verbatim.
pub fn pick_enum<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> GeneratedValue {
    let idx = rng.gen_range(0..candidates.len());
    GeneratedValue::Text(candidates[idx].clone())
}

/// Optional non-negative count argument (`string:12`, `sentence:5`).
pub(crate) fn count_arg(args: &[String], min: usize) -> Result<Option<usize>, crate::GenError> {
    let Some(raw) = args.first() else { return Ok(None) };
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= min => Ok(Some(n)),
        _ => Err(crate::GenError::InvalidParam {
            param: raw.clone(),
            reason: format!("expected an integer >= {min}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn enum_returns_a_candidate() {
        let mut rng = StdRng::seed_from_u64(3);
        let candidates: Vec<String> = ["draft", "live"].iter().map(|s| s.to_string()).collect();
        for _ in 0..20 {
            let GeneratedValue::Text(v) = pick_enum(&candidates, &mut rng) else { panic!("not text") };
            assert!(candidates.contains(&v));
        }
    }

    #[test]
    fn count_arg_bounds() {
        assert_eq!(count_arg(&[], 1).unwrap(), None);
        assert_eq!(count_arg(&["4".to_string()], 1).unwrap(), Some(4));
        assert!(count_arg(&["0".to_string()], 1).is_err());
        assert!(count_arg(&["many".to_string()], 0).is_err());
    }
}
