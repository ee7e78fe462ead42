use amock_types::GeneratedValue;
use rand::Rng;
use uuid::Builder;

use crate::GenError;

/// The resolver hands the next counter value in as the only argument.
pub fn sequence(arg: &str) -> Result<GeneratedValue, GenError> {
    let id = arg.trim().parse::<u64>().map_err(|_| GenError::InvalidParam {
        param: arg.to_string(),
        reason: "sequence start must be a non-negative integer".into(),
    })?;
    i64::try_from(id)
        .map(GeneratedValue::Int)
        .map_err(|_| GenError::InvalidParam {
            param: arg.to_string(),
            reason: "sequence value out of range".into(),
        })
}

/// Random v4 UUID, hyphenated (36 characters).
pub fn uuid<R: Rng + ?Sized>(rng: &mut R) -> GeneratedValue {
    let bytes: [u8; 16] = rng.gen();
    GeneratedValue::Text(Builder::from_random_bytes(bytes).into_uuid().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uuid_is_canonical() {
        let mut rng = StdRng::seed_from_u64(9);
        let GeneratedValue::Text(id) = uuid(&mut rng) else { panic!("not text") };
        assert_eq!(id.len(), 36);
        assert_eq!(id.as_bytes()[14], b'4');
    }

    #[test]
    fn sequence_parses_counter() {
        assert_eq!(sequence("12").unwrap(), GeneratedValue::Int(12));
        assert!(sequence("-1").is_err());
        assert!(sequence("abc").is_err());
    }
}
