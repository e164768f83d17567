use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Codes are short enough to read over a shoulder but drawn from a space
/// large enough (36^4, ~1.6M) that collisions against live rooms stay rare.
pub const CODE_LEN: usize = 4;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A canonical (uppercase) room code. All lookups go through this type, so
/// clients may type codes in any case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Canonicalize raw client input: trim surrounding whitespace and
    /// uppercase, since codes compare case-insensitively.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    pub fn generate(rng: &mut impl Rng) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_canonicalizes_case_and_whitespace() {
        assert_eq!(RoomCode::new("ab12"), RoomCode::new("AB12"));
        assert_eq!(RoomCode::new(" ab12 ").as_str(), "AB12");
    }

    #[test]
    fn test_generated_codes_use_canonical_alphabet() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let code = RoomCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| CODE_ALPHABET.contains(&b)));
            // Already canonical: re-parsing is a no-op.
            assert_eq!(RoomCode::new(code.as_str()), code);
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let code = RoomCode::new("ab12");
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"AB12\"");
        let back: RoomCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}
