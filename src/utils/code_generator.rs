//! Random short code generation.
//!
//! Codes are drawn uniformly from the 62-character alphabet `A-Z a-z 0-9`.
//! The randomness source is always supplied by the caller: [`generate_code`]
//! takes an RNG, and the service receives a [`CodeGenerator`] so tests can
//! substitute a deterministic one.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated codes unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Draws `length` independent, uniformly random alphanumeric characters.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use tinylink::utils::code_generator::generate_code;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let code = generate_code(&mut rng, 6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Source of candidate short codes for the link service.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Returns a fresh candidate code of exactly `length` characters.
    fn generate(&self, length: usize) -> String;
}

/// Generator backed by the thread-local cryptographically secure RNG.
///
/// Unpredictable output keeps codes from being guessed before they are
/// assigned.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> String {
        generate_code(&mut rand::rng(), length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validators::is_valid_code;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_requested_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for length in [6, 7, 8] {
            assert_eq!(generate_code(&mut rng, length).len(), length);
        }
    }

    #[test]
    fn test_generate_code_is_valid_code() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let code = generate_code(&mut rng, DEFAULT_CODE_LENGTH);
            assert!(is_valid_code(&code), "generated invalid code {code:?}");
        }
    }

    #[test]
    fn test_generate_code_is_deterministic_for_seed() {
        let a = generate_code(&mut StdRng::seed_from_u64(42), 8);
        let b = generate_code(&mut StdRng::seed_from_u64(42), 8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_code_covers_alphabet() {
        let mut rng = StdRng::seed_from_u64(3);
        let seen: HashSet<char> = (0..2000)
            .flat_map(|_| generate_code(&mut rng, 8).chars().collect::<Vec<_>>())
            .collect();

        assert!(seen.iter().any(|c| c.is_ascii_uppercase()));
        assert!(seen.iter().any(|c| c.is_ascii_lowercase()));
        assert!(seen.iter().any(|c| c.is_ascii_digit()));
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn test_random_generator_produces_unique_codes() {
        let generator = RandomCodeGenerator;
        let codes: HashSet<String> = (0..1000).map(|_| generator.generate(8)).collect();

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_zero_length() {
        assert!(RandomCodeGenerator.generate(0).is_empty());
    }
}
