//! Password generator.
//!
//! Every enabled character class contributes at least one character; the
//! remaining positions are drawn uniformly from the union of all enabled
//! classes, then the whole password is shuffled. Randomness comes from the
//! operating system (`OsRng`) unless a generator is passed in.

use rand::Rng;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use std::fmt;
use thiserror::Error;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>/?~";
/// Characters easily confused with one another in many fonts.
const AMBIGUOUS: &str = "il1Lo0O|";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    #[error("enable at least one character class")]
    NoClasses,
    #[error("length must be between {min} and {max}, got {length}")]
    Length {
        length: usize,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
    pub exclude_ambiguous: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
            exclude_ambiguous: false,
        }
    }
}

impl PasswordOptions {
    /// Enabled classes, each as its list of usable characters.
    fn classes(&self) -> Vec<Vec<char>> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, set)| {
            set.chars()
                .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(*c)))
                .collect()
        })
        .collect()
    }

    fn validate(&self) -> Result<Vec<Vec<char>>, PasswordError> {
        let classes = self.classes();
        if classes.is_empty() {
            return Err(PasswordError::NoClasses);
        }
        let min = MIN_LENGTH.max(classes.len());
        if !(min..=MAX_LENGTH).contains(&self.length) {
            return Err(PasswordError::Length {
                length: self.length,
                min,
                max: MAX_LENGTH,
            });
        }
        Ok(classes)
    }

    /// Size of the character pool.
    pub fn pool_size(&self) -> usize {
        self.classes().iter().map(Vec::len).sum()
    }

    /// Entropy in bits of a password drawn from the pool.
    pub fn entropy_bits(&self) -> f64 {
        let pool = self.pool_size();
        if pool == 0 {
            return 0.0;
        }
        self.length as f64 * (pool as f64).log2()
    }

    pub fn strength(&self) -> Strength {
        Strength::for_entropy(self.entropy_bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn for_entropy(bits: f64) -> Self {
        if bits < 40.0 {
            Self::Weak
        } else if bits < 60.0 {
            Self::Fair
        } else if bits < 80.0 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        })
    }
}

/// Generate with an explicit random source.
pub fn generate_with(
    options: &PasswordOptions,
    rng: &mut impl Rng,
) -> Result<String, PasswordError> {
    let classes = options.validate()?;
    let pool: Vec<char> = classes.iter().flatten().copied().collect();

    let mut chars: Vec<char> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    while chars.len() < options.length {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }
    chars.shuffle(rng);
    Ok(chars.into_iter().collect())
}

/// Generate using the operating system's random source.
pub fn generate(options: &PasswordOptions) -> Result<String, PasswordError> {
    generate_with(options, &mut OsRng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn has_any(password: &str, set: &str) -> bool {
        password.chars().any(|c| set.contains(c))
    }

    #[test]
    fn default_password_has_every_class() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let pw = generate_with(&PasswordOptions::default(), &mut rng).unwrap();
            assert_eq!(pw.chars().count(), 16);
            assert!(has_any(&pw, LOWERCASE));
            assert!(has_any(&pw, UPPERCASE));
            assert!(has_any(&pw, DIGITS));
            assert!(has_any(&pw, SYMBOLS));
        }
    }

    #[test]
    fn minimum_length_still_has_every_class() {
        let options = PasswordOptions {
            length: 4,
            ..PasswordOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let pw = generate_with(&options, &mut rng).unwrap();
            assert!(has_any(&pw, LOWERCASE) && has_any(&pw, UPPERCASE));
            assert!(has_any(&pw, DIGITS) && has_any(&pw, SYMBOLS));
        }
    }

    #[test]
    fn digits_only() {
        let options = PasswordOptions {
            length: 8,
            lowercase: false,
            uppercase: false,
            digits: true,
            symbols: false,
            exclude_ambiguous: false,
        };
        let pw = generate_with(&options, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(pw.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn exclude_ambiguous_characters() {
        let options = PasswordOptions {
            length: 64,
            exclude_ambiguous: true,
            ..PasswordOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let pw = generate_with(&options, &mut rng).unwrap();
            assert!(!has_any(&pw, AMBIGUOUS), "{pw}");
        }
    }

    #[test]
    fn no_classes_is_error() {
        let options = PasswordOptions {
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        assert_eq!(generate(&options), Err(PasswordError::NoClasses));
    }

    #[test]
    fn length_bounds() {
        let too_short = PasswordOptions {
            length: 3,
            ..PasswordOptions::default()
        };
        assert!(matches!(
            generate(&too_short),
            Err(PasswordError::Length { length: 3, .. })
        ));
        let too_long = PasswordOptions {
            length: MAX_LENGTH + 1,
            ..PasswordOptions::default()
        };
        assert!(generate(&too_long).is_err());
    }

    #[test]
    fn os_rng_generates() {
        let pw = generate(&PasswordOptions::default()).unwrap();
        assert_eq!(pw.len(), 16);
    }

    #[test]
    fn entropy_and_strength() {
        let options = PasswordOptions::default();
        assert_eq!(options.pool_size(), 26 + 26 + 10 + SYMBOLS.len());
        let pin = PasswordOptions {
            length: 6,
            lowercase: false,
            uppercase: false,
            digits: true,
            symbols: false,
            exclude_ambiguous: false,
        };
        assert!((pin.entropy_bits() - 6.0 * 10f64.log2()).abs() < 1e-9);
        assert_eq!(pin.strength(), Strength::Weak);
        assert_eq!(options.strength(), Strength::VeryStrong);
    }
}
