//! Probabilistic noise injection.
//!
//! Each input character is kept, and after it a random substitute character
//! may be inserted. The output is never shorter than the input.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive range of characters that noise is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAlphabet", into = "RawAlphabet")]
pub struct SubstituteAlphabet {
    start: char,
    end: char,
}

#[derive(Serialize, Deserialize)]
struct RawAlphabet {
    start: u32,
    end: u32,
}

impl SubstituteAlphabet {
    /// CJK symbols, Hiragana and Katakana.
    pub const DEFAULT: SubstituteAlphabet = SubstituteAlphabet {
        start: '\u{3000}',
        end: '\u{30FF}',
    };

    /// Create an alphabet from code points.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        let start = char::from_u32(start).ok_or_else(|| {
            Error::InvalidConfig(format!("alphabet start U+{:04X} is not a character", start))
        })?;
        let end = char::from_u32(end).ok_or_else(|| {
            Error::InvalidConfig(format!("alphabet end U+{:04X} is not a character", end))
        })?;
        if start > end {
            return Err(Error::InvalidConfig(format!(
                "alphabet range U+{:04X}..=U+{:04X} is empty",
                start as u32, end as u32
            )));
        }
        Ok(Self { start, end })
    }

    /// The character range.
    pub fn range(&self) -> RangeInclusive<char> {
        self.start..=self.end
    }

    /// Check whether a character belongs to the alphabet.
    pub fn contains(&self, c: char) -> bool {
        self.range().contains(&c)
    }

    /// Draw one character uniformly.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        rng.random_range(self.range())
    }
}

impl Default for SubstituteAlphabet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<RawAlphabet> for SubstituteAlphabet {
    type Error = Error;

    fn try_from(raw: RawAlphabet) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl From<SubstituteAlphabet> for RawAlphabet {
    fn from(alphabet: SubstituteAlphabet) -> Self {
        Self {
            start: alphabet.start as u32,
            end: alphabet.end as u32,
        }
    }
}

/// Inserts random substitute characters into text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseInjector {
    level: f64,
    alphabet: SubstituteAlphabet,
}

impl NoiseInjector {
    /// Create an injector. `level` is the per-character insertion probability.
    pub fn new(level: f64, alphabet: SubstituteAlphabet) -> Result<Self> {
        if !level.is_finite() || !(0.0..=1.0).contains(&level) {
            return Err(Error::InvalidConfig(format!(
                "noise level must be within [0, 1], got {}",
                level
            )));
        }
        Ok(Self { level, alphabet })
    }

    /// Noise `text` using `rng`.
    pub fn inject<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        if self.level == 0.0 {
            return text.to_string();
        }

        let mut noised = String::with_capacity(text.len() * 2);
        for c in text.chars() {
            noised.push(c);
            if rng.random_bool(self.level) {
                noised.push(self.alphabet.sample(rng));
            }
        }
        noised
    }
}

/// Noise `text` with the default alphabet and the thread-local generator.
pub fn add_noise(text: &str, level: f64) -> Result<String> {
    let injector = NoiseInjector::new(level, SubstituteAlphabet::default())?;
    Ok(injector.inject(text, &mut rand::rng()))
}
