//! Names and the length-based registration price schedule.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cosmetic top-level tag appended for display only. Never sent to the ledger.
pub const TLD: &str = ".brock";

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 12;

/// A name that passed the length check and can be used as a ledger key verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Returns `None` for anything outside `[MIN_NAME_LEN, MAX_NAME_LEN]` characters.
    /// Callers treat `None` as "ignore the input", not as an error.
    ///
    /// Length is counted in Unicode scalar values (`chars()`), not UTF-16 code units, so a name
    /// with characters outside the Basic Multilingual Plane (most emoji) counts each of them
    /// once. A browser's `String.length` would count them twice.
    pub fn parse(input: &str) -> Option<Self> {
        let len = input.chars().count();
        if (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
            Some(Self(input.to_string()))
        } else {
            None
        }
    }

    /// The ledger key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn display_name(&self) -> String {
        format!("{}{}", self.0, TLD)
    }

    pub fn price_tier(&self) -> PriceTier {
        PriceTier::for_length(self.len())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration price, derived only from name length.
///
/// 3 chars = 0.5, 4 chars = 0.3, 5 or more = 0.1 (native currency units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    ThreeChars,
    FourChars,
    Standard,
}

impl PriceTier {
    /// Total over lengths >= 3; the caller guarantees the precondition.
    pub fn for_length(len: usize) -> Self {
        match len {
            3 => PriceTier::ThreeChars,
            4 => PriceTier::FourChars,
            _ => PriceTier::Standard,
        }
    }

    /// Human-readable amount in whole currency units.
    pub fn amount(&self) -> &'static str {
        match self {
            PriceTier::ThreeChars => "0.5",
            PriceTier::FourChars => "0.3",
            PriceTier::Standard => "0.1",
        }
    }

    /// Amount in wei (18 decimals), sent as the transaction value on register.
    pub fn wei(&self) -> U256 {
        let tenths: u64 = match self {
            PriceTier::ThreeChars => 5,
            PriceTier::FourChars => 3,
            PriceTier::Standard => 1,
        };
        U256::from(tenths) * U256::exp10(17)
    }
}

/// PriceTierPolicy as a plain function.
pub fn tier(name_length: usize) -> PriceTier {
    PriceTier::for_length(name_length)
}
