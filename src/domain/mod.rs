//! Domain types for names, prices and record sets.

pub mod name;
pub mod records;

pub use name::{tier, Name, PriceTier, TLD};
pub use records::{Address, MintedEntry, RecordField, RecordSet};
