//! Record sets attached to registered names, and the minted list entries.

use primitive_types::H160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// A 20-byte account address. Parsing is case-insensitive, so equality is too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(H160);

impl Address {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(H160::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| anyhow::anyhow!("address must start with 0x: {}", s))?;
        if hex_part.len() != 40 {
            return Err(anyhow::anyhow!("address must have 40 hex characters: {}", s));
        }
        let bytes = hex::decode(hex_part)?;
        Ok(Self(H160::from_slice(&bytes)))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The editable fields of a record set. The owner address is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Avatar,
    SocialHandle,
    Website,
    Email,
    Description,
}

impl RecordField {
    /// In ledger order.
    pub const ALL: [RecordField; 5] = [
        RecordField::Avatar,
        RecordField::SocialHandle,
        RecordField::Website,
        RecordField::Email,
        RecordField::Description,
    ];

    /// Field selector understood by the registry contract.
    pub fn selector(&self) -> u8 {
        match self {
            RecordField::Avatar => 0,
            RecordField::SocialHandle => 1,
            RecordField::Website => 2,
            RecordField::Email => 3,
            RecordField::Description => 4,
        }
    }
}

/// Profile attached to exactly one name on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub avatar: String,
    pub social_handle: String,
    pub website: String,
    pub email: String,
    pub description: String,
    pub owner: Address,
}

impl RecordSet {
    /// An empty record set, as the registry holds right after register.
    pub fn unset(owner: Address) -> Self {
        Self {
            avatar: String::new(),
            social_handle: String::new(),
            website: String::new(),
            email: String::new(),
            description: String::new(),
            owner,
        }
    }

    /// Builds a record set from the registry's value list, indexed by field selector.
    /// Missing trailing values are treated as unset.
    pub fn from_ledger_values(values: &[String], owner: Address) -> Self {
        let mut records = Self::unset(owner);
        for field in RecordField::ALL {
            if let Some(v) = values.get(field.selector() as usize) {
                records.set(field, v.clone());
            }
        }
        records
    }

    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::Avatar => &self.avatar,
            RecordField::SocialHandle => &self.social_handle,
            RecordField::Website => &self.website,
            RecordField::Email => &self.email,
            RecordField::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: RecordField, value: String) {
        match field {
            RecordField::Avatar => self.avatar = value,
            RecordField::SocialHandle => self.social_handle = value,
            RecordField::Website => self.website = value,
            RecordField::Email => self.email = value,
            RecordField::Description => self.description = value,
        }
    }

    /// Only the owner may edit; everyone else sees the record read-only.
    pub fn is_editable_by(&self, account: Option<&Address>) -> bool {
        account.is_some_and(|a| *a == self.owner)
    }
}

/// One row of the recently minted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintedEntry {
    /// 1-based, position of the name's first occurrence in the enumeration.
    pub id: usize,
    pub name: String,
    /// Summary record (the description field).
    pub record: String,
    pub owner: Address,
}
