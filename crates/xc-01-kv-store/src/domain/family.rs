//! # Column Families
//!
//! Named partitions isolating logically distinct record types.

use super::errors::StoreError;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Block,
    Transaction,
    Contract,
    Storage,
    HeaderHashList,
    Metadata,
    /// Engine-opaque blobs outside the structured partitions.
    GeneralStorage,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::Block,
        Family::Transaction,
        Family::Contract,
        Family::Storage,
        Family::HeaderHashList,
        Family::Metadata,
        Family::GeneralStorage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Family::Block => "data:block",
            Family::Transaction => "data:transaction",
            Family::Contract => "st:contract",
            Family::Storage => "st:storage",
            Family::HeaderHashList => "ix:header-hash-list",
            Family::Metadata => "metadata",
            Family::GeneralStorage => "general-storage",
        }
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(|f| f.name())
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| StoreError::UnknownFamily(s.to_string()))
    }
}
