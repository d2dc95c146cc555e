//! Domain layer for transaction building.

pub mod amount;
pub mod assets;
pub mod errors;
pub mod fees;
