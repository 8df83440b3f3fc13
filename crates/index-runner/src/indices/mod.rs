//! Index Definitions
//!
//! Each index is a profile (factors, weights, bands, reply schema) plus the
//! fetch order and raw columns of its history table.

pub mod altcoin_season;
pub mod fear_greed;

pub use altcoin_season::AltcoinSeason;
pub use fear_greed::FearGreed;
