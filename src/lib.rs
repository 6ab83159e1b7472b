//! farmlens - read-only lens over a yield farm registry
//!
//! Scans the registry's pools once into a cache, classifies each deposit
//! token as a single token or a liquidity pair, and reports what an address
//! has staked and earned, with pair shares broken down into the underlying
//! tokens they redeem for.

pub mod chain;
pub mod config;
pub mod farms;
pub mod service;
pub mod units;
