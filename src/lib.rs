//! Proxy and multisig transaction wrapping engine for Substrate wallets.
//!
//! The crate routes a single intended call from a signing wallet to the account that owns it,
//! through proxy delegation and/or multisig co-signing, tracks multisig approvals against their
//! threshold and aggregates the proxy deposits a wallet has to keep an eye on.

pub mod aggregator;
pub mod configuration;
pub mod error;
pub mod node;
pub mod notification;
pub mod observer;
pub mod operation;
pub mod prelude;
pub mod primitive;
pub mod storage;
pub mod tracker;
pub mod util;
pub mod wrapper;

pub use error::Error;
