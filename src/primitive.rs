mod account;
pub use account::*;

mod call;
pub use call::*;

mod multisig;
pub use multisig::*;

mod proxy;
pub use proxy::*;

mod runtime;
pub use runtime::*;

// crates.io
use serde::{Deserialize, Serialize};
// multiwrap
use crate::util;

pub type BlockNumber = u32;
pub type AccountId = [u8; 32];
pub type ChainId = [u8; 32];
pub type CallHash = [u8; 32];
pub type ExtrinsicHash = [u8; 32];
pub type Balance = u128;
pub type WalletId = u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
	#[serde(with = "util::hex")]
	pub chain_id: ChainId,
	pub name: String,
	pub address_prefix: u16,
}
