// crates.io
use scale_decode::DecodeAsType;
use subxt::{dynamic::DecodedValue, events::StaticEvent, utils::AccountId32};
// multiwrap
use crate::prelude::*;

#[derive(Debug, DecodeAsType)]
pub struct ETimepoint {
	pub height: BlockNumber,
	pub index: u32,
}

#[derive(Debug, DecodeAsType)]
pub struct EMultisigExecuted {
	pub approving: AccountId32,
	pub timepoint: ETimepoint,
	pub multisig: AccountId32,
	pub call_hash: [u8; 32],
	pub result: StdResult<(), DecodedValue>,
}
impl EMultisigExecuted {
	pub fn into_dispatch_result(self) -> DispatchResult {
		match self.result {
			Ok(()) => Ok(()),
			Err(v) => Err(format!("{v:?}")),
		}
	}
}
impl StaticEvent for EMultisigExecuted {
	const EVENT: &'static str = "MultisigExecuted";
	const PALLET: &'static str = "Multisig";
}

#[derive(Debug, DecodeAsType)]
pub struct EProxyExecuted {
	pub result: StdResult<(), DecodedValue>,
}
impl EProxyExecuted {
	pub fn into_dispatch_result(self) -> DispatchResult {
		match self.result {
			Ok(()) => Ok(()),
			Err(v) => Err(format!("{v:?}")),
		}
	}
}
impl StaticEvent for EProxyExecuted {
	const EVENT: &'static str = "ProxyExecuted";
	const PALLET: &'static str = "Proxy";
}
