// crates.io
use scale_value::Composite;
use serde::{Deserialize, Serialize};
use subxt::{
	dynamic::{self, Value},
	tx::Payload,
};
// multiwrap
use crate::{prelude::*, util};

/// Full block weight on the relay chains, declared when the real weight of a multisig dispatch
/// could not be resolved.
///
/// Overestimating only costs a higher reserved fee, underestimating fails the dispatch.
pub const MAX_WEIGHT: Weight = Weight { ref_time: 2_000_000_000_000, proof_size: 5 * 1024 * 1024 };

/// A runtime call built from dynamic values, encoded against the node metadata on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
	pub pallet: String,
	pub name: String,
	pub fields: Vec<Value>,
}
impl Call {
	pub fn new(pallet: impl Into<String>, name: impl Into<String>, fields: Vec<Value>) -> Self {
		Self { pallet: pallet.into(), name: name.into(), fields }
	}

	pub fn is(&self, pallet: &str, name: &str) -> bool {
		self.pallet == pallet && self.name == name
	}

	pub fn payload(&self) -> Payload<Composite<()>> {
		dynamic::tx(self.pallet.as_str(), self.name.as_str(), self.fields.clone())
	}

	/// The call as a `RuntimeCall` value, ready to be nested into another call.
	pub fn into_value(self) -> Value {
		self.payload().into_value()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Weight {
	pub ref_time: u64,
	pub proof_size: u64,
}
impl Weight {
	pub fn value(&self) -> Value {
		Value::named_composite([
			("ref_time", Value::u128(self.ref_time as _)),
			("proof_size", Value::u128(self.proof_size as _)),
		])
	}
}

/// Encodes a call into its SCALE call data, the preimage of a multisig call hash.
pub trait CallEncoder {
	fn encode_call(&self, call: &Call) -> Result<Vec<u8>>;

	fn call_hash(&self, call: &Call) -> Result<CallHash> {
		Ok(util::call_hash(&self.encode_call(call)?))
	}
}

/// Deterministic stand-in for the metadata encoder.
#[cfg(test)]
pub(crate) struct DebugEncoder;
#[cfg(test)]
impl CallEncoder for DebugEncoder {
	fn encode_call(&self, call: &Call) -> Result<Vec<u8>> {
		Ok(format!("{call:?}").into_bytes())
	}
}

#[test]
fn call_should_work() {
	let transfer = Call::new(
		"Balances",
		"transfer_keep_alive",
		vec![util::multi_address(&[1; 32]), Value::u128(10)],
	);

	assert!(transfer.is("Balances", "transfer_keep_alive"));
	assert!(!transfer.is("Balances", "transfer_all"));
	assert_eq!(
		DebugEncoder.call_hash(&transfer).unwrap(),
		util::call_hash(&DebugEncoder.encode_call(&transfer).unwrap())
	);
	assert_ne!(
		DebugEncoder.call_hash(&transfer).unwrap(),
		DebugEncoder.call_hash(&Call { fields: Vec::new(), ..transfer }).unwrap()
	);
}
