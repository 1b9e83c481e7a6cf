// crates.io
use serde::{Deserialize, Serialize};
// multiwrap
use crate::{prelude::*, util};

/// Block height and extrinsic index at which a multisig call was first seen.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timepoint {
	pub height: BlockNumber,
	pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultisigStatus {
	Signing,
	Executed,
	Cancelled,
	Error,
}
impl MultisigStatus {
	pub fn is_terminal(self) -> bool {
		self != Self::Signing
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SigningStatus {
	Signed,
	Cancelled,
	ErrorSigned,
	ErrorCancelled,
	PendingSigned,
}
impl SigningStatus {
	/// A confirmed approval or rejection, at most one per account.
	pub fn is_final(self) -> bool {
		matches!(self, Self::Signed | Self::Cancelled)
	}

	pub fn is_error(self) -> bool {
		matches!(self, Self::ErrorSigned | Self::ErrorCancelled)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MultisigEvent {
	#[serde(with = "util::hex")]
	pub account_id: AccountId,
	pub status: SigningStatus,
	#[serde(default, with = "util::hex_option")]
	pub extrinsic_hash: Option<ExtrinsicHash>,
	#[serde(default)]
	pub event_block: Option<BlockNumber>,
	#[serde(default)]
	pub event_index: Option<u32>,
	/// Unix time in milliseconds.
	pub date_created: u64,
}
impl MultisigEvent {
	pub fn new(account_id: AccountId, status: SigningStatus, date_created: u64) -> Self {
		Self {
			account_id,
			status,
			extrinsic_hash: None,
			event_block: None,
			event_index: None,
			date_created,
		}
	}

	pub fn at(mut self, timepoint: Timepoint) -> Self {
		self.event_block = Some(timepoint.height);
		self.event_index = Some(timepoint.index);

		self
	}

	pub fn timepoint(&self) -> Option<Timepoint> {
		Some(Timepoint { height: self.event_block?, index: self.event_index? })
	}
}

/// Natural key of a multisig transaction.
#[derive(
	Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub struct MultisigKey {
	#[serde(with = "util::hex")]
	pub account_id: AccountId,
	#[serde(with = "util::hex")]
	pub chain_id: ChainId,
	#[serde(with = "util::hex")]
	pub call_hash: CallHash,
	pub timepoint: Timepoint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MultisigTransaction {
	#[serde(with = "util::hex")]
	pub account_id: AccountId,
	#[serde(with = "util::hex")]
	pub chain_id: ChainId,
	#[serde(with = "util::hex")]
	pub call_hash: CallHash,
	pub block_created: BlockNumber,
	pub index_created: u32,
	#[serde(default, with = "util::hex_vec_option")]
	pub call_data: Option<Vec<u8>>,
	#[serde(with = "util::hex")]
	pub depositor: AccountId,
	pub status: MultisigStatus,
	#[serde(default)]
	pub events: Vec<MultisigEvent>,
}
impl MultisigTransaction {
	pub fn new(
		account_id: AccountId,
		chain_id: ChainId,
		call_hash: CallHash,
		timepoint: Timepoint,
		depositor: AccountId,
	) -> Self {
		Self {
			account_id,
			chain_id,
			call_hash,
			block_created: timepoint.height,
			index_created: timepoint.index,
			call_data: None,
			depositor,
			status: MultisigStatus::Signing,
			events: Vec::new(),
		}
	}

	pub fn key(&self) -> MultisigKey {
		MultisigKey {
			account_id: self.account_id,
			chain_id: self.chain_id,
			call_hash: self.call_hash,
			timepoint: self.timepoint(),
		}
	}

	pub fn timepoint(&self) -> Timepoint {
		Timepoint { height: self.block_created, index: self.index_created }
	}
}
