//! Engine failures.
//!
//! Resolution and validation failures are recovered locally, the flow stays interactive.
//! Rejections and step violations are facts the caller has to surface.

// crates.io
use thiserror::Error as ThisError;
// multiwrap
use crate::{
	operation::Step,
	primitive::{AccountId, CallHash, MultisigStatus},
};

#[derive(Debug, ThisError)]
pub enum Error {
	#[error("operation unavailable, no signer path reaches the target account")]
	Unavailable,
	#[error(transparent)]
	Validation(#[from] Validation),
	#[error(transparent)]
	Rejected(#[from] Rejection),
	#[error("operation is at step({actual:?}), expected {expected:?}")]
	Step { expected: &'static [Step], actual: Step },
	#[error("submission has been dispatched, the operation can no longer be cancelled")]
	SubmissionInFlight,
}
impl Error {
	/// Whether the caller may correct the input and retry on the same step.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::Unavailable | Self::Validation(_))
	}
}

#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum Validation {
	#[error("insufficient balance {available}, fee {fee} and deposit {deposit} are required")]
	InsufficientBalance { available: u128, fee: u128, deposit: u128 },
	#[error("call data does not match call hash({})", array_bytes::bytes2hex("0x", .0))]
	CallDataMismatch(CallHash),
	#[error("the final approval must attach the full call data")]
	MissingCallData,
	#[error("cancelling a multisig operation requires its timepoint")]
	MissingTimepoint,
	#[error("invalid multisig, threshold {threshold} of {signatories} signatories")]
	InvalidThreshold { threshold: u16, signatories: usize },
	#[error("duplicate signatory({})", array_bytes::bytes2hex("0x", .0))]
	DuplicateSignatory(AccountId),
	#[error(
		"account({}) is not controlled by its signatories and threshold",
		array_bytes::bytes2hex("0x", .0)
	)]
	MultisigAccountMismatch(AccountId),
	#[error("account({}) is not a signatory", array_bytes::bytes2hex("0x", .0))]
	UnknownSignatory(AccountId),
	#[error("no signatory has been selected")]
	NoSignatory,
}

#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum Rejection {
	#[error("multisig transaction is already {0:?}")]
	Terminal(MultisigStatus),
	#[error(
		"account({}) has already acted on this multisig transaction",
		array_bytes::bytes2hex("0x", .0)
	)]
	AlreadyActed(AccountId),
	#[error("event belongs to another multisig transaction")]
	ForeignEvent,
}

#[test]
fn recoverable_should_work() {
	assert!(Error::Unavailable.is_recoverable());
	assert!(Error::from(Validation::MissingCallData).is_recoverable());
	assert!(!Error::from(Rejection::ForeignEvent).is_recoverable());
	assert!(!Error::SubmissionInFlight.is_recoverable());
}
