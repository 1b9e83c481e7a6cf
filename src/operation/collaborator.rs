// crates.io
use async_trait::async_trait;
// multiwrap
use crate::{prelude::*, wrapper::MultisigAction};

pub type Signature = [u8; 64];

/// Produces a signature for a payload, possibly on another device.
#[async_trait]
pub trait Sign: Send + Sync {
	fn account_id(&self) -> AccountId;

	async fn sign(&self, payload: &[u8]) -> Result<Signature>;
}

/// Builds, and after an external signature, submits an extrinsic.
#[async_trait]
pub trait Submit: Send + Sync {
	/// An unsigned extrinsic waiting for its signature.
	type Pending: Send;

	async fn prepare(&self, signer: &AccountId, call: &Call) -> Result<Self::Pending>;

	/// Bytes the signer signs.
	fn payload(&self, pending: &Self::Pending) -> Result<Vec<u8>>;

	async fn submit(
		&self,
		pending: Self::Pending,
		signer: &AccountId,
		signature: Signature,
	) -> Result<ExtrinsicResult>;
}

/// Balance tracking of the accounts an operation touches.
pub trait BalanceSubscriber {
	fn subscribe(&mut self, accounts: &[AccountId]);

	fn unsubscribe(&mut self, accounts: &[AccountId]);

	/// Transferable balance, zero until known.
	fn free_balance(&self, who: &AccountId) -> Balance;
}

/// Outcome of a submitted extrinsic once it is in a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtrinsicResult {
	pub executed: bool,
	/// The submission reached the multisig threshold and dispatched the call.
	pub is_final_approve: bool,
	pub multisig_error: bool,
	/// Where the extrinsic landed.
	pub timepoint: Timepoint,
	pub extrinsic_hash: ExtrinsicHash,
}
impl ExtrinsicResult {
	pub fn is_success(&self) -> bool {
		self.executed && !self.multisig_error
	}

	/// The multisig event `signer` produced with this extrinsic.
	pub fn event(&self, signer: AccountId, action: MultisigAction) -> MultisigEvent {
		let status = match (action, self.is_success()) {
			(MultisigAction::Approve, true) => SigningStatus::Signed,
			(MultisigAction::Reject, true) => SigningStatus::Cancelled,
			(MultisigAction::Approve, false) => SigningStatus::ErrorSigned,
			(MultisigAction::Reject, false) => SigningStatus::ErrorCancelled,
		};
		let mut event = MultisigEvent::new(signer, status, util::now()).at(self.timepoint);

		event.extrinsic_hash = Some(self.extrinsic_hash);

		event
	}
}
#[test]
fn extrinsic_result_event_should_work() {
	let r = ExtrinsicResult {
		executed: true,
		is_final_approve: false,
		multisig_error: false,
		timepoint: Timepoint { height: 7, index: 2 },
		extrinsic_hash: [5; 32],
	};
	let e = r.event([1; 32], MultisigAction::Approve);

	assert_eq!(e.status, SigningStatus::Signed);
	assert_eq!(e.timepoint(), Some(r.timepoint));
	assert_eq!(e.extrinsic_hash, Some([5; 32]));
	assert_eq!(r.event([1; 32], MultisigAction::Reject).status, SigningStatus::Cancelled);

	let failed = ExtrinsicResult { multisig_error: true, ..r };

	assert_eq!(failed.event([1; 32], MultisigAction::Approve).status, SigningStatus::ErrorSigned);
	assert_eq!(
		ExtrinsicResult { executed: false, ..r }.event([1; 32], MultisigAction::Reject).status,
		SigningStatus::ErrorCancelled
	);
}
