//! Multisig approval tracking.
//!
//! Events are applied as a set keyed on `(account, status)`, so redelivery from the chain
//! observer never advances a tally twice.

// std
use std::collections::BTreeSet;
// multiwrap
use crate::{prelude::*, wrapper::Approval};

/// Display relabeling of a [`MultisigEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventLabel {
	/// The depositor's first approval, it opened the call.
	Initiated,
	Approved,
	Rejected,
	Pending,
	Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
	Inserted,
	/// Same `(account, status)` already recorded.
	Duplicate,
	/// A confirmed event replaced the account's pending one.
	Superseded,
	/// A pending event arrived after the account's confirmed one.
	Stale,
}
impl Applied {
	pub fn changed(self) -> bool {
		matches!(self, Self::Inserted | Self::Superseded)
	}
}

impl MultisigTransaction {
	/// Record `event` and derive the new status.
	pub fn apply_event(
		&mut self,
		multisig: &Multisig,
		event: MultisigEvent,
	) -> StdResult<Applied, Error> {
		multisig.validate()?;

		let who = event.account_id;

		if self.events.iter().any(|e| e.account_id == who && e.status == event.status) {
			return Ok(Applied::Duplicate);
		}
		if self.status.is_terminal() {
			return Err(Rejection::Terminal(self.status).into());
		}
		if !multisig.contains(&who) {
			return Err(Validation::UnknownSignatory(who).into());
		}

		let acted = self.events.iter().find(|e| e.account_id == who && e.status.is_final());
		let applied = match event.status {
			SigningStatus::PendingSigned if acted.is_some() => return Ok(Applied::Stale),
			s if s.is_final() => {
				if acted.is_some() {
					return Err(Rejection::AlreadyActed(who).into());
				}

				let pending = self.events.len();

				self.events
					.retain(|e| !(e.account_id == who && e.status == SigningStatus::PendingSigned));

				if self.events.len() == pending {
					Applied::Inserted
				} else {
					Applied::Superseded
				}
			},
			_ => Applied::Inserted,
		};

		self.events.push(event);

		let status = self.derive_status(multisig.threshold);

		if status != self.status {
			tracing::info!(
				"multisig transaction({}) {:?} -> {status:?}",
				array_bytes::bytes2hex("0x", self.call_hash),
				self.status
			);

			self.status = status;
		}

		Ok(applied)
	}

	fn derive_status(&self, threshold: u16) -> MultisigStatus {
		if self.events.iter().any(|e| e.status.is_error()) {
			MultisigStatus::Error
		} else if self.approvals().len() >= threshold as usize {
			MultisigStatus::Executed
		} else if self.cancellations().len() >= threshold as usize {
			MultisigStatus::Cancelled
		} else {
			MultisigStatus::Signing
		}
	}

	fn accounts_with(&self, status: SigningStatus) -> BTreeSet<AccountId> {
		self.events.iter().filter(|e| e.status == status).map(|e| e.account_id).collect()
	}

	/// Distinct signatories that approved, the depositor included.
	pub fn approvals(&self) -> BTreeSet<AccountId> {
		self.accounts_with(SigningStatus::Signed)
	}

	pub fn cancellations(&self) -> BTreeSet<AccountId> {
		self.accounts_with(SigningStatus::Cancelled)
	}

	/// The next approval dispatches the call, or it has been dispatched already.
	pub fn ready_to_finalize(&self, threshold: u16) -> bool {
		let approvals = self.approvals().len();

		approvals + 1 == threshold as usize || approvals == threshold as usize
	}

	pub fn next_approval_is_final(&self, threshold: u16) -> bool {
		self.approvals().len() + 1 >= threshold as usize
	}

	/// The approval the next signatory submits.
	pub fn next_approval(&self, multisig: &Multisig) -> Approval {
		Approval::approve(self.timepoint(), self.next_approval_is_final(multisig.threshold))
	}

	/// Signatories which have neither approved nor rejected, in signatory order.
	pub fn unsigned_signatories(&self, multisig: &Multisig) -> Vec<AccountId> {
		multisig
			.signatory_ids()
			.filter(|s| !self.events.iter().any(|e| &e.account_id == *s && e.status.is_final()))
			.copied()
			.collect()
	}

	/// Events in display order.
	///
	/// Observed events come first by timepoint, the rest by creation time. The sort is stable,
	/// equal keys keep their insertion order.
	pub fn sorted_events(&self) -> Vec<&MultisigEvent> {
		let mut events = self.events.iter().collect::<Vec<_>>();

		events.sort_by_key(|e| {
			let timepoint = e.timepoint();

			(timepoint.is_none(), timepoint, e.date_created)
		});

		events
	}

	pub fn label(&self, event: &MultisigEvent) -> EventLabel {
		match event.status {
			SigningStatus::PendingSigned => EventLabel::Pending,
			SigningStatus::ErrorSigned | SigningStatus::ErrorCancelled => EventLabel::Failed,
			SigningStatus::Cancelled => EventLabel::Rejected,
			SigningStatus::Signed => {
				let first = self
					.sorted_events()
					.into_iter()
					.find(|e| e.account_id == event.account_id)
					.map_or(true, |e| e == event);

				if event.account_id == self.depositor && first {
					EventLabel::Initiated
				} else {
					EventLabel::Approved
				}
			},
		}
	}

	/// Attach the full call data, once it hashes to the call hash.
	///
	/// Returns whether the data was new.
	pub fn reveal_call_data(&mut self, call_data: Vec<u8>) -> StdResult<bool, Validation> {
		if util::call_hash(&call_data) != self.call_hash {
			return Err(Validation::CallDataMismatch(self.call_hash));
		}
		if self.call_data.is_some() {
			return Ok(false);
		}

		self.call_data = Some(call_data);

		Ok(true)
	}
}
