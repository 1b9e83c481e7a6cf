//! Operation flow, the stepper from a user intent to a submitted extrinsic.
//!
//! ```text
//! None -> Warning? -> Init -> Confirm -> Sign -> Submit -> None
//!                               `-> Basket -> None
//! ```

mod collaborator;
pub use collaborator::*;

// std
use std::{mem, time::Duration};
// multiwrap
use crate::{
	observer::ChainNotice,
	prelude::*,
	wrapper::{self, Approval, MultisigAction, TxWrapper, Wrapped},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Step {
	#[default]
	None,
	Warning,
	Init,
	Confirm,
	Sign,
	Submit,
	Basket,
}

/// Completion signal of the current step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
	/// The warning was read, the basket accepted the operation or the submission outcome was
	/// seen.
	Acknowledged,
	/// The form is filled in and wrapped.
	Validated { wrapped: Wrapped, approval: Approval, fee: Balance },
	Confirmed,
	/// Put the operation into the basket instead of signing it now.
	Deferred,
	/// A signature was obtained, the extrinsic is dispatched.
	Signed,
	Submitted(ExtrinsicResult),
}

/// What an operation is about.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
	pub chain_id: ChainId,
	pub target: Account,
	pub core: Call,
	/// Innermost first.
	pub wrappers: Vec<TxWrapper>,
	/// Show a warning before the form, e.g. acting through a proxy.
	pub warning: bool,
}
impl Request {
	/// `wrappers` is the resolver output, `None` makes the operation unavailable.
	pub fn new(
		chain_id: ChainId,
		target: Account,
		core: Call,
		wrappers: Option<Vec<TxWrapper>>,
	) -> StdResult<Self, Error> {
		let wrappers = wrappers.ok_or(Error::Unavailable)?;
		let warning = wrappers.iter().any(|w| matches!(w, TxWrapper::Proxy { .. }));

		Ok(Self { chain_id, target, core, wrappers, warning })
	}

	fn multisig_account(&self) -> Option<&Account> {
		self.wrappers.iter().find_map(|w| match w {
			TxWrapper::Multisig { multisig_account, .. } => Some(multisig_account),
			_ => None,
		})
	}

	/// Every account the operation may spend from.
	fn accounts(&self) -> Vec<AccountId> {
		let mut accounts = vec![self.target.account_id];

		for w in &self.wrappers {
			match w {
				TxWrapper::Proxy { proxy_account, .. } => accounts.push(proxy_account.account_id),
				TxWrapper::Multisig { signatories, .. } =>
					accounts.extend(signatories.iter().map(|s| s.account_id)),
			}
		}

		accounts.sort();
		accounts.dedup();

		accounts
	}
}

/// Reserved by the depositor of a multisig call, `base + factor * threshold`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepositConstants {
	pub base: Balance,
	pub factor: Balance,
}

#[derive(Debug)]
pub struct OperationFlow<B>
where
	B: BalanceSubscriber,
{
	subscriber: B,
	deposit: DepositConstants,
	step: Step,
	request: Option<Request>,
	subscribed: Vec<AccountId>,
	signed: Option<(Wrapped, Approval)>,
	deferred: Option<Wrapped>,
	outcome: Option<ExtrinsicResult>,
}
impl<B> OperationFlow<B>
where
	B: BalanceSubscriber,
{
	pub fn new(subscriber: B, deposit: DepositConstants) -> Self {
		Self {
			subscriber,
			deposit,
			step: Step::None,
			request: None,
			subscribed: Vec::new(),
			signed: None,
			deferred: None,
			outcome: None,
		}
	}

	pub fn step(&self) -> Step {
		self.step
	}

	pub fn subscriber(&self) -> &B {
		&self.subscriber
	}

	pub fn request(&self) -> Option<&Request> {
		self.request.as_ref()
	}

	pub fn outcome(&self) -> Option<&ExtrinsicResult> {
		self.outcome.as_ref()
	}

	pub fn take_deferred(&mut self) -> Option<Wrapped> {
		self.deferred.take()
	}

	fn expect(&self, expected: &'static [Step]) -> StdResult<(), Error> {
		if expected.contains(&self.step) {
			Ok(())
		} else {
			Err(Error::Step { expected, actual: self.step })
		}
	}

	fn enter(&mut self, step: Step) -> Step {
		tracing::info!("operation step {:?} -> {step:?}", self.step);

		self.step = step;

		step
	}

	fn finish(&mut self) -> Step {
		let subscribed = mem::take(&mut self.subscribed);

		if !subscribed.is_empty() {
			self.subscriber.unsubscribe(&subscribed);
		}

		self.request = None;
		self.signed = None;
		self.outcome = None;

		self.enter(Step::None)
	}

	pub fn start(&mut self, request: Request) -> StdResult<Step, Error> {
		self.expect(&[Step::None])?;

		let accounts = request.accounts();
		let step = if request.warning { Step::Warning } else { Step::Init };

		self.subscriber.subscribe(&accounts);
		self.subscribed = accounts;
		self.request = Some(request);

		Ok(self.enter(step))
	}

	/// Wrap the request's core call for `approval`, the input of [`StepResult::Validated`].
	pub fn wrap<E>(&self, encoder: &E, approval: &Approval) -> Result<Wrapped>
	where
		E: CallEncoder,
	{
		let Some(request) = &self.request else {
			return Err(Error::Step { expected: &[Step::Init], actual: self.step }.into());
		};

		wrapper::wrap(request.core.clone(), &request.wrappers, approval, encoder)
	}

	pub fn advance(&mut self, result: StepResult) -> StdResult<Step, Error> {
		match (self.step, result) {
			(Step::Warning, StepResult::Acknowledged) => Ok(self.enter(Step::Init)),
			(Step::Init, StepResult::Validated { wrapped, approval, fee }) => {
				self.validate(&wrapped, &approval, fee)?;
				self.signed = Some((wrapped, approval));

				Ok(self.enter(Step::Confirm))
			},
			(Step::Confirm, StepResult::Confirmed) => Ok(self.enter(Step::Sign)),
			(Step::Confirm, StepResult::Deferred) => {
				self.deferred = self.signed.take().map(|(w, _)| w);

				Ok(self.enter(Step::Basket))
			},
			(Step::Sign, StepResult::Signed) => Ok(self.enter(Step::Submit)),
			(Step::Submit, StepResult::Submitted(outcome)) if self.outcome.is_none() => {
				if outcome.is_success() {
					tracing::info!("operation submitted at {:?}", outcome.timepoint);
				} else {
					tracing::warn!("operation dispatch failed at {:?}", outcome.timepoint);
				}

				self.outcome = Some(outcome);

				Ok(self.step)
			},
			(Step::Basket, StepResult::Acknowledged) => Ok(self.finish()),
			(Step::Submit, StepResult::Acknowledged) if self.outcome.is_some() => Ok(self.finish()),
			(actual, result) => {
				tracing::warn!("unexpected {result:?} at step({actual:?})");

				Err(Error::Step { expected: expected_for(&result), actual })
			},
		}
	}

	fn validate(
		&self,
		wrapped: &Wrapped,
		approval: &Approval,
		fee: Balance,
	) -> StdResult<(), Error> {
		let request = self.request.as_ref().ok_or(Error::Unavailable)?;
		let payer = wrapped.signer.unwrap_or(request.target.account_id);
		let deposit = match request.multisig_account().and_then(Account::as_multisig) {
			// Only the depositor reserves.
			Some(m) if approval.timepoint.is_none() && approval.action == MultisigAction::Approve =>
				util::multisig_deposit(self.deposit.base, self.deposit.factor, m.threshold),
			_ => 0,
		};
		let available = self.subscriber.free_balance(&payer);

		if available < fee.saturating_add(deposit) {
			return Err(Validation::InsufficientBalance { available, fee, deposit }.into());
		}

		Ok(())
	}

	/// Step back from `Confirm`.
	///
	/// A multisig operation returns to `Init` to redo the signatory selection, anything else
	/// terminates.
	pub fn back(&mut self) -> StdResult<Step, Error> {
		self.expect(&[Step::Warning, Step::Init, Step::Confirm])?;

		let multisig = self.request.as_ref().map_or(false, |r| wrapper::has_multisig(&r.wrappers));

		if self.step == Step::Confirm && multisig {
			self.signed = None;

			Ok(self.enter(Step::Init))
		} else {
			Ok(self.finish())
		}
	}

	/// Abort the operation, allowed until the extrinsic is dispatched.
	pub fn cancel(&mut self) -> StdResult<Step, Error> {
		if self.step == Step::Submit && self.outcome.is_none() {
			return Err(Error::SubmissionInFlight);
		}

		self.deferred = None;

		Ok(self.finish())
	}

	/// Sign the confirmed extrinsic and submit it, from `Sign` to a recorded outcome.
	///
	/// Dropping the future before the signature is obtained leaves the flow at `Sign`, where it
	/// can still be cancelled. A failed submission returns to `Sign` as well, the signature is
	/// discarded and the caller either retries or cancels.
	pub async fn sign_and_submit<S, G>(
		&mut self,
		submitter: &S,
		signer: &G,
	) -> Result<ExtrinsicResult>
	where
		S: Submit,
		G: Sign,
	{
		self.expect(&[Step::Sign])?;

		let Some((wrapped, _)) = &self.signed else {
			return Err(Error::Step { expected: &[Step::Confirm], actual: self.step }.into());
		};
		let who = signer.account_id();
		let pending = submitter.prepare(&who, &wrapped.submittable).await?;
		let signature = signer.sign(&submitter.payload(&pending)?).await?;

		self.advance(StepResult::Signed)?;

		let outcome = match submitter.submit(pending, &who, signature).await {
			Ok(o) => o,
			Err(e) => {
				tracing::warn!("operation submission failed, {e}");

				self.enter(Step::Sign);

				return Err(e);
			},
		};

		self.advance(StepResult::Submitted(outcome))?;

		Ok(outcome)
	}

	/// Close the flow `delay` after the outcome arrived, leaving the result visible meanwhile.
	pub async fn finish_after(&mut self, delay: Duration) -> StdResult<Step, Error> {
		if self.outcome.is_none() {
			return Err(Error::Step { expected: &[Step::Submit], actual: self.step });
		}

		tokio::time::sleep(delay).await;

		self.advance(StepResult::Acknowledged)
	}

	/// Tracker updates caused by the submission.
	///
	/// Empty without a multisig layer or before the outcome arrived.
	pub fn notices(&self) -> Vec<ChainNotice> {
		let (Some(request), Some((wrapped, approval)), Some(outcome)) =
			(&self.request, &self.signed, &self.outcome)
		else {
			return Vec::new();
		};
		let (Some(multisig_account), Some(call_hash), Some(signer)) =
			(request.multisig_account(), wrapped.call_hash, wrapped.signer)
		else {
			return Vec::new();
		};
		let event = outcome.event(signer, approval.action);
		let mut notices = Vec::new();
		let key = match approval.timepoint {
			Some(timepoint) => MultisigKey {
				account_id: multisig_account.account_id,
				chain_id: request.chain_id,
				call_hash,
				timepoint,
			},
			None => {
				let mut tx = MultisigTransaction::new(
					multisig_account.account_id,
					request.chain_id,
					call_hash,
					outcome.timepoint,
					signer,
				);

				tx.call_data = wrapped.call_data.clone();
				notices.push(ChainNotice::MultisigCreated(tx.clone()));

				tx.key()
			},
		};

		notices.push(ChainNotice::MultisigEvent { key, event });

		if outcome.is_final_approve && outcome.executed {
			notices.push(ChainNotice::MultisigExecuted(key));
		}

		notices
	}
}
impl<B> Drop for OperationFlow<B>
where
	B: BalanceSubscriber,
{
	fn drop(&mut self) {
		if !self.subscribed.is_empty() {
			self.subscriber.unsubscribe(&self.subscribed);
		}
	}
}

fn expected_for(result: &StepResult) -> &'static [Step] {
	match result {
		StepResult::Acknowledged => &[Step::Warning, Step::Basket, Step::Submit],
		StepResult::Validated { .. } => &[Step::Init],
		StepResult::Confirmed | StepResult::Deferred => &[Step::Confirm],
		StepResult::Signed => &[Step::Sign],
		StepResult::Submitted(_) => &[Step::Submit],
	}
}

#[cfg(test)]
mod test {
	// std
	use std::sync::{Arc, Mutex};
	// crates.io
	use async_trait::async_trait;
	// multiwrap
	use super::*;
	use crate::{
		observer::{self, Effect},
		storage::{State, Table},
		wrapper::mock::*,
	};

	#[derive(Debug, Default)]
	struct Ledger {
		subscribed: Vec<AccountId>,
		unsubscribed: Vec<AccountId>,
	}

	#[derive(Debug, Clone)]
	struct Balances {
		ledger: Arc<Mutex<Ledger>>,
		free: Balance,
	}
	impl Balances {
		fn new(free: Balance) -> Self {
			Self { ledger: Default::default(), free }
		}

		fn is_paired(&self) -> bool {
			let l = self.ledger.lock().unwrap();

			!l.subscribed.is_empty() && l.subscribed == l.unsubscribed
		}
	}
	impl BalanceSubscriber for Balances {
		fn subscribe(&mut self, accounts: &[AccountId]) {
			self.ledger.lock().unwrap().subscribed.extend_from_slice(accounts);
		}

		fn unsubscribe(&mut self, accounts: &[AccountId]) {
			self.ledger.lock().unwrap().unsubscribed.extend_from_slice(accounts);
		}

		fn free_balance(&self, _: &AccountId) -> Balance {
			self.free
		}
	}

	struct Node(ExtrinsicResult);
	#[async_trait]
	impl Submit for Node {
		type Pending = Vec<u8>;

		async fn prepare(&self, _: &AccountId, call: &Call) -> Result<Self::Pending> {
			DebugEncoder.encode_call(call)
		}

		fn payload(&self, pending: &Self::Pending) -> Result<Vec<u8>> {
			Ok(pending.clone())
		}

		async fn submit(
			&self,
			_: Self::Pending,
			_: &AccountId,
			signature: Signature,
		) -> Result<ExtrinsicResult> {
			assert_eq!(signature, [7; 64]);

			Ok(self.0)
		}
	}

	struct Offline;
	#[async_trait]
	impl Submit for Offline {
		type Pending = ();

		async fn prepare(&self, _: &AccountId, _: &Call) -> Result<Self::Pending> {
			Ok(())
		}

		fn payload(&self, _: &Self::Pending) -> Result<Vec<u8>> {
			Ok(Vec::new())
		}

		async fn submit(
			&self,
			_: Self::Pending,
			_: &AccountId,
			_: Signature,
		) -> Result<ExtrinsicResult> {
			anyhow::bail!("rpc timeout")
		}
	}

	struct Key(AccountId);
	#[async_trait]
	impl Sign for Key {
		fn account_id(&self) -> AccountId {
			self.0
		}

		async fn sign(&self, _: &[u8]) -> Result<Signature> {
			Ok([7; 64])
		}
	}

	fn transfer() -> Call {
		Call::new("Balances", "transfer_keep_alive", vec![])
	}

	fn plain_request() -> Request {
		Request::new(POLKADOT, chain_account(1, 1), transfer(), Some(Vec::new())).unwrap()
	}

	fn multisig_request() -> Request {
		let m = multisig_account(1, 9, &[1, 2, 3], 2);

		Request::new(
			POLKADOT,
			m.clone(),
			transfer(),
			Some(vec![TxWrapper::Multisig {
				multisig_account: m,
				signatories: vec![chain_account(2, 1)],
			}]),
		)
		.unwrap()
	}

	fn outcome() -> ExtrinsicResult {
		ExtrinsicResult {
			executed: true,
			is_final_approve: false,
			multisig_error: false,
			timepoint: Timepoint { height: 10, index: 1 },
			extrinsic_hash: [3; 32],
		}
	}

	fn validated<B>(flow: &OperationFlow<B>, approval: Approval, fee: Balance) -> StepResult
	where
		B: BalanceSubscriber,
	{
		let wrapped = flow.wrap(&DebugEncoder, &approval).unwrap();

		StepResult::Validated { wrapped, approval, fee }
	}

	#[test]
	fn unavailable_request_should_fail() {
		assert!(matches!(
			Request::new(POLKADOT, chain_account(1, 1), transfer(), None),
			Err(Error::Unavailable)
		));
	}

	#[test]
	fn flow_should_work() {
		let balances = Balances::new(100);
		let mut flow = OperationFlow::new(balances.clone(), DepositConstants::default());

		assert_eq!(flow.start(plain_request()).unwrap(), Step::Init);
		assert!(matches!(flow.start(plain_request()), Err(Error::Step { actual: Step::Init, .. })));

		let v = validated(&flow, Approval::initiate(), 10);

		assert_eq!(flow.advance(v).unwrap(), Step::Confirm);
		assert_eq!(flow.advance(StepResult::Confirmed).unwrap(), Step::Sign);
		assert_eq!(flow.advance(StepResult::Signed).unwrap(), Step::Submit);
		assert!(matches!(flow.cancel(), Err(Error::SubmissionInFlight)));
		assert_eq!(flow.advance(StepResult::Submitted(outcome())).unwrap(), Step::Submit);
		// Nothing to track without a multisig layer.
		assert!(flow.notices().is_empty());
		assert_eq!(flow.advance(StepResult::Acknowledged).unwrap(), Step::None);
		assert!(balances.is_paired());
	}

	#[test]
	fn insufficient_balance_should_stay() {
		let mut flow =
			OperationFlow::new(Balances::new(24), DepositConstants { base: 10, factor: 5 });

		flow.start(multisig_request()).unwrap();

		// 5 fee + 10 + 5 * 2 deposit.
		let v = validated(&flow, Approval::initiate(), 5);
		let e = flow.advance(v).unwrap_err();

		assert!(e.is_recoverable());
		assert!(matches!(
			e,
			Error::Validation(Validation::InsufficientBalance {
				available: 24,
				fee: 5,
				deposit: 20
			})
		));
		assert_eq!(flow.step(), Step::Init);

		// Approvers reserve no deposit.
		let v = validated(&flow, Approval::approve(Timepoint::default(), false), 5);

		assert_eq!(flow.advance(v).unwrap(), Step::Confirm);
	}

	#[test]
	fn back_should_work() {
		let mut flow = OperationFlow::new(Balances::new(100), DepositConstants::default());

		flow.start(multisig_request()).unwrap();

		let v = validated(&flow, Approval::initiate(), 1);

		flow.advance(v).unwrap();

		assert_eq!(flow.back().unwrap(), Step::Init);

		let balances = Balances::new(100);
		let mut flow = OperationFlow::new(balances.clone(), DepositConstants::default());

		flow.start(plain_request()).unwrap();

		let v = validated(&flow, Approval::initiate(), 1);

		flow.advance(v).unwrap();

		assert_eq!(flow.back().unwrap(), Step::None);
		assert!(balances.is_paired());
	}

	#[test]
	fn basket_should_work() {
		let balances = Balances::new(100);
		let mut flow = OperationFlow::new(balances.clone(), DepositConstants::default());
		let mut request = plain_request();

		request.warning = true;

		assert_eq!(flow.start(request).unwrap(), Step::Warning);
		assert!(matches!(flow.advance(StepResult::Confirmed), Err(Error::Step { .. })));
		assert_eq!(flow.advance(StepResult::Acknowledged).unwrap(), Step::Init);

		let v = validated(&flow, Approval::initiate(), 1);

		flow.advance(v).unwrap();

		assert_eq!(flow.advance(StepResult::Deferred).unwrap(), Step::Basket);
		assert_eq!(flow.take_deferred().map(|w| w.submittable), Some(transfer()));
		assert_eq!(flow.advance(StepResult::Acknowledged).unwrap(), Step::None);
		assert!(balances.is_paired());
	}

	#[test]
	fn abort_should_release_subscription() {
		for steps in 0..3 {
			let balances = Balances::new(100);

			{
				let mut flow = OperationFlow::new(balances.clone(), DepositConstants::default());

				flow.start(plain_request()).unwrap();

				if steps > 0 {
					let v = validated(&flow, Approval::initiate(), 1);

					flow.advance(v).unwrap();
				}
				if steps > 1 {
					flow.advance(StepResult::Confirmed).unwrap();

					assert_eq!(flow.cancel().unwrap(), Step::None);
				}
			}

			assert!(balances.is_paired());
		}
	}

	#[tokio::test]
	async fn sign_and_submit_should_work() {
		let balances = Balances::new(100);
		let mut flow = OperationFlow::new(balances.clone(), DepositConstants::default());

		flow.start(multisig_request()).unwrap();

		let v = validated(&flow, Approval::initiate(), 1);

		flow.advance(v).unwrap();
		flow.advance(StepResult::Confirmed).unwrap();

		let result = flow.sign_and_submit(&Node(outcome()), &Key([1; 32])).await.unwrap();

		assert_eq!(result, outcome());
		assert_eq!(flow.step(), Step::Submit);

		let notices = flow.notices();

		assert_eq!(notices.len(), 2);

		let ChainNotice::MultisigCreated(tx) = &notices[0] else { panic!("{notices:?}") };

		assert_eq!(tx.timepoint(), outcome().timepoint);
		assert_eq!(tx.depositor, [1; 32]);
		assert!(tx.call_data.is_some());
		assert!(matches!(
			&notices[1],
			ChainNotice::MultisigEvent { key, event }
				if *key == tx.key() && event.status == SigningStatus::Signed
		));
		assert_eq!(
			flow.finish_after(Duration::from_millis(1)).await.unwrap(),
			Step::None
		);
		assert!(balances.is_paired());
	}

	#[tokio::test]
	async fn final_approval_should_execute() {
		let mut flow = OperationFlow::new(Balances::new(100), DepositConstants::default());
		let timepoint = Timepoint { height: 3, index: 0 };

		flow.start(multisig_request()).unwrap();

		let v = validated(&flow, Approval::approve(timepoint, true), 1);

		flow.advance(v).unwrap();
		flow.advance(StepResult::Confirmed).unwrap();
		flow.sign_and_submit(
			&Node(ExtrinsicResult { is_final_approve: true, ..outcome() }),
			&Key([1; 32]),
		)
		.await
		.unwrap();

		let notices = flow.notices();

		assert_eq!(notices.len(), 2);
		assert!(matches!(notices[1], ChainNotice::MultisigExecuted(k) if k.timepoint == timepoint));
	}

	#[tokio::test]
	async fn failed_submission_should_return_to_sign() {
		let balances = Balances::new(100);
		let mut flow = OperationFlow::new(balances.clone(), DepositConstants::default());

		flow.start(plain_request()).unwrap();

		let v = validated(&flow, Approval::initiate(), 1);

		flow.advance(v).unwrap();
		flow.advance(StepResult::Confirmed).unwrap();

		let e = flow.sign_and_submit(&Offline, &Key([1; 32])).await.unwrap_err();

		assert_eq!(e.to_string(), "rpc timeout");
		assert_eq!(flow.step(), Step::Sign);
		assert!(flow.outcome().is_none());
		assert!(flow.notices().is_empty());

		// A retry goes through the same confirmed extrinsic.
		flow.sign_and_submit(&Node(outcome()), &Key([1; 32])).await.unwrap();

		assert_eq!(flow.step(), Step::Submit);
		assert_eq!(flow.advance(StepResult::Acknowledged).unwrap(), Step::None);
		assert!(balances.is_paired());

		let balances = Balances::new(100);
		let mut flow = OperationFlow::new(balances.clone(), DepositConstants::default());

		flow.start(plain_request()).unwrap();

		let v = validated(&flow, Approval::initiate(), 1);

		flow.advance(v).unwrap();
		flow.advance(StepResult::Confirmed).unwrap();

		assert!(flow.sign_and_submit(&Offline, &Key([1; 32])).await.is_err());
		assert_eq!(flow.cancel().unwrap(), Step::None);
		assert!(balances.is_paired());
	}

	#[tokio::test]
	async fn failed_dispatch_should_mark_error() {
		let multisig = multisig_account(1, 9, &[1, 2, 3], 2);
		let mut state = State::default();

		state.accounts.create_all(vec![multisig]);

		let mut flow = OperationFlow::new(Balances::new(100), DepositConstants::default());

		flow.start(multisig_request()).unwrap();

		let v = validated(&flow, Approval::initiate(), 1);

		flow.advance(v).unwrap();
		flow.advance(StepResult::Confirmed).unwrap();
		flow.sign_and_submit(
			&Node(ExtrinsicResult { executed: false, ..outcome() }),
			&Key([1; 32]),
		)
		.await
		.unwrap();

		let notices = flow.notices();

		assert_eq!(notices.len(), 2);
		assert!(matches!(
			&notices[1],
			ChainNotice::MultisigEvent { event, .. } if event.status == SigningStatus::ErrorSigned
		));

		let mut effects = notices.into_iter().map(|n| observer::apply(&mut state, n).unwrap());

		assert_eq!(effects.next(), Some(Effect::Changed));
		assert!(matches!(effects.next(), Some(Effect::Status(_, MultisigStatus::Error))));
		assert_eq!(state.multisig_transactions[0].status, MultisigStatus::Error);

		// A failed cancellation of a pending call.
		let timepoint = Timepoint { height: 3, index: 0 };
		let approval = Approval::reject(timepoint);
		let mut flow = OperationFlow::new(Balances::new(100), DepositConstants::default());

		flow.start(multisig_request()).unwrap();

		let v = validated(&flow, approval, 1);
		let StepResult::Validated { wrapped, .. } = &v else { unreachable!() };
		let call_hash = wrapped.call_hash.unwrap();

		state.multisig_transactions.create_all(vec![MultisigTransaction::new(
			[9; 32],
			POLKADOT,
			call_hash,
			timepoint,
			[2; 32],
		)]);
		flow.advance(v).unwrap();
		flow.advance(StepResult::Confirmed).unwrap();
		flow.sign_and_submit(
			&Node(ExtrinsicResult { multisig_error: true, ..outcome() }),
			&Key([1; 32]),
		)
		.await
		.unwrap();

		let notices = flow.notices();

		assert_eq!(notices.len(), 1);

		let ChainNotice::MultisigEvent { key, event } = notices[0].clone() else {
			panic!("{notices:?}")
		};

		assert_eq!(event.status, SigningStatus::ErrorCancelled);
		assert_eq!(
			observer::apply(&mut state, ChainNotice::MultisigEvent { key, event }).unwrap(),
			Effect::Status(key, MultisigStatus::Error)
		);
		assert_eq!(
			Table::get(&state.multisig_transactions, &key).map(|t| t.status),
			Some(MultisigStatus::Error)
		);
	}
}
