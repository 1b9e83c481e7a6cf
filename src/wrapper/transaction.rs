// crates.io
use subxt::dynamic::Value;
// multiwrap
use crate::{prelude::*, wrapper::TxWrapper};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultisigAction {
	Approve,
	Reject,
}

/// What the acting signatory does to the multisig call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Approval {
	pub action: MultisigAction,
	/// `None` when the signer opens the multisig call.
	pub timepoint: Option<Timepoint>,
	/// This approval reaches the threshold and dispatches the call.
	pub is_final: bool,
	pub max_weight: Option<Weight>,
}
impl Approval {
	pub fn initiate() -> Self {
		Self { action: MultisigAction::Approve, timepoint: None, is_final: false, max_weight: None }
	}

	pub fn approve(timepoint: Timepoint, is_final: bool) -> Self {
		Self {
			action: MultisigAction::Approve,
			timepoint: Some(timepoint),
			is_final,
			max_weight: None,
		}
	}

	pub fn reject(timepoint: Timepoint) -> Self {
		Self {
			action: MultisigAction::Reject,
			timepoint: Some(timepoint),
			is_final: false,
			max_weight: None,
		}
	}

	pub fn with_max_weight(mut self, weight: Weight) -> Self {
		self.max_weight = Some(weight);

		self
	}

	fn weight(&self) -> Weight {
		self.max_weight.unwrap_or_else(|| {
			tracing::debug!("max weight is unresolved, fall back to {MAX_WEIGHT:?}");

			MAX_WEIGHT
		})
	}
}

/// Pallet multisig dispatchable used for one approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultisigShape {
	AsMultiThreshold1,
	/// Full call data attached.
	AsMulti,
	/// Call hash only.
	ApproveAsMulti,
	CancelAsMulti,
}
impl MultisigShape {
	pub fn of(
		threshold: u16,
		call_data_known: bool,
		approval: &Approval,
	) -> StdResult<Self, Validation> {
		if approval.action == MultisigAction::Reject {
			return if approval.timepoint.is_some() {
				Ok(Self::CancelAsMulti)
			} else {
				Err(Validation::MissingTimepoint)
			};
		}
		if threshold == 1 {
			return if call_data_known {
				Ok(Self::AsMultiThreshold1)
			} else {
				Err(Validation::MissingCallData)
			};
		}

		match (approval.timepoint, approval.is_final, call_data_known) {
			(_, true, false) => Err(Validation::MissingCallData),
			// The final approver dispatches, the runtime needs the call itself.
			(_, true, true) => Ok(Self::AsMulti),
			// The initiator reveals the call data to the other signatories.
			(None, false, true) => Ok(Self::AsMulti),
			_ => Ok(Self::ApproveAsMulti),
		}
	}
}
#[test]
fn multisig_shape_should_work() {
	let tp = Timepoint { height: 10, index: 1 };

	assert_eq!(MultisigShape::of(2, true, &Approval::initiate()), Ok(MultisigShape::AsMulti));
	assert_eq!(
		MultisigShape::of(2, false, &Approval::initiate()),
		Ok(MultisigShape::ApproveAsMulti)
	);
	assert_eq!(
		MultisigShape::of(3, true, &Approval::approve(tp, false)),
		Ok(MultisigShape::ApproveAsMulti)
	);
	assert_eq!(
		MultisigShape::of(3, false, &Approval::approve(tp, false)),
		Ok(MultisigShape::ApproveAsMulti)
	);
	assert_eq!(
		MultisigShape::of(3, true, &Approval::approve(tp, true)),
		Ok(MultisigShape::AsMulti)
	);
	assert_eq!(
		MultisigShape::of(3, false, &Approval::approve(tp, true)),
		Err(Validation::MissingCallData)
	);
	assert_eq!(
		MultisigShape::of(1, true, &Approval::initiate()),
		Ok(MultisigShape::AsMultiThreshold1)
	);
	assert_eq!(
		MultisigShape::of(2, false, &Approval::reject(tp)),
		Ok(MultisigShape::CancelAsMulti)
	);
	assert_eq!(
		MultisigShape::of(2, true, &Approval { timepoint: None, ..Approval::reject(tp) }),
		Err(Validation::MissingTimepoint)
	);
}

/// Result of wrapping a core call.
#[derive(Clone, Debug, PartialEq)]
pub struct Wrapped {
	/// The outermost call, what gets signed and submitted.
	pub submittable: Call,
	/// The call as the multisig sees it, its hash is what signatories compare against.
	///
	/// Without a multisig layer this is the unchanged core call.
	pub core: Call,
	/// The multisig dispatch itself, if any.
	pub multisig: Option<Call>,
	pub call_hash: Option<CallHash>,
	pub call_data: Option<Vec<u8>>,
	/// The account signing `submittable`, `None` if the target account signs directly.
	pub signer: Option<AccountId>,
}

/// Every signatory except `signer`, sorted as the runtime requires.
pub fn other_signatories(multisig: &Multisig, signer: &AccountId) -> Vec<AccountId> {
	let mut others =
		multisig.signatory_ids().filter(|s| *s != signer).copied().collect::<Vec<_>>();

	others.sort();
	others.dedup();

	others
}
#[test]
fn other_signatories_should_work() {
	let m = |order: [u8; 4]| Multisig {
		signatories: order.iter().map(|i| crate::primitive::signatory(*i)).collect(),
		threshold: 2,
		chain_id: None,
	};

	for order in [[1, 2, 3, 4], [4, 3, 2, 1], [3, 1, 4, 2], [2, 4, 1, 3]] {
		let others = other_signatories(&m(order), &[3; 32]);

		assert_eq!(others, vec![[1; 32], [2; 32], [4; 32]]);
		assert!(others.windows(2).all(|w| w[0] < w[1]));
	}
}

/// Fold `wrappers` around `core`, innermost first.
pub fn wrap<E>(
	core: Call,
	wrappers: &[TxWrapper],
	approval: &Approval,
	encoder: &E,
) -> Result<Wrapped>
where
	E: CallEncoder,
{
	let mut wrapped = Wrapped {
		submittable: core.clone(),
		core,
		multisig: None,
		call_hash: None,
		call_data: None,
		signer: None,
	};

	for w in wrappers {
		match w {
			TxWrapper::Proxy { proxy_type, proxied_account_id, .. } => {
				wrapped.submittable =
					util::proxy_of(proxied_account_id, Some(proxy_type), wrapped.submittable);
			},
			TxWrapper::Multisig { multisig_account, .. } => {
				let Some(multisig) = multisig_account.as_multisig() else {
					return Err(Error::Unavailable.into());
				};
				let signer = w.signer().ok_or(Error::from(Validation::NoSignatory))?;
				let call_data = encoder.encode_call(&wrapped.submittable)?;
				let call_hash = util::call_hash(&call_data);
				let shape = MultisigShape::of(multisig.threshold, true, approval)
					.map_err(Error::from)?;
				let inner = wrapped.submittable;
				let multisig_call = multisig_call_of(
					shape,
					multisig,
					&signer.account_id,
					approval,
					Some(inner.clone()),
					call_hash,
				)
				.map_err(Error::from)?;

				tracing::debug!(
					"wrap call({}) as {shape:?} for multisig({})",
					array_bytes::bytes2hex("0x", call_hash),
					array_bytes::bytes2hex("0x", multisig_account.account_id)
				);

				wrapped.core = inner;
				wrapped.multisig = Some(multisig_call.clone());
				wrapped.submittable = multisig_call;
				wrapped.call_hash = Some(call_hash);
				wrapped.call_data = Some(call_data);
			},
		}

		wrapped.signer = w.signer().map(|a| a.account_id);
	}

	Ok(wrapped)
}

/// Approve or reject a multisig call known only by its hash.
pub fn wrap_by_hash(
	call_hash: CallHash,
	wrapper: &TxWrapper,
	approval: &Approval,
) -> Result<Call> {
	let TxWrapper::Multisig { multisig_account, .. } = wrapper else {
		return Err(Error::Unavailable.into());
	};
	let Some(multisig) = multisig_account.as_multisig() else {
		return Err(Error::Unavailable.into());
	};
	let signer = wrapper.signer().ok_or(Error::from(Validation::NoSignatory))?;
	let shape = MultisigShape::of(multisig.threshold, false, approval).map_err(Error::from)?;

	Ok(multisig_call_of(shape, multisig, &signer.account_id, approval, None, call_hash)
		.map_err(Error::from)?)
}

fn multisig_call_of(
	shape: MultisigShape,
	multisig: &Multisig,
	signer: &AccountId,
	approval: &Approval,
	call: Option<Call>,
	call_hash: CallHash,
) -> StdResult<Call, Validation> {
	let threshold = Value::u128(multisig.threshold as _);
	let others = Value::unnamed_composite(
		other_signatories(multisig, signer).iter().map(Value::from_bytes),
	);
	let timepoint = approval.timepoint.map(|t| timepoint_value(&t));
	let inner = || call.map(Call::into_value).ok_or(Validation::MissingCallData);

	Ok(match shape {
		MultisigShape::AsMultiThreshold1 =>
			Call::new("Multisig", "as_multi_threshold_1", vec![others, inner()?]),
		MultisigShape::AsMulti => Call::new(
			"Multisig",
			"as_multi",
			vec![
				threshold,
				others,
				util::option_value(timepoint),
				inner()?,
				approval.weight().value(),
			],
		),
		MultisigShape::ApproveAsMulti => Call::new(
			"Multisig",
			"approve_as_multi",
			vec![
				threshold,
				others,
				util::option_value(timepoint),
				Value::from_bytes(call_hash),
				approval.weight().value(),
			],
		),
		MultisigShape::CancelAsMulti => Call::new(
			"Multisig",
			"cancel_as_multi",
			vec![
				threshold,
				others,
				timepoint.ok_or(Validation::MissingTimepoint)?,
				Value::from_bytes(call_hash),
			],
		),
	})
}

pub fn timepoint_value(timepoint: &Timepoint) -> Value {
	Value::named_composite([
		("height", Value::u128(timepoint.height as _)),
		("index", Value::u128(timepoint.index as _)),
	])
}

#[cfg(test)]
mod test {
	// multiwrap
	use super::*;
	use crate::{
		primitive::DebugEncoder,
		wrapper::mock::{chain_account, multisig_account},
	};

	fn transfer() -> Call {
		Call::new(
			"Balances",
			"transfer_keep_alive",
			vec![util::multi_address(&[0xaa; 32]), Value::u128(1_000)],
		)
	}

	fn others_value(ids: &[u8]) -> Value {
		Value::unnamed_composite(ids.iter().map(|i| Value::from_bytes([*i; 32])))
	}

	#[test]
	fn wrap_without_wrappers_should_work() {
		let w = wrap(transfer(), &[], &Approval::initiate(), &DebugEncoder).unwrap();

		assert_eq!(w.submittable, transfer());
		assert_eq!(w.core, transfer());
		assert_eq!(w.multisig, None);
		assert_eq!(w.call_hash, None);
		assert_eq!(w.signer, None);
	}

	#[test]
	fn wrap_proxy_should_work() {
		let delegate = chain_account(2, 1);
		let w = wrap(
			transfer(),
			&[TxWrapper::Proxy {
				proxy_account: delegate,
				proxy_type: ProxyType::Staking,
				proxied_account_id: [7; 32],
			}],
			&Approval::initiate(),
			&DebugEncoder,
		)
		.unwrap();

		assert_eq!(w.submittable, util::proxy_of(&[7; 32], Some(&ProxyType::Staking), transfer()));
		assert_eq!(
			w.submittable.fields[1],
			Value::unnamed_variant("Some", [Value::unnamed_variant("Staking", [])])
		);
		assert_eq!(w.core, transfer());
		assert_eq!(w.multisig, None);
		assert_eq!(w.signer, Some([1; 32]));
	}

	#[test]
	fn wrap_multisig_should_work() {
		let m = multisig_account(1, 9, &[3, 1, 2], 2);
		let wrappers = [TxWrapper::Multisig {
			multisig_account: m,
			signatories: vec![chain_account(2, 2)],
		}];
		let w = wrap(transfer(), &wrappers, &Approval::initiate(), &DebugEncoder).unwrap();
		let call_hash = DebugEncoder.call_hash(&transfer()).unwrap();

		assert_eq!(w.core, transfer());
		assert_eq!(w.call_hash, Some(call_hash));
		assert_eq!(w.call_data, Some(DebugEncoder.encode_call(&transfer()).unwrap()));
		assert_eq!(w.signer, Some([2; 32]));
		assert_eq!(w.multisig.as_ref(), Some(&w.submittable));
		assert!(w.submittable.is("Multisig", "as_multi"));
		assert_eq!(w.submittable.fields[0], Value::u128(2));
		assert_eq!(w.submittable.fields[1], others_value(&[1, 3]));
		assert_eq!(w.submittable.fields[2], util::option_value(None));
		assert_eq!(w.submittable.fields[3], transfer().into_value());
		assert_eq!(w.submittable.fields[4], MAX_WEIGHT.value());

		let tp = Timepoint { height: 100, index: 2 };
		let weight = Weight { ref_time: 1, proof_size: 2 };
		let w = wrap(
			transfer(),
			&wrappers,
			&Approval::approve(tp, false).with_max_weight(weight),
			&DebugEncoder,
		)
		.unwrap();

		assert!(w.submittable.is("Multisig", "approve_as_multi"));
		assert_eq!(w.submittable.fields[2], util::option_value(Some(timepoint_value(&tp))));
		assert_eq!(w.submittable.fields[3], Value::from_bytes(call_hash));
		assert_eq!(w.submittable.fields[4], weight.value());

		let w = wrap(transfer(), &wrappers, &Approval::reject(tp), &DebugEncoder).unwrap();

		assert!(w.submittable.is("Multisig", "cancel_as_multi"));
		assert_eq!(w.submittable.fields[2], timepoint_value(&tp));
	}

	#[test]
	fn wrap_proxied_multisig_should_work() {
		let m = multisig_account(2, 9, &[1, 2], 2);
		let proxy = TxWrapper::Proxy {
			proxy_account: m.clone(),
			proxy_type: ProxyType::Any,
			proxied_account_id: [7; 32],
		};
		let multisig =
			TxWrapper::Multisig { multisig_account: m, signatories: vec![chain_account(3, 1)] };
		let wrappers = [proxy, multisig];
		let w = wrap(transfer(), &wrappers, &Approval::initiate(), &DebugEncoder).unwrap();
		let proxied = util::proxy_of(&[7; 32], Some(&ProxyType::Any), transfer());

		// The multisig approves the proxy call, not the transfer.
		assert_eq!(w.core, proxied);
		assert_eq!(w.call_hash, Some(DebugEncoder.call_hash(&proxied).unwrap()));
		assert_eq!(w.submittable.fields[3], proxied.into_value());
		assert_eq!(w.signer, Some([1; 32]));
	}

	#[test]
	fn wrap_threshold_1_should_work() {
		let m = multisig_account(1, 9, &[1, 2], 1);
		let wrappers = [TxWrapper::Multisig {
			multisig_account: m,
			signatories: vec![chain_account(2, 1)],
		}];
		let w = wrap(transfer(), &wrappers, &Approval::initiate(), &DebugEncoder).unwrap();

		assert!(w.submittable.is("Multisig", "as_multi_threshold_1"));
		assert_eq!(w.submittable.fields, vec![others_value(&[2]), transfer().into_value()]);
	}

	#[test]
	fn wrap_by_hash_should_work() {
		let m = multisig_account(1, 9, &[1, 2, 3], 3);
		let wrapper = TxWrapper::Multisig {
			multisig_account: m,
			signatories: vec![chain_account(2, 1)],
		};
		let tp = Timepoint { height: 5, index: 0 };
		let call = wrap_by_hash([0xcc; 32], &wrapper, &Approval::approve(tp, false)).unwrap();

		assert!(call.is("Multisig", "approve_as_multi"));
		assert_eq!(call.fields[3], Value::from_bytes([0xcc; 32]));

		let e = wrap_by_hash([0xcc; 32], &wrapper, &Approval::approve(tp, true)).unwrap_err();

		assert!(matches!(
			e.downcast_ref::<Error>(),
			Some(Error::Validation(Validation::MissingCallData))
		));

		let e = wrap_by_hash(
			[0xcc; 32],
			&TxWrapper::Multisig { multisig_account: chain_account(1, 9), signatories: Vec::new() },
			&Approval::initiate(),
		)
		.unwrap_err();

		assert!(matches!(e.downcast_ref::<Error>(), Some(Error::Unavailable)));
	}
}
