//! Chain observation feed, applying what happened on chain to the stored state.
//!
//! Notices may be delivered more than once, each of them is applied idempotently.

// crates.io
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Receiver;
// multiwrap
use crate::{
	aggregator::proxy,
	notification::Notify,
	prelude::*,
	storage::{Database, State, Table},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "kebab-case")]
pub enum ChainNotice {
	MultisigCreated(MultisigTransaction),
	MultisigEvent { key: MultisigKey, event: MultisigEvent },
	/// The final approval dispatched the call.
	MultisigExecuted(MultisigKey),
	CallDataRevealed {
		key: MultisigKey,
		#[serde(with = "util::hex_vec")]
		call_data: Vec<u8>,
	},
	ProxyAdded(ProxyAccount),
	ProxyRemoved(ProxyAccount),
	PureProxyKilled {
		#[serde(with = "util::hex")]
		account_id: AccountId,
		#[serde(with = "util::hex")]
		chain_id: ChainId,
	},
}

/// Effect of one notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
	Unchanged,
	Changed,
	/// A multisig transaction moved to another status.
	Status(MultisigKey, MultisigStatus),
}

/// Apply `notice` to `state`.
pub fn apply(state: &mut State, notice: ChainNotice) -> StdResult<Effect, Error> {
	let changed = |c: bool| if c { Effect::Changed } else { Effect::Unchanged };

	match notice {
		ChainNotice::MultisigCreated(tx) => {
			let Some(multisig) = state.multisig(&tx.account_id) else {
				return Err(Rejection::ForeignEvent.into());
			};

			multisig.validate()?;

			if !multisig.contains(&tx.depositor) {
				return Err(Validation::UnknownSignatory(tx.depositor).into());
			}
			if Table::get(&state.multisig_transactions, &tx.key()).is_some() {
				return Ok(Effect::Unchanged);
			}

			state.multisig_transactions.create_all(vec![tx]);

			Ok(Effect::Changed)
		},
		ChainNotice::MultisigEvent { key, event } => {
			let multisig = state
				.multisig(&key.account_id)
				.cloned()
				.ok_or(Rejection::ForeignEvent)?;
			let tx = transaction(state, &key)?;
			let before = tx.status;
			let applied = tx.apply_event(&multisig, event)?;

			if tx.status != before {
				Ok(Effect::Status(key, tx.status))
			} else {
				Ok(changed(applied.changed()))
			}
		},
		ChainNotice::MultisigExecuted(key) => {
			let tx = transaction(state, &key)?;

			match tx.status {
				MultisigStatus::Executed => Ok(Effect::Unchanged),
				MultisigStatus::Signing => {
					tx.status = MultisigStatus::Executed;

					Ok(Effect::Status(key, MultisigStatus::Executed))
				},
				s => Err(Rejection::Terminal(s).into()),
			}
		},
		ChainNotice::CallDataRevealed { key, call_data } =>
			Ok(changed(transaction(state, &key)?.reveal_call_data(call_data)?)),
		ChainNotice::ProxyAdded(p) => Ok(changed(proxy::add(&mut state.proxies, p))),
		ChainNotice::ProxyRemoved(p) => Ok(changed(proxy::remove(&mut state.proxies, &p))),
		ChainNotice::PureProxyKilled { account_id, chain_id } =>
			Ok(changed(proxy::remove_pure(&mut state.proxies, &account_id, &chain_id) != 0)),
	}
}

fn transaction<'a>(
	state: &'a mut State,
	key: &MultisigKey,
) -> StdResult<&'a mut MultisigTransaction, Error> {
	state
		.multisig_transactions
		.iter_mut()
		.find(|t| &t.key() == key)
		.ok_or(Error::Rejected(Rejection::ForeignEvent))
}

/// Drain `notices` into `database` until every sender is gone.
///
/// Rejected notices are logged and skipped, a status change is saved and notified.
pub async fn run<N>(
	mut notices: Receiver<ChainNotice>,
	database: &mut Database,
	notifier: &N,
) -> Result<()>
where
	N: Notify,
{
	while let Some(notice) = notices.recv().await {
		tracing::debug!("{notice:?}");

		match apply(&mut database.state, notice) {
			Ok(Effect::Unchanged) => tracing::debug!("notice has been applied already"),
			Ok(Effect::Changed) => database.save()?,
			Ok(Effect::Status(key, status)) => {
				tracing::info!(
					"multisig transaction({}) is {status:?}",
					array_bytes::bytes2hex("0x", key.call_hash)
				);

				database.save()?;
				notifier.notify(&key, &format!("multisig transaction {status:?}")).await;
			},
			Err(e) => tracing::warn!("skip notice, {e}"),
		}
	}

	tracing::info!("chain observer stopped");

	Ok(())
}
