//! Proxy groups, the proxied balances a wallet keeps track of.

pub mod proxy;

// std
use std::collections::{BTreeMap, BTreeSet, HashMap};
// multiwrap
use crate::prelude::*;

/// Changes turning the stored groups into a fresh aggregation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GroupDiff {
	pub to_add: Vec<ProxyGroup>,
	pub to_update: Vec<ProxyGroup>,
	pub to_remove: Vec<ProxyGroup>,
}
impl GroupDiff {
	pub fn is_empty(&self) -> bool {
		self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
	}
}

/// One group per wallet, proxied account and chain with a matching proxy relationship and a
/// nonzero deposit.
///
/// Deposits of chains missing from `chains` are skipped, the caller runs again once they load.
pub fn aggregate(
	wallets: &[Wallet],
	accounts: &[Account],
	proxies: &[ProxyAccount],
	deposits: &[ProxyDeposits],
	chains: &HashMap<ChainId, Chain>,
) -> Vec<ProxyGroup> {
	let proxied = proxies
		.iter()
		.map(|p| (p.proxied_account_id, p.chain_id))
		.collect::<BTreeSet<_>>();
	let mut groups = BTreeMap::new();

	for ds in deposits {
		let Some(chain) = chains.get(&ds.chain_id) else {
			tracing::debug!(
				"skip proxy deposits of unknown chain({})",
				array_bytes::bytes2hex("0x", ds.chain_id)
			);

			continue;
		};

		for wallet in wallets {
			// A wallet may hold one account id under several derivations.
			let held = accounts
				.iter()
				.filter(|a| a.wallet_id == wallet.id && a.is_on_chain(&chain.chain_id))
				.map(|a| a.account_id)
				.collect::<BTreeSet<_>>();

			for d in &ds.deposits {
				if d.deposit == 0
					|| !held.contains(&d.account_id)
					|| !proxied.contains(&(d.account_id, chain.chain_id))
				{
					continue;
				}

				let group = ProxyGroup {
					wallet_id: wallet.id,
					proxied_account_id: d.account_id,
					chain_id: chain.chain_id,
					total_deposit: d.deposit,
				};

				groups.insert(group.key(), group);
			}
		}
	}

	groups.into_values().collect()
}

/// Compare `fresh` groups against `existing` ones on `chain_ids`.
///
/// Groups are matched on their key, the deposit is ignored. Stored groups on other chains are
/// left alone.
pub fn diff(existing: &[ProxyGroup], fresh: &[ProxyGroup], chain_ids: &[ChainId]) -> GroupDiff {
	let stored = existing.iter().map(|g| g.key()).collect::<BTreeSet<_>>();
	let kept = fresh.iter().map(|g| g.key()).collect::<BTreeSet<_>>();
	let (to_update, to_add) = fresh.iter().cloned().partition(|g| stored.contains(&g.key()));
	let to_remove = existing
		.iter()
		.filter(|g| chain_ids.contains(&g.chain_id) && !kept.contains(&g.key()))
		.cloned()
		.collect();
	let diff = GroupDiff { to_add, to_update, to_remove };

	if !diff.is_empty() {
		tracing::info!(
			"proxy groups +{} ~{} -{}",
			diff.to_add.len(),
			diff.to_update.len(),
			diff.to_remove.len()
		);
	}

	diff
}

/// Chains of `deposits` which are loaded, the ones an aggregation run covers.
pub fn covered_chains(
	deposits: &[ProxyDeposits],
	chains: &HashMap<ChainId, Chain>,
) -> Vec<ChainId> {
	deposits.iter().map(|d| d.chain_id).filter(|c| chains.contains_key(c)).collect()
}
