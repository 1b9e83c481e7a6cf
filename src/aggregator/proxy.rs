//! Proxy relationship records of the chains a wallet follows.

// std
use std::collections::BTreeSet;
// multiwrap
use crate::prelude::*;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProxyDiff {
	pub to_add: Vec<ProxyAccount>,
	pub to_remove: Vec<ProxyAccount>,
}

/// Compare the stored records of `chain_id` against the ones found on chain.
pub fn diff(existing: &[ProxyAccount], on_chain: &[ProxyAccount], chain_id: &ChainId) -> ProxyDiff {
	let stored = existing.iter().filter(|p| &p.chain_id == chain_id).collect::<BTreeSet<_>>();
	let found = on_chain.iter().filter(|p| &p.chain_id == chain_id).collect::<BTreeSet<_>>();

	ProxyDiff {
		to_add: found.difference(&stored).map(|p| (*p).clone()).collect(),
		to_remove: stored.difference(&found).map(|p| (*p).clone()).collect(),
	}
}

/// Returns whether the record was new.
pub fn add(records: &mut Vec<ProxyAccount>, proxy: ProxyAccount) -> bool {
	if records.contains(&proxy) {
		return false;
	}

	records.push(proxy);

	true
}

/// Returns whether the record existed.
pub fn remove(records: &mut Vec<ProxyAccount>, proxy: &ProxyAccount) -> bool {
	let before = records.len();

	records.retain(|p| p != proxy);

	records.len() != before
}

/// Drop every relationship of a killed pure proxy, returns the number removed.
pub fn remove_pure(records: &mut Vec<ProxyAccount>, pure: &AccountId, chain_id: &ChainId) -> usize {
	let before = records.len();

	records.retain(|p| {
		&p.chain_id != chain_id || (&p.account_id != pure && &p.proxied_account_id != pure)
	});

	before - records.len()
}

/// Proxied accounts to create for relationships whose delegate is held in `accounts`.
///
/// Relationships already covered by a proxied account are skipped. Delegators listed in `pure`
/// are marked as pure proxies. Discovered accounts are placed in `wallet_id`.
pub fn discover_proxied(
	proxies: &[ProxyAccount],
	accounts: &[Account],
	pure: &[AccountId],
	wallet_id: WalletId,
) -> Vec<Account> {
	let mut discovered = Vec::<Account>::new();

	for p in proxies {
		let Some(delegate) = accounts.iter().find(|a| {
			a.account_id == p.account_id && a.as_proxied().is_none() && a.is_on_chain(&p.chain_id)
		}) else {
			continue;
		};

		if accounts.iter().chain(&discovered).any(|a| covers(a, p)) {
			continue;
		}

		let proxy_variant = if pure.contains(&p.proxied_account_id) {
			ProxyVariant::Pure
		} else {
			ProxyVariant::Regular
		};

		tracing::info!(
			"discovered {proxy_variant:?} proxied account({}) with delegate({})",
			array_bytes::bytes2hex("0x", p.proxied_account_id),
			array_bytes::bytes2hex("0x", p.account_id)
		);

		discovered.push(Account {
			wallet_id,
			account_id: p.proxied_account_id,
			name: String::new(),
			crypto_type: delegate.crypto_type,
			kind: AccountKind::Proxied(Proxied {
				chain_id: p.chain_id,
				proxy_account_id: p.account_id,
				proxy_type: p.proxy_type.clone(),
				proxy_variant,
				delay: p.delay,
			}),
		});
	}

	discovered
}

fn covers(account: &Account, proxy: &ProxyAccount) -> bool {
	account.account_id == proxy.proxied_account_id
		&& account.as_proxied().map_or(false, |p| {
			p.chain_id == proxy.chain_id
				&& p.proxy_account_id == proxy.account_id
				&& p.proxy_type == proxy.proxy_type
		})
}

#[cfg(test)]
mod test {
	// multiwrap
	use super::*;
	use crate::wrapper::mock::*;

	fn record(delegate: u8, proxied: u8, proxy_type: ProxyType) -> ProxyAccount {
		ProxyAccount {
			account_id: [delegate; 32],
			proxied_account_id: [proxied; 32],
			chain_id: POLKADOT,
			proxy_type,
			delay: 0,
		}
	}

	#[test]
	fn diff_should_work() {
		let existing = [record(1, 7, ProxyType::Any), record(1, 7, ProxyType::Staking)];
		let on_chain = [record(1, 7, ProxyType::Staking), record(2, 7, ProxyType::Governance)];
		let d = diff(&existing, &on_chain, &POLKADOT);

		assert_eq!(d.to_add, vec![record(2, 7, ProxyType::Governance)]);
		assert_eq!(d.to_remove, vec![record(1, 7, ProxyType::Any)]);
		assert_eq!(diff(&existing, &on_chain, &[0; 32]), ProxyDiff::default());
	}

	#[test]
	fn add_remove_should_work() {
		let mut records = Vec::new();

		assert!(add(&mut records, record(1, 7, ProxyType::Any)));
		assert!(!add(&mut records, record(1, 7, ProxyType::Any)));
		// Another capability is another relationship.
		assert!(add(&mut records, record(1, 7, ProxyType::Staking)));
		assert!(remove(&mut records, &record(1, 7, ProxyType::Any)));
		assert!(!remove(&mut records, &record(1, 7, ProxyType::Any)));
		assert_eq!(records, vec![record(1, 7, ProxyType::Staking)]);

		add(&mut records, record(7, 8, ProxyType::Any));
		add(&mut records, record(2, 3, ProxyType::Any));

		assert_eq!(remove_pure(&mut records, &[7; 32], &POLKADOT), 2);
		assert_eq!(records, vec![record(2, 3, ProxyType::Any)]);
	}

	#[test]
	fn discover_proxied_should_work() {
		let accounts = [chain_account(1, 1), proxied_account(2, 7, 1, ProxyType::Any)];
		let proxies = [
			record(1, 7, ProxyType::Any),
			record(1, 7, ProxyType::Staking),
			record(1, 8, ProxyType::Any),
			record(1, 8, ProxyType::Any),
			record(5, 9, ProxyType::Any),
		];
		let discovered = discover_proxied(&proxies, &accounts, &[[8; 32]], 3);

		assert_eq!(discovered.len(), 2);
		assert_eq!(discovered[0].account_id, [7; 32]);
		assert_eq!(discovered[0].as_proxied().unwrap().proxy_type, ProxyType::Staking);
		assert_eq!(discovered[1].account_id, [8; 32]);
		assert_eq!(discovered[1].as_proxied().unwrap().proxy_variant, ProxyVariant::Pure);
		assert!(discovered.iter().all(|a| a.wallet_id == 3));
	}
}
