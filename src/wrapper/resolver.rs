// multiwrap
use crate::{prelude::*, wrapper::TxWrapper};

/// Wallets and accounts which may take part in signing, usually everything the user holds.
#[derive(Clone, Copy, Debug)]
pub struct Signers<'a> {
	pub wallets: &'a [Wallet],
	pub accounts: &'a [Account],
}
impl<'a> Signers<'a> {
	pub fn wallet_of(&self, account: &Account) -> Option<&'a Wallet> {
		self.wallets.iter().find(|w| w.id == account.wallet_id)
	}

	fn can_sign(&self, account: &Account) -> bool {
		self.wallet_of(account).map_or(false, |w| w.r#type.can_sign())
	}
}

/// Find the layers routing a call from `signer_wallet` to `target`.
///
/// `None` means no eligible signer path exists, the operation is unavailable.
pub fn resolve(
	signer_wallet: &Wallet,
	signer_wallet_accounts: &[Account],
	target: &Account,
	signers: Signers,
	selected_signatories: &[Account],
) -> Option<Vec<TxWrapper>> {
	let wrappers = match &target.kind {
		AccountKind::Multisig(m) =>
			resolve_multisig(target, m, signers, selected_signatories).map(|w| vec![w]),
		AccountKind::Proxied(p) => resolve_proxied(target, p, signers, selected_signatories),
		_ => {
			let owned = target.wallet_id == signer_wallet.id
				&& signer_wallet.r#type.can_sign()
				&& signer_wallet_accounts.iter().any(|a| a.account_id == target.account_id);

			owned.then(Vec::new)
		},
	};

	if wrappers.is_none() {
		tracing::debug!(
			"no signer path from wallet({}) to account({})",
			signer_wallet.id,
			array_bytes::bytes2hex("0x", target.account_id)
		);
	}

	wrappers
}

fn resolve_multisig(
	target: &Account,
	multisig: &Multisig,
	signers: Signers,
	selected: &[Account],
) -> Option<TxWrapper> {
	if selected.is_empty() {
		return None;
	}
	if let Err(e) = multisig.validate() {
		tracing::warn!("skip multisig({}), {e}", array_bytes::bytes2hex("0x", target.account_id));

		return None;
	}

	let eligible = selected.iter().all(|s| {
		s.wallet_id != target.wallet_id
			&& s.is_plain()
			&& multisig.contains(&s.account_id)
			&& s.is_compatible_with(target)
			&& signers.can_sign(s)
	});

	eligible.then(|| TxWrapper::Multisig {
		multisig_account: target.clone(),
		signatories: selected.to_vec(),
	})
}

fn resolve_proxied(
	target: &Account,
	proxied: &Proxied,
	signers: Signers,
	selected: &[Account],
) -> Option<Vec<TxWrapper>> {
	let delegates = signers
		.accounts
		.iter()
		.filter(|a| a.account_id == proxied.proxy_account_id && a.is_compatible_with(target))
		.filter(|a| {
			// Root keys of a vault never sign through a proxy.
			!(a.is_base() && signers.wallet_of(a).map_or(true, |w| w.r#type.is_vault()))
		})
		.collect::<Vec<_>>();
	let proxy = |delegate: &Account| TxWrapper::Proxy {
		proxy_account: delegate.clone(),
		proxy_type: proxied.proxy_type.clone(),
		proxied_account_id: target.account_id,
	};

	if let Some(d) = delegates.iter().find(|a| a.is_plain() && signers.can_sign(a)) {
		return Some(vec![proxy(*d)]);
	}

	delegates.iter().find_map(|d| {
		let m = d.as_multisig()?;
		let w = resolve_multisig(d, m, signers, selected)?;

		Some(vec![proxy(*d), w])
	})
}


#[cfg(test)]
mod test {
	// multiwrap
	use super::{mock::*, *};

	#[test]
	fn resolve_owned_account_should_work() {
		let w = wallet(1, WalletType::PolkadotVault);
		let a = chain_account(1, 1);
		let accounts = [a.clone()];
		let wallets = [w.clone()];
		let signers = Signers { wallets: &wallets, accounts: &accounts };

		assert_eq!(resolve(&w, &accounts, &a, signers, &[]), Some(Vec::new()));

		let watch_only = wallet(1, WalletType::WatchOnly);

		assert_eq!(resolve(&watch_only, &accounts, &a, signers, &[]), None);

		let foreign = chain_account(2, 2);

		assert_eq!(resolve(&w, &accounts, &foreign, signers, &[]), None);
	}

	#[test]
	fn resolve_multisig_should_work() {
		let wallets = [
			wallet(1, WalletType::Multisig),
			wallet(2, WalletType::PolkadotVault),
			wallet(3, WalletType::WatchOnly),
		];
		let m = multisig_account(1, 9, &[1, 2, 3], 2);
		let s1 = chain_account(2, 1);
		let s3 = chain_account(3, 3);
		let outsider = chain_account(2, 4);
		let accounts = [m.clone(), s1.clone(), s3.clone(), outsider.clone()];
		let signers = Signers { wallets: &wallets, accounts: &accounts };

		assert_eq!(
			resolve(&wallets[0], &[m.clone()], &m, signers, &[s1.clone()]),
			Some(vec![TxWrapper::Multisig { multisig_account: m.clone(), signatories: vec![s1.clone()] }])
		);
		// Nothing selected.
		assert_eq!(resolve(&wallets[0], &[m.clone()], &m, signers, &[]), None);
		// Not a signatory.
		assert_eq!(resolve(&wallets[0], &[m.clone()], &m, signers, &[outsider]), None);
		// Watch-only wallets hold no key.
		assert_eq!(resolve(&wallets[0], &[m.clone()], &m, signers, &[s3]), None);
		// The multisig's own wallet is excluded.
		assert_eq!(
			resolve(&wallets[0], &[m.clone()], &m, signers, &[chain_account(1, 2)]),
			None
		);

		// A broken definition never resolves.
		for (signatories, threshold) in [(&[1, 2, 3][..], 0), (&[1, 1, 3][..], 2)] {
			let m = multisig_account(1, 9, signatories, threshold);

			assert_eq!(resolve(&wallets[0], &[m.clone()], &m, signers, &[s1.clone()]), None);
		}
	}

	#[test]
	fn resolve_proxied_should_work() {
		let wallets = [wallet(1, WalletType::Proxied), wallet(2, WalletType::WalletConnect)];
		let proxied = proxied_account(1, 7, 1, ProxyType::Staking);
		let delegate = chain_account(2, 1);
		let accounts = [proxied.clone(), delegate.clone()];
		let signers = Signers { wallets: &wallets, accounts: &accounts };

		assert_eq!(
			resolve(&wallets[0], &[proxied.clone()], &proxied, signers, &[]),
			Some(vec![TxWrapper::Proxy {
				proxy_account: delegate,
				proxy_type: ProxyType::Staking,
				proxied_account_id: [7; 32],
			}])
		);
	}

	#[test]
	fn resolve_proxied_vault_base_should_be_excluded() {
		let wallets = [wallet(1, WalletType::Proxied), wallet(2, WalletType::PolkadotVault)];
		let proxied = proxied_account(1, 7, 1, ProxyType::Any);
		let accounts = [proxied.clone(), account(2, 1, AccountKind::Base)];
		let signers = Signers { wallets: &wallets, accounts: &accounts };

		assert_eq!(resolve(&wallets[0], &[proxied.clone()], &proxied, signers, &[]), None);

		// A derived key of the same vault is fine.
		let accounts = [proxied.clone(), chain_account(2, 1)];
		let signers = Signers { wallets: &wallets, accounts: &accounts };

		assert!(resolve(&wallets[0], &[proxied.clone()], &proxied, signers, &[]).is_some());
	}

	#[test]
	fn resolve_proxied_multisig_should_work() {
		let wallets = [
			wallet(1, WalletType::Proxied),
			wallet(2, WalletType::Multisig),
			wallet(3, WalletType::Ledger),
		];
		let proxied = proxied_account(1, 7, 9, ProxyType::Any);
		let m = multisig_account(2, 9, &[1, 2], 2);
		let s1 = chain_account(3, 1);
		let accounts = [proxied.clone(), m.clone(), s1.clone()];
		let signers = Signers { wallets: &wallets, accounts: &accounts };

		assert_eq!(
			resolve(&wallets[0], &[proxied.clone()], &proxied, signers, &[s1.clone()]),
			Some(vec![
				TxWrapper::Proxy {
					proxy_account: m.clone(),
					proxy_type: ProxyType::Any,
					proxied_account_id: [7; 32],
				},
				TxWrapper::Multisig { multisig_account: m, signatories: vec![s1] },
			])
		);
		// The multisig layer needs a signatory.
		assert_eq!(resolve(&wallets[0], &[proxied.clone()], &proxied, signers, &[]), None);
	}

	#[test]
	fn resolve_proxy_of_proxy_should_be_unavailable() {
		let wallets = [wallet(1, WalletType::Proxied), wallet(2, WalletType::Proxied)];
		let proxied = proxied_account(1, 7, 8, ProxyType::Any);
		let accounts = [proxied.clone(), proxied_account(2, 8, 1, ProxyType::Any)];
		let signers = Signers { wallets: &wallets, accounts: &accounts };

		assert_eq!(resolve(&wallets[0], &[proxied.clone()], &proxied, signers, &[]), None);
	}
}
