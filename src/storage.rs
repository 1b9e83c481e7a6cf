//! Record tables and the JSON state file holding them.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// crates.io
use serde::{de::DeserializeOwned, Deserialize, Serialize};
// multiwrap
use crate::prelude::*;

/// A persisted record with a natural key.
pub trait Record: Clone + Serialize + DeserializeOwned {
	type Key: Clone + PartialEq;

	fn key(&self) -> Self::Key;
}
impl Record for Wallet {
	type Key = WalletId;

	fn key(&self) -> Self::Key {
		self.id
	}
}
impl Record for Account {
	type Key = (WalletId, AccountId, Option<ChainId>);

	fn key(&self) -> Self::Key {
		(self.wallet_id, self.account_id, self.chain_id().copied())
	}
}
impl Record for Chain {
	type Key = ChainId;

	fn key(&self) -> Self::Key {
		self.chain_id
	}
}
impl Record for ProxyAccount {
	type Key = Self;

	fn key(&self) -> Self::Key {
		self.clone()
	}
}
impl Record for ProxyDeposits {
	type Key = ChainId;

	fn key(&self) -> Self::Key {
		self.chain_id
	}
}
impl Record for ProxyGroup {
	type Key = ProxyGroupKey;

	fn key(&self) -> Self::Key {
		ProxyGroup::key(self)
	}
}
impl Record for MultisigTransaction {
	type Key = MultisigKey;

	fn key(&self) -> Self::Key {
		MultisigTransaction::key(self)
	}
}

pub trait Table<R>
where
	R: Record,
{
	fn read_all(&self) -> &[R];

	/// Insert or replace by key.
	fn create_all(&mut self, records: Vec<R>);

	/// Returns the number of deleted records.
	fn delete_all(&mut self, keys: &[R::Key]) -> usize;

	fn get(&self, key: &R::Key) -> Option<&R> {
		self.read_all().iter().find(|r| &r.key() == key)
	}
}
impl<R> Table<R> for Vec<R>
where
	R: Record,
{
	fn read_all(&self) -> &[R] {
		self
	}

	fn create_all(&mut self, records: Vec<R>) {
		for r in records {
			let key = r.key();

			match self.iter_mut().find(|e| e.key() == key) {
				Some(e) => *e = r,
				None => self.push(r),
			}
		}
	}

	fn delete_all(&mut self, keys: &[R::Key]) -> usize {
		let before = self.len();

		self.retain(|r| !keys.contains(&r.key()));

		before - self.len()
	}
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct State {
	pub wallets: Vec<Wallet>,
	pub accounts: Vec<Account>,
	pub chains: Vec<Chain>,
	pub proxies: Vec<ProxyAccount>,
	pub deposits: Vec<ProxyDeposits>,
	pub proxy_groups: Vec<ProxyGroup>,
	pub multisig_transactions: Vec<MultisigTransaction>,
}
impl State {
	pub fn wallet(&self, id: WalletId) -> Option<&Wallet> {
		Table::get(&self.wallets, &id)
	}

	pub fn wallet_accounts(&self, id: WalletId) -> Vec<Account> {
		self.accounts.iter().filter(|a| a.wallet_id == id).cloned().collect()
	}

	/// Definition of the multisig account `who`.
	pub fn multisig(&self, who: &AccountId) -> Option<&Multisig> {
		self.accounts.iter().filter(|a| &a.account_id == who).find_map(Account::as_multisig)
	}
}

/// The state file, or a state kept in memory only.
#[derive(Debug, Default)]
pub struct Database {
	path: Option<PathBuf>,
	pub state: State,
}
impl Database {
	pub fn in_memory(state: State) -> Self {
		Self { path: None, state }
	}

	/// Open `path`, a missing file is an empty state.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref().to_path_buf();
		let state = if path.is_file() {
			serde_json::from_str(&fs::read_to_string(&path)?)?
		} else {
			tracing::info!("create state file {}", path.display());

			State::default()
		};

		for a in &state.accounts {
			a.validate()?;
		}

		Ok(Self { path: Some(path), state })
	}

	pub fn save(&self) -> Result<()> {
		if let Some(p) = &self.path {
			if let Some(d) = p.parent() {
				fs::create_dir_all(d)?;
			}

			fs::write(p, serde_json::to_string_pretty(&self.state)?)?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod test {
	// multiwrap
	use super::*;
	use crate::wrapper::mock::*;

	fn group(p: u8, total_deposit: Balance) -> ProxyGroup {
		ProxyGroup { wallet_id: 1, proxied_account_id: [p; 32], chain_id: POLKADOT, total_deposit }
	}

	#[test]
	fn table_should_work() {
		let mut t = Vec::<ProxyGroup>::new();

		t.create_all(vec![group(1, 10), group(2, 20)]);
		t.create_all(vec![group(1, 15)]);

		assert_eq!(t.read_all(), &[group(1, 15), group(2, 20)]);
		assert_eq!(Table::get(&t, &group(2, 0).key()), Some(&group(2, 20)));
		assert_eq!(t.delete_all(&[group(2, 0).key(), group(3, 0).key()]), 1);
		assert_eq!(t.read_all(), &[group(1, 15)]);
	}

	#[test]
	fn database_should_work() {
		let path = std::env::temp_dir().join(format!("multiwrap-{}.json", util::now()));
		let mut db = Database::open(&path).unwrap();

		assert_eq!(db.state, State::default());

		let mut multisig = multisig_account(1, 9, &[1, 2], 2);
		let multisig_id = multisig.as_multisig().map(Multisig::account_id).unwrap();

		multisig.account_id = multisig_id;

		db.state.wallets.create_all(vec![wallet(1, WalletType::PolkadotVault)]);
		db.state.accounts.create_all(vec![multisig]);
		db.state.multisig_transactions.create_all(vec![MultisigTransaction::new(
			multisig_id,
			POLKADOT,
			[7; 32],
			Timepoint { height: 1, index: 0 },
			[1; 32],
		)]);
		db.save().unwrap();

		let reopened = Database::open(&path).unwrap();

		assert_eq!(reopened.state, db.state);
		assert_eq!(reopened.state.multisig(&multisig_id).map(|m| m.threshold), Some(2));
		assert_eq!(reopened.state.wallet(1).map(|w| w.r#type), Some(WalletType::PolkadotVault));

		fs::remove_file(path).unwrap();
	}

	#[test]
	fn open_invalid_multisig_should_fail() {
		let path = std::env::temp_dir().join(format!("multiwrap-invalid-{}.json", util::now()));

		for account in [multisig_account(1, 9, &[1, 2], 2), multisig_account(1, 9, &[1, 2], 0)] {
			let db = Database {
				path: Some(path.clone()),
				state: State { accounts: vec![account], ..Default::default() },
			};

			db.save().unwrap();

			let e = Database::open(&path).unwrap_err();

			assert!(matches!(
				e.downcast_ref::<Validation>(),
				Some(Validation::MultisigAccountMismatch(_) | Validation::InvalidThreshold { .. })
			));
		}

		fs::remove_file(path).unwrap();
	}
}
