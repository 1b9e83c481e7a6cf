// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserialize, Serialize};
// multiwrap
use crate::{prelude::*, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletType {
	PolkadotVault,
	WalletConnect,
	Ledger,
	WatchOnly,
	Multisig,
	Proxied,
}
impl WalletType {
	/// Whether the wallet holds a key able to produce a signature by itself.
	pub fn can_sign(self) -> bool {
		matches!(self, Self::PolkadotVault | Self::WalletConnect | Self::Ledger)
	}

	pub fn is_vault(self) -> bool {
		self == Self::PolkadotVault
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Wallet {
	pub id: WalletId,
	pub name: String,
	pub r#type: WalletType,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CryptoType {
	#[default]
	Sr25519,
	Ed25519,
	Ecdsa,
	Ethereum,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Account {
	pub wallet_id: WalletId,
	#[serde(with = "util::hex")]
	pub account_id: AccountId,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub crypto_type: CryptoType,
	pub kind: AccountKind,
}
impl Account {
	/// The chain this account is bound to, `None` for a universal account.
	pub fn chain_id(&self) -> Option<&ChainId> {
		match &self.kind {
			AccountKind::Base => None,
			AccountKind::Chain { chain_id } | AccountKind::Shard { chain_id, .. } =>
				Some(chain_id),
			AccountKind::Multisig(m) => m.chain_id.as_ref(),
			AccountKind::Proxied(p) => Some(&p.chain_id),
		}
	}

	pub fn is_on_chain(&self, chain_id: &ChainId) -> bool {
		self.chain_id().map_or(true, |c| c == chain_id)
	}

	/// Whether both accounts can appear in the same call, on the same chain with the same key
	/// scheme.
	pub fn is_compatible_with(&self, other: &Account) -> bool {
		if self.crypto_type != other.crypto_type {
			return false;
		}

		match (self.chain_id(), other.chain_id()) {
			(Some(a), Some(b)) => a == b,
			_ => true,
		}
	}

	/// A key-holding account, neither multisig nor proxied.
	pub fn is_plain(&self) -> bool {
		matches!(
			self.kind,
			AccountKind::Base | AccountKind::Chain { .. } | AccountKind::Shard { .. }
		)
	}

	pub fn is_base(&self) -> bool {
		matches!(self.kind, AccountKind::Base)
	}

	pub fn as_multisig(&self) -> Option<&Multisig> {
		match &self.kind {
			AccountKind::Multisig(m) => Some(m),
			_ => None,
		}
	}

	pub fn as_proxied(&self) -> Option<&Proxied> {
		match &self.kind {
			AccountKind::Proxied(p) => Some(p),
			_ => None,
		}
	}

	/// A multisig account must be a valid definition whose id derives from it.
	pub fn validate(&self) -> StdResult<(), Validation> {
		let Some(m) = self.as_multisig() else { return Ok(()) };

		m.validate()?;

		if m.account_id() != self.account_id {
			return Err(Validation::MultisigAccountMismatch(self.account_id));
		}

		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AccountKind {
	Base,
	Chain {
		#[serde(with = "util::hex")]
		chain_id: ChainId,
	},
	Shard {
		#[serde(with = "util::hex")]
		chain_id: ChainId,
		group_id: String,
	},
	Multisig(Multisig),
	Proxied(Proxied),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Signatory {
	#[serde(with = "util::hex")]
	pub account_id: AccountId,
	#[serde(default)]
	pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Multisig {
	pub signatories: Vec<Signatory>,
	pub threshold: u16,
	#[serde(default, with = "util::hex_option")]
	pub chain_id: Option<ChainId>,
}
impl Multisig {
	pub fn new(
		signatories: Vec<Signatory>,
		threshold: u16,
		chain_id: Option<ChainId>,
	) -> StdResult<Self, Validation> {
		let m = Self { signatories, threshold, chain_id };

		m.validate()?;

		Ok(m)
	}

	/// Threshold within `[1, signatories]` and signatories unique by account id.
	pub fn validate(&self) -> StdResult<(), Validation> {
		let n = self.signatories.len();

		if self.threshold == 0 || self.threshold as usize > n {
			return Err(Validation::InvalidThreshold { threshold: self.threshold, signatories: n });
		}

		let mut seen = BTreeSet::new();

		for s in &self.signatories {
			if !seen.insert(s.account_id) {
				return Err(Validation::DuplicateSignatory(s.account_id));
			}
		}

		Ok(())
	}

	pub fn contains(&self, who: &AccountId) -> bool {
		self.signatories.iter().any(|s| &s.account_id == who)
	}

	pub fn signatory_ids(&self) -> impl Iterator<Item = &AccountId> {
		self.signatories.iter().map(|s| &s.account_id)
	}

	/// The on-chain account id controlled by this signatory set.
	pub fn account_id(&self) -> AccountId {
		util::multisig_account_id(self.signatory_ids().copied(), self.threshold)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Proxied {
	#[serde(with = "util::hex")]
	pub chain_id: ChainId,
	#[serde(with = "util::hex")]
	pub proxy_account_id: AccountId,
	pub proxy_type: ProxyType,
	#[serde(default)]
	pub proxy_variant: ProxyVariant,
	#[serde(default)]
	pub delay: BlockNumber,
}

#[cfg(test)]
pub(crate) fn signatory(id: u8) -> Signatory {
	Signatory { account_id: [id; 32], name: None }
}

#[test]
fn multisig_validate_should_work() {
	assert!(Multisig::new(vec![signatory(1), signatory(2)], 2, None).is_ok());
	assert_eq!(
		Multisig::new(vec![signatory(1), signatory(2)], 3, None),
		Err(Validation::InvalidThreshold { threshold: 3, signatories: 2 })
	);
	assert_eq!(
		Multisig::new(vec![signatory(1)], 0, None),
		Err(Validation::InvalidThreshold { threshold: 0, signatories: 1 })
	);
	assert_eq!(
		Multisig::new(vec![signatory(1), signatory(1)], 1, None),
		Err(Validation::DuplicateSignatory([1; 32]))
	);
}

#[test]
fn account_validate_should_work() {
	let multisig = |signatories: Vec<Signatory>, threshold| {
		let m = Multisig { signatories, threshold, chain_id: None };
		let account_id = m.account_id();

		Account {
			wallet_id: 1,
			account_id,
			name: String::new(),
			crypto_type: CryptoType::Sr25519,
			kind: AccountKind::Multisig(m),
		}
	};
	let mut a = multisig(vec![signatory(1), signatory(2)], 2);

	assert_eq!(a.validate(), Ok(()));

	a.account_id = [9; 32];

	assert_eq!(a.validate(), Err(Validation::MultisigAccountMismatch([9; 32])));
	assert_eq!(
		multisig(vec![signatory(1), signatory(2)], 0).validate(),
		Err(Validation::InvalidThreshold { threshold: 0, signatories: 2 })
	);
	assert_eq!(
		multisig(vec![signatory(1), signatory(1)], 1).validate(),
		Err(Validation::DuplicateSignatory([1; 32]))
	);

	a.kind = AccountKind::Base;

	assert_eq!(a.validate(), Ok(()));
}

#[test]
fn account_compatibility_should_work() {
	let base = |crypto_type| Account {
		wallet_id: 0,
		account_id: [0; 32],
		name: String::new(),
		crypto_type,
		kind: AccountKind::Base,
	};
	let chain = |chain_id| Account {
		wallet_id: 1,
		account_id: [1; 32],
		name: String::new(),
		crypto_type: CryptoType::Sr25519,
		kind: AccountKind::Chain { chain_id },
	};

	assert!(base(CryptoType::Sr25519).is_compatible_with(&chain([7; 32])));
	assert!(!base(CryptoType::Ethereum).is_compatible_with(&chain([7; 32])));
	assert!(chain([7; 32]).is_compatible_with(&chain([7; 32])));
	assert!(!chain([7; 32]).is_compatible_with(&chain([8; 32])));
	assert!(chain([7; 32]).is_on_chain(&[7; 32]));
	assert!(base(CryptoType::Sr25519).is_on_chain(&[9; 32]));
}
