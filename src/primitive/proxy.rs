// std
use std::fmt::{Display, Formatter, Result as FmtResult};
// crates.io
use serde::{Deserialize, Serialize};
// multiwrap
use crate::{prelude::*, util};

/// Capability tag of a proxy relationship, named after the runtime `ProxyType` variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyType {
	Any,
	NonTransfer,
	Governance,
	Staking,
	IdentityJudgement,
	CancelProxy,
	Auction,
	NominationPools,
	Other(String),
}
impl ProxyType {
	pub fn name(&self) -> &str {
		match self {
			Self::Any => "Any",
			Self::NonTransfer => "NonTransfer",
			Self::Governance => "Governance",
			Self::Staking => "Staking",
			Self::IdentityJudgement => "IdentityJudgement",
			Self::CancelProxy => "CancelProxy",
			Self::Auction => "Auction",
			Self::NominationPools => "NominationPools",
			Self::Other(n) => n,
		}
	}
}
impl From<String> for ProxyType {
	fn from(s: String) -> Self {
		match s.as_str() {
			"Any" => Self::Any,
			"NonTransfer" => Self::NonTransfer,
			"Governance" => Self::Governance,
			"Staking" => Self::Staking,
			"IdentityJudgement" => Self::IdentityJudgement,
			"CancelProxy" => Self::CancelProxy,
			"Auction" => Self::Auction,
			"NominationPools" => Self::NominationPools,
			_ => Self::Other(s),
		}
	}
}
impl From<ProxyType> for String {
	fn from(t: ProxyType) -> Self {
		t.name().to_owned()
	}
}
impl Display for ProxyType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.name())
	}
}
#[test]
fn proxy_type_name_should_work() {
	assert_eq!(ProxyType::from("Staking".to_owned()), ProxyType::Staking);
	assert_eq!(ProxyType::from("Society".to_owned()), ProxyType::Other("Society".into()));
	assert_eq!(ProxyType::Other("Society".into()).to_string(), "Society");
	assert_eq!(String::from(ProxyType::NonTransfer), "NonTransfer");
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyVariant {
	#[default]
	Regular,
	/// Keyless account created by `create_pure`, reachable only through its delegate.
	Pure,
}

/// A directed delegation edge, `account_id` may act for `proxied_account_id`.
///
/// Identity is the whole tuple, the same pair of accounts may be linked several times with
/// different capabilities or delays.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyAccount {
	#[serde(with = "util::hex")]
	pub account_id: AccountId,
	#[serde(with = "util::hex")]
	pub proxied_account_id: AccountId,
	#[serde(with = "util::hex")]
	pub chain_id: ChainId,
	pub proxy_type: ProxyType,
	#[serde(default)]
	pub delay: BlockNumber,
}

/// Amount reserved by each delegator for its proxy relationships on one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyDeposits {
	#[serde(with = "util::hex")]
	pub chain_id: ChainId,
	pub deposits: Vec<ProxyDeposit>,
}
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyDeposit {
	#[serde(with = "util::hex")]
	pub account_id: AccountId,
	pub deposit: Balance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyGroupKey {
	pub wallet_id: WalletId,
	pub proxied_account_id: AccountId,
	pub chain_id: ChainId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyGroup {
	pub wallet_id: WalletId,
	#[serde(with = "util::hex")]
	pub proxied_account_id: AccountId,
	#[serde(with = "util::hex")]
	pub chain_id: ChainId,
	pub total_deposit: Balance,
}
impl ProxyGroup {
	pub fn key(&self) -> ProxyGroupKey {
		ProxyGroupKey {
			wallet_id: self.wallet_id,
			proxied_account_id: self.proxied_account_id,
			chain_id: self.chain_id,
		}
	}
}
