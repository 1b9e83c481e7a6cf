//! Delegation layers between a signer and the account owning a call.

mod resolver;
pub use resolver::*;

mod transaction;
pub use transaction::*;

// multiwrap
use crate::prelude::*;

/// One layer of call nesting.
///
/// A resolved operation carries these innermost first, an empty list means the signer owns the
/// target account and the call is submitted as is.
#[derive(Clone, Debug, PartialEq)]
pub enum TxWrapper {
	/// `proxy_account` dispatches `Proxy::proxy` on behalf of `proxied_account_id`.
	Proxy { proxy_account: Account, proxy_type: ProxyType, proxied_account_id: AccountId },
	/// `signatories` are the locally held signers selected to act for `multisig_account`, the
	/// first one signs.
	Multisig { multisig_account: Account, signatories: Vec<Account> },
}
impl TxWrapper {
	pub fn is_multisig(&self) -> bool {
		matches!(self, Self::Multisig { .. })
	}

	/// The account that signs the extrinsic once this layer is the outermost one.
	pub fn signer(&self) -> Option<&Account> {
		match self {
			Self::Proxy { proxy_account, .. } => Some(proxy_account),
			Self::Multisig { signatories, .. } => signatories.first(),
		}
	}
}

pub fn has_multisig(wrappers: &[TxWrapper]) -> bool {
	wrappers.iter().any(TxWrapper::is_multisig)
}
