// crates.io
use scale_value::{Value, ValueDef};
use serde::Deserialize;
// multiwrap
use crate::prelude::*;

// https://github.com/paritytech/substrate/blob/51b2f0ed6af8dd4facb18f1a489e192fd0673f7b/frame/proxy/src/lib.rs#LL76C32-L76C32
#[derive(Debug, Deserialize)]
pub struct ProxyDefinition {
	pub delegate: UnnamedWrapper<AccountId>,
	pub proxy_type: Value<()>,
	pub delay: BlockNumber,
}
impl ProxyDefinition {
	pub fn proxy_type(&self) -> Option<ProxyType> {
		let ValueDef::Variant(v) = &self.proxy_type.value else { return None };

		Some(ProxyType::from(v.name.clone()))
	}

	pub fn into_proxy_account(self, proxied: AccountId, chain_id: ChainId) -> Option<ProxyAccount> {
		Some(ProxyAccount {
			account_id: self.delegate.r#type,
			proxied_account_id: proxied,
			chain_id,
			proxy_type: self.proxy_type()?,
			delay: self.delay,
		})
	}
}
#[test]
fn proxy_definition_should_work() {
	let d = ProxyDefinition {
		delegate: UnnamedWrapper { r#type: [1; 32] },
		proxy_type: Value::unnamed_variant("Staking", []),
		delay: 0,
	};

	assert_eq!(
		d.into_proxy_account([2; 32], [9; 32]),
		Some(ProxyAccount {
			account_id: [1; 32],
			proxied_account_id: [2; 32],
			chain_id: [9; 32],
			proxy_type: ProxyType::Staking,
			delay: 0,
		})
	);

	let d = ProxyDefinition {
		delegate: UnnamedWrapper { r#type: [1; 32] },
		proxy_type: Value::u128(0),
		delay: 0,
	};

	assert_eq!(d.into_proxy_account([2; 32], [9; 32]), None);
}
