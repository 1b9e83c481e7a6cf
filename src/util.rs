// std
use std::time::{SystemTime, UNIX_EPOCH};
// crates.io
use parity_scale_codec::{Decode, Encode};
use regex::Regex;
use reqwest::{
	header::{HeaderMap, CONTENT_TYPE},
	Client, ClientBuilder,
};
use sp_core::blake2_256;
use sp_runtime::traits::TrailingZeroInput;
use subxt::dynamic::Value;
// multiwrap
use crate::prelude::*;

const E_REGEX_MUST_BE_VALID: &str = "regex must be valid";

pub fn check_http_uri(uri: &str) -> bool {
	Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect(E_REGEX_MUST_BE_VALID).is_match(uri)
}
pub fn check_ws_uri(uri: &str) -> bool {
	Regex::new(r"^wss?://[^\s/$.?#].[^\s]*$").expect(E_REGEX_MUST_BE_VALID).is_match(uri)
}
#[test]
fn check_uri_should_work() {
	assert!(check_http_uri("http://localhost:8080/path/to/file.html"));
	assert!(check_http_uri("https://hooks.slack.com/services/T0/B0/X"));
	assert!(!check_http_uri("invalid url"));

	assert!(check_ws_uri("ws://127.0.0.1:9944"));
	assert!(check_ws_uri("wss://rpc.polkadot.io:443"));
	assert!(!check_ws_uri("https://rpc.polkadot.io"));
}

pub fn http_json_client() -> Result<Client> {
	Ok(ClientBuilder::new()
		.default_headers(HeaderMap::from_iter([(CONTENT_TYPE, "application/json".parse()?)]))
		.build()?)
}

/// Unix time in milliseconds.
pub fn now() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as _).unwrap_or_default()
}

pub fn call_hash(call_data: &[u8]) -> CallHash {
	blake2_256(call_data)
}

/// Account id of a multisig, identical to `pallet_multisig::Pallet::multi_account_id`.
///
/// Signatories are sorted first, any order of the input yields the same account.
pub fn multisig_account_id<I>(signatories: I, threshold: u16) -> AccountId
where
	I: IntoIterator<Item = AccountId>,
{
	let mut who = signatories.into_iter().collect::<Vec<_>>();

	who.sort();

	let entropy = (b"modlpy/utilisuba", who, threshold).using_encoded(blake2_256);

	AccountId::decode(&mut TrailingZeroInput::new(&entropy)).unwrap_or(entropy)
}
#[test]
fn multisig_account_id_should_work() {
	let a = multisig_account_id([[1; 32], [2; 32], [3; 32]], 2);

	assert_eq!(a, multisig_account_id([[3; 32], [1; 32], [2; 32]], 2));
	assert_ne!(a, multisig_account_id([[1; 32], [2; 32], [3; 32]], 3));
	assert_ne!(a, multisig_account_id([[1; 32], [2; 32], [4; 32]], 2));
}

/// `base + factor * threshold`, the amount the depositor reserves when opening a multisig call.
pub fn multisig_deposit(base: Balance, factor: Balance, threshold: u16) -> Balance {
	base.saturating_add(factor.saturating_mul(threshold as _))
}
#[test]
fn multisig_deposit_should_work() {
	assert_eq!(multisig_deposit(20, 3, 2), 26);
	assert_eq!(multisig_deposit(Balance::MAX, 1, 1), Balance::MAX);
}

pub fn multi_address(who: &AccountId) -> Value {
	Value::unnamed_variant("Id", [Value::from_bytes(who)])
}

pub fn option_value(v: Option<Value>) -> Value {
	match v {
		Some(v) => Value::unnamed_variant("Some", [v]),
		None => Value::unnamed_variant("None", []),
	}
}

/// `Proxy::proxy(real, force_proxy_type, call)`.
pub fn proxy_of(real: &AccountId, proxy_type: Option<&ProxyType>, call: Call) -> Call {
	Call::new(
		"Proxy",
		"proxy",
		vec![
			multi_address(real),
			option_value(proxy_type.map(|t| Value::unnamed_variant(t.name(), []))),
			call.into_value(),
		],
	)
}

/// `0x` prefixed hex serde for 32 bytes identifiers.
pub mod hex {
	// crates.io
	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&array_bytes::bytes2hex("0x", bytes))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;

		array_bytes::hex2array(&s).map_err(|e| D::Error::custom(format!("invalid hex, {e:?}")))
	}
}

pub mod hex_option {
	// crates.io
	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(bytes: &Option<[u8; 32]>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match bytes {
			Some(b) => serializer.serialize_some(&array_bytes::bytes2hex("0x", b)),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<[u8; 32]>, D::Error>
	where
		D: Deserializer<'de>,
	{
		<Option<String>>::deserialize(deserializer)?
			.map(|s| {
				array_bytes::hex2array(&s)
					.map_err(|e| D::Error::custom(format!("invalid hex, {e:?}")))
			})
			.transpose()
	}
}

pub mod hex_vec {
	// crates.io
	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&array_bytes::bytes2hex("0x", bytes))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;

		array_bytes::hex2bytes(&s).map_err(|e| D::Error::custom(format!("invalid hex, {e:?}")))
	}
}

pub mod hex_vec_option {
	// crates.io
	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match bytes {
			Some(b) => serializer.serialize_some(&array_bytes::bytes2hex("0x", b)),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
	where
		D: Deserializer<'de>,
	{
		<Option<String>>::deserialize(deserializer)?
			.map(|s| {
				array_bytes::hex2bytes(&s)
					.map_err(|e| D::Error::custom(format!("invalid hex, {e:?}")))
			})
			.transpose()
	}
}

#[test]
fn hex_serde_should_work() {
	#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
	struct S {
		#[serde(with = "hex")]
		a: [u8; 32],
		#[serde(default, with = "hex_option")]
		b: Option<[u8; 32]>,
		#[serde(default, with = "hex_vec_option")]
		c: Option<Vec<u8>>,
	}

	let s = S { a: [1; 32], b: None, c: Some(vec![0xde, 0xad]) };
	let json = serde_json::to_string(&s).unwrap();

	assert!(json.contains("\"0x0101"));
	assert!(json.contains("\"0xdead\""));
	assert_eq!(serde_json::from_str::<S>(&json).unwrap(), s);
	assert!(serde_json::from_str::<S>(r#"{"a":"0x01"}"#).is_err());
}
