// std
use std::{fs, path::PathBuf};
// crates.io
use app_dirs2::{AppDataType, AppInfo};
use serde::Deserialize;
// multiwrap
use crate::prelude::*;

pub const MULTIWRAP: AppInfo = AppInfo { name: "multiwrap", author: "Xavier Lau" };

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigurationToml {
	pub network: Network,
	pub node_endpoint: Option<String>,
	pub database: Option<PathBuf>,
	pub max_weight: Option<Weight>,
	#[serde(default)]
	pub notification: NotificationToml,
}
impl ConfigurationToml {
	pub fn load(path: Option<PathBuf>) -> Result<Self> {
		fn initialize(path: &PathBuf) -> Result<ConfigurationToml> {
			if !path.is_file() {
				let s = include_str!("../configuration-template.toml");

				fs::write(path, s)?;

				tracing::info!("configuration template written to {}", path.display());

				Ok(toml::from_str(s)?)
			} else {
				Ok(toml::from_str(&fs::read_to_string(path)?)?)
			}
		}

		let path = path.unwrap_or(app_dirs2::app_root(AppDataType::UserConfig, &MULTIWRAP)?);

		if matches!(path.extension().map(|s| s.to_str().unwrap_or_default()), Some("toml")) {
			return initialize(&path);
		}
		if !path.is_dir() {
			fs::create_dir_all(&path)?;
		}

		let path = path.join("config.toml");

		initialize(&path)
	}

	pub fn try_into_configuration(self) -> Result<Configuration> {
		let Self { network, node_endpoint, database, max_weight, notification } = self;
		let node_endpoint = node_endpoint.unwrap_or_else(|| network.node_endpoint().to_owned());

		if !util::check_ws_uri(&node_endpoint) {
			anyhow::bail!("invalid node endpoint({node_endpoint})");
		}
		if let Some(w) = notification.webhooks.iter().find(|w| !util::check_http_uri(w)) {
			anyhow::bail!("invalid webhook({w})");
		}

		let database = match database {
			Some(d) => d,
			None => app_dirs2::get_app_root(AppDataType::UserData, &MULTIWRAP)?
				.join(format!("{}.json", network.name())),
		};

		Ok(Configuration {
			network,
			node_endpoint,
			database,
			max_weight,
			notification: Notification { webhooks: notification.webhooks },
		})
	}
}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationToml {
	#[serde(default)]
	pub webhooks: Vec<String>,
}

#[derive(Debug)]
pub struct Configuration {
	pub network: Network,
	pub node_endpoint: String,
	/// JSON state file.
	pub database: PathBuf,
	/// Declared weight of a final multisig approval, [`MAX_WEIGHT`] if absent.
	pub max_weight: Option<Weight>,
	pub notification: Notification,
}
#[derive(Debug)]
pub struct Notification {
	pub webhooks: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
	Polkadot,
	Kusama,
	Westend,
}
impl Network {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Polkadot => "polkadot",
			Self::Kusama => "kusama",
			Self::Westend => "westend",
		}
	}

	pub fn address_prefix(&self) -> u16 {
		match self {
			Self::Polkadot => 0,
			Self::Kusama => 2,
			Self::Westend => 42,
		}
	}

	pub fn node_endpoint(&self) -> &'static str {
		match self {
			Self::Polkadot => "wss://rpc.polkadot.io:443",
			Self::Kusama => "wss://kusama-rpc.polkadot.io:443",
			Self::Westend => "wss://westend-rpc.polkadot.io:443",
		}
	}
}

#[test]
fn template_should_work() {
	let c = toml::from_str::<ConfigurationToml>(include_str!("../configuration-template.toml"))
		.unwrap();

	assert_eq!(c.network, Network::Polkadot);
	assert!(c.node_endpoint.is_none());
	assert!(c.max_weight.is_none());

	let c = c.try_into_configuration().unwrap();

	assert_eq!(c.node_endpoint, "wss://rpc.polkadot.io:443");
	assert!(c.database.ends_with("polkadot.json"));
	assert!(c.notification.webhooks.is_empty());
}

#[test]
fn try_into_configuration_should_work() {
	let c = toml::from_str::<ConfigurationToml>(
		r#"
network       = "westend"
node-endpoint = "ws://127.0.0.1:9944"
database      = "/tmp/multiwrap.json"

[max-weight]
ref-time   = 1000
proof-size = 2000

[notification]
webhooks = ["https://hooks.slack.com/services/T0/B0/X"]
"#,
	)
	.unwrap()
	.try_into_configuration()
	.unwrap();

	assert_eq!(c.network, Network::Westend);
	assert_eq!(c.node_endpoint, "ws://127.0.0.1:9944");
	assert_eq!(c.database, PathBuf::from("/tmp/multiwrap.json"));
	assert_eq!(c.max_weight, Some(Weight { ref_time: 1000, proof_size: 2000 }));
	assert_eq!(c.notification.webhooks.len(), 1);

	for bad in [
		"network = \"kusama\"\nnode-endpoint = \"https://kusama.io\"",
		"network = \"kusama\"\n[notification]\nwebhooks = [\"slack\"]",
	] {
		assert!(toml::from_str::<ConfigurationToml>(bad)
			.unwrap()
			.try_into_configuration()
			.is_err());
	}
}
