//! Substrate node collaborator, call encoding, submission and balance watching.

// std
use std::{
	collections::HashMap,
	sync::{Arc, RwLock},
};
// crates.io
use async_trait::async_trait;
use futures::StreamExt;
use jsonrpsee::{
	async_client::{Client as WsClient, ClientBuilder as WsClientBuilder},
	client_transport::ws::WsTransportClientBuilder,
};
use serde::Deserialize;
use sp_core::{sr25519::Pair, Pair as _};
use subxt::{
	config::polkadot::H256,
	dynamic::{self, At, Value},
	tx::{PairSigner, PartialExtrinsic},
	utils::{AccountId32, MultiAddress, MultiSignature},
	Error as SubxtError, OnlineClient, PolkadotConfig,
};
use tokio::task::JoinHandle;
// multiwrap
use crate::{
	operation::{BalanceSubscriber, DepositConstants, ExtrinsicResult, Sign, Signature, Submit},
	prelude::*,
};

type Client = OnlineClient<PolkadotConfig>;
type Balances = Arc<RwLock<HashMap<AccountId, Balance>>>;

#[derive(Debug)]
pub struct Node {
	_ws_connection: Arc<WsClient>,
	pub client: Client,
	/// Genesis hash.
	pub chain_id: ChainId,
}
impl Node {
	pub async fn connect(uri: &str) -> Result<Self> {
		if !util::check_ws_uri(uri) {
			anyhow::bail!("invalid node endpoint({uri})");
		}

		let ws = Self::ws_connect(uri).await?;
		let client: Client = OnlineClient::from_rpc_client(ws.clone()).await?;
		let chain_id = client.genesis_hash().0;

		tracing::info!(
			"connected to node({uri}), chain({})",
			array_bytes::bytes2hex("0x", chain_id)
		);

		Ok(Self { _ws_connection: ws, client, chain_id })
	}

	async fn ws_connect(uri: &str) -> Result<Arc<WsClient>> {
		let (tx, rx) = WsTransportClientBuilder::default().build(uri.parse()?).await?;

		Ok(Arc::new(WsClientBuilder::default().build_with_tokio(tx, rx)))
	}

	fn constant(&self, pallet: &str, name: &str) -> Result<Balance> {
		self.client
			.constants()
			.at(&dynamic::constant(pallet, name))?
			.to_value()?
			.as_u128()
			.ok_or_else(|| anyhow::anyhow!("`{pallet}::{name}` is not a balance"))
	}

	pub fn deposit_constants(&self) -> Result<DepositConstants> {
		Ok(DepositConstants {
			base: self.constant("Multisig", "DepositBase")?,
			factor: self.constant("Multisig", "DepositFactor")?,
		})
	}

	/// Proxy relationships delegated by `real`, and the deposit reserved for them.
	pub async fn proxies_of(&self, real: &AccountId) -> Result<(Vec<ProxyAccount>, Balance)> {
		let Some(p) = self
			.client
			.storage()
			.at_latest()
			.await?
			.fetch(&dynamic::storage("Proxy", "Proxies", vec![Value::from_bytes(real)]))
			.await?
		else {
			return Ok((Vec::new(), 0));
		};
		// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/frame/proxy/src/lib.rs
		let (definitions, deposit) =
			<(Vec<UnnamedWrapper<ProxyDefinition>>, Balance)>::deserialize(p.to_value()?)?;
		let proxies = definitions
			.into_iter()
			.filter_map(|d| d.r#type.into_proxy_account(*real, self.chain_id))
			.collect();

		Ok((proxies, deposit))
	}

	/// Proxy records and deposits of `reals` on this chain.
	pub async fn proxy_snapshot(
		&self,
		reals: &[AccountId],
	) -> Result<(Vec<ProxyAccount>, ProxyDeposits)> {
		let mut proxies = Vec::new();
		let mut deposits = Vec::new();

		for r in reals {
			let (p, deposit) = self.proxies_of(r).await?;

			proxies.extend(p);
			deposits.push(ProxyDeposit { account_id: *r, deposit });
		}

		Ok((proxies, ProxyDeposits { chain_id: self.chain_id, deposits }))
	}

	/// Partial fee of `call` signed by `pair`.
	pub async fn estimate_fee(&self, call: &Call, pair: &Pair) -> Result<Balance> {
		let signer = PairSigner::<PolkadotConfig, Pair>::new(pair.clone());

		Ok(self
			.client
			.tx()
			.create_signed(&call.payload(), &signer, Default::default())
			.await?
			.partial_fee_estimate()
			.await?)
	}

	pub async fn free_balance(&self, who: &AccountId) -> Result<Balance> {
		free_balance_at(&self.client, None, who).await
	}

	/// Watch the free balances of the accounts an operation subscribes.
	pub fn balance_watcher(&self) -> BalanceWatcher {
		BalanceWatcher {
			client: self.client.clone(),
			balances: Default::default(),
			tasks: HashMap::new(),
		}
	}
}
impl CallEncoder for Node {
	fn encode_call(&self, call: &Call) -> Result<Vec<u8>> {
		Ok(self.client.tx().call_data(&call.payload())?)
	}
}
#[async_trait]
impl Submit for Node {
	type Pending = PartialExtrinsic<PolkadotConfig, Client>;

	async fn prepare(&self, signer: &AccountId, call: &Call) -> Result<Self::Pending> {
		Ok(self
			.client
			.tx()
			.create_partial_signed(&call.payload(), &AccountId32::from(*signer), Default::default())
			.await?)
	}

	fn payload(&self, pending: &Self::Pending) -> Result<Vec<u8>> {
		Ok(pending.signer_payload())
	}

	async fn submit(
		&self,
		pending: Self::Pending,
		signer: &AccountId,
		signature: Signature,
	) -> Result<ExtrinsicResult> {
		let in_block = pending
			.sign_with_address_and_signature(
				&MultiAddress::Id(AccountId32::from(*signer)),
				&MultiSignature::Sr25519(signature),
			)
			.submit_and_watch()
			.await?
			.wait_for_in_block()
			.await?;
		let height = self.client.blocks().at(in_block.block_hash()).await?.number();
		let extrinsic_hash = in_block.extrinsic_hash().0;
		let (executed, is_final_approve, multisig_error, index) =
			match in_block.wait_for_success().await {
				Ok(events) => {
					let proxy = events
						.find_first::<EProxyExecuted>()?
						.map(EProxyExecuted::into_dispatch_result);
					let multisig = events
						.find_first::<EMultisigExecuted>()?
						.map(EMultisigExecuted::into_dispatch_result);

					if let Some(Err(e)) = &multisig {
						tracing::warn!("multisig call dispatch failed, {e}");
					}

					(
						!matches!(proxy, Some(Err(_))),
						multisig.is_some(),
						matches!(multisig, Some(Err(_))),
						events.extrinsic_index(),
					)
				},
				Err(SubxtError::Runtime(e)) => {
					tracing::warn!(
						"extrinsic({}) failed, {e}",
						array_bytes::bytes2hex("0x", extrinsic_hash)
					);

					(false, false, false, in_block.fetch_events().await?.extrinsic_index())
				},
				Err(e) => Err(e)?,
			};

		Ok(ExtrinsicResult {
			executed,
			is_final_approve,
			multisig_error,
			timepoint: Timepoint { height, index },
			extrinsic_hash,
		})
	}
}

#[async_trait]
impl Sign for Pair {
	fn account_id(&self) -> AccountId {
		let mut who = AccountId::default();

		who.copy_from_slice(self.public().as_ref());

		who
	}

	async fn sign(&self, payload: &[u8]) -> Result<Signature> {
		let signature = <Pair as sp_core::Pair>::sign(self, payload);
		let bytes: &[u8] = signature.as_ref();

		Ok(Signature::try_from(bytes)?)
	}
}

async fn free_balance_at(client: &Client, at: Option<H256>, who: &AccountId) -> Result<Balance> {
	let storage = match at {
		Some(h) => client.storage().at(h),
		None => client.storage().at_latest().await?,
	};
	let Some(account) = storage
		.fetch(&dynamic::storage("System", "Account", vec![Value::from_bytes(who)]))
		.await?
	else {
		return Ok(0);
	};

	account
		.to_value()?
		.at("data")
		.and_then(|d| d.at("free"))
		.and_then(|f| f.as_u128())
		.ok_or_else(|| anyhow::anyhow!("`System::Account` has an unexpected type"))
}

/// Keeps free balances up to date on every best block.
#[derive(Debug)]
pub struct BalanceWatcher {
	client: Client,
	balances: Balances,
	tasks: HashMap<AccountId, JoinHandle<()>>,
}
impl BalanceWatcher {
	/// Fetch the subscribed balances now instead of waiting for the next block.
	pub async fn refresh(&self) -> Result<()> {
		for who in self.tasks.keys() {
			let free = free_balance_at(&self.client, None, who).await?;

			if let Ok(mut b) = self.balances.write() {
				b.insert(*who, free);
			}
		}

		Ok(())
	}

	async fn watch(client: Client, who: AccountId, balances: Balances) {
		let r = async {
			let mut blocks = client.blocks().subscribe_best().await?;

			while let Some(block) = blocks.next().await {
				let free = free_balance_at(&client, Some(block?.hash()), &who).await?;

				if let Ok(mut b) = balances.write() {
					b.insert(who, free);
				}
			}

			Ok::<_, anyhow::Error>(())
		}
		.await;

		if let Err(e) = r {
			tracing::warn!("stop watching balance of {}, {e}", array_bytes::bytes2hex("0x", who));
		}
	}
}
impl BalanceSubscriber for BalanceWatcher {
	fn subscribe(&mut self, accounts: &[AccountId]) {
		for a in accounts {
			if self.tasks.contains_key(a) {
				continue;
			}

			tracing::debug!("watch balance of {}", array_bytes::bytes2hex("0x", a));

			let task = tokio::spawn(Self::watch(self.client.clone(), *a, self.balances.clone()));

			self.tasks.insert(*a, task);
		}
	}

	fn unsubscribe(&mut self, accounts: &[AccountId]) {
		for a in accounts {
			if let Some(t) = self.tasks.remove(a) {
				t.abort();
			}
			if let Ok(mut b) = self.balances.write() {
				b.remove(a);
			}
		}
	}

	fn free_balance(&self, who: &AccountId) -> Balance {
		self.balances.read().map(|b| b.get(who).copied().unwrap_or_default()).unwrap_or_default()
	}
}

#[test]
fn sign_should_work() {
	let pair = Pair::from_seed(&[1; 32]);
	let payload = b"multiwrap";
	let signature = futures::executor::block_on(Sign::sign(&pair, payload)).unwrap();

	let public = pair.public();
	let who: &[u8] = public.as_ref();

	assert_eq!(&Sign::account_id(&pair)[..], who);
	assert!(Pair::verify(&sp_core::sr25519::Signature::from_raw(signature), payload, &public));
}

#[cfg(feature = "node-test")]
#[tokio::test]
async fn node_should_work() {
	let node = Node::connect("ws://127.0.0.1:9944").await.unwrap();
	let alice = Pair::from_string("//Alice", None).unwrap();
	let bob = Sign::account_id(&Pair::from_string("//Bob", None).unwrap());
	let transfer = Call::new(
		"Balances",
		"transfer_keep_alive",
		vec![util::multi_address(&bob), Value::u128(1_000_000_000_000)],
	);

	assert!(!node.encode_call(&transfer).unwrap().is_empty());
	assert!(node.estimate_fee(&transfer, &alice).await.unwrap() > 0);
	assert!(node.free_balance(&Sign::account_id(&alice)).await.unwrap() > 0);

	let pending = node.prepare(&Sign::account_id(&alice), &transfer).await.unwrap();
	let signature = Sign::sign(&alice, &node.payload(&pending).unwrap()).await.unwrap();
	let r = node.submit(pending, &Sign::account_id(&alice), signature).await.unwrap();

	assert!(r.executed);
	assert!(!r.is_final_approve);
}
