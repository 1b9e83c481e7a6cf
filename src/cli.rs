// std
use std::{
	collections::{BTreeSet, HashMap},
	fs,
	path::PathBuf,
	time::Duration,
};
// crates.io
use clap::{Args, Parser, Subcommand};
use sp_core::{sr25519::Pair, Pair as _};
use subxt::dynamic::Value;
use tokio::sync::mpsc;
// multiwrap
use multiwrap::{
	aggregator::{self, proxy},
	configuration::{Configuration, ConfigurationToml},
	node::Node,
	notification::Webhooks,
	observer::{self, ChainNotice},
	operation::{OperationFlow, Request, Sign, Step, StepResult},
	prelude::*,
	storage::{Database, State, Table},
	wrapper::{self, Approval, Signers, TxWrapper},
};

#[derive(Debug, Parser)]
#[command(
	version = concat!(
		env!("CARGO_PKG_VERSION"),
		"-",
		env!("VERGEN_GIT_SHA"),
		"-",
		env!("VERGEN_CARGO_TARGET_TRIPLE"),
	),
	about,
	rename_all = "kebab",
)]
pub struct Cli {
	/// Configuration file path, or the directory holding `config.toml`.
	#[arg(long, short, global = true, value_name = "PATH")]
	configuration: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}
impl Cli {
	pub async fn run(self) -> Result<()> {
		let configuration =
			ConfigurationToml::load(self.configuration)?.try_into_configuration()?;

		tracing::debug!("{configuration:?}");

		match self.command {
			Command::Groups => groups(&configuration).await,
			Command::Resolve(c) => resolve(&configuration, c),
			Command::Track { events } => track(&configuration, events).await,
			Command::Transfer(c) => transfer(&configuration, c).await,
		}
	}
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Sync proxies of the stored accounts and recompute their proxy groups.
	Groups,
	/// Print the wrapper chain from a wallet to a target account.
	Resolve(ResolveCmd),
	/// Apply a JSON list of observed chain notices to the stored state.
	Track {
		#[arg(long, value_name = "FILE")]
		events: PathBuf,
	},
	/// Transfer from a target account through its wrapper chain.
	Transfer(TransferCmd),
}

#[derive(Debug, Args)]
struct ResolveCmd {
	/// Signing wallet.
	#[arg(long, value_name = "ID")]
	wallet: WalletId,
	#[arg(long, value_name = "HEX", value_parser = account_id)]
	target: AccountId,
	/// Signatories selected to act for a multisig, the first one signs.
	#[arg(long, value_name = "HEX", value_parser = account_id)]
	signatory: Vec<AccountId>,
}

#[derive(Debug, Args)]
struct TransferCmd {
	#[command(flatten)]
	resolve: ResolveCmd,
	#[arg(long, value_name = "HEX", value_parser = account_id)]
	dest: AccountId,
	#[arg(long, value_name = "AMOUNT")]
	amount: Balance,
	/// Sr25519 seed of the signing account.
	#[arg(long, value_name = "HEX", value_parser = account_id)]
	seed: [u8; 32],
}

fn account_id(s: &str) -> StdResult<AccountId, String> {
	array_bytes::hex2array(s).map_err(|e| format!("invalid hex, {e:?}"))
}

fn wrappers_of(state: &State, cmd: &ResolveCmd) -> Result<(Account, Option<Vec<TxWrapper>>)> {
	let wallet = state
		.wallet(cmd.wallet)
		.ok_or_else(|| anyhow::anyhow!("wallet({}) does not exist", cmd.wallet))?;
	let target = state
		.accounts
		.iter()
		.find(|a| a.account_id == cmd.target)
		.cloned()
		.ok_or_else(|| {
			anyhow::anyhow!("account({}) does not exist", array_bytes::bytes2hex("0x", cmd.target))
		})?;
	let selected = cmd
		.signatory
		.iter()
		.filter_map(|s| state.accounts.iter().find(|a| &a.account_id == s).cloned())
		.collect::<Vec<_>>();
	let wrappers = wrapper::resolve(
		wallet,
		&state.wallet_accounts(wallet.id),
		&target,
		Signers { wallets: &state.wallets, accounts: &state.accounts },
		&selected,
	);

	Ok((target, wrappers))
}

async fn groups(configuration: &Configuration) -> Result<()> {
	let mut database = Database::open(&configuration.database)?;
	let node = Node::connect(&configuration.node_endpoint).await?;
	let state = &mut database.state;

	if Table::get(&state.chains, &node.chain_id).is_none() {
		state.chains.create_all(vec![Chain {
			chain_id: node.chain_id,
			name: configuration.network.name().into(),
			address_prefix: configuration.network.address_prefix(),
		}]);
	}

	let reals = state
		.accounts
		.iter()
		.filter(|a| a.is_on_chain(&node.chain_id))
		.map(|a| a.account_id)
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect::<Vec<_>>();
	let (on_chain, deposits) = node.proxy_snapshot(&reals).await?;
	let proxy::ProxyDiff { to_add, to_remove } =
		proxy::diff(&state.proxies, &on_chain, &node.chain_id);

	for p in &to_remove {
		proxy::remove(&mut state.proxies, p);
	}
	for p in to_add {
		proxy::add(&mut state.proxies, p);
	}

	state.deposits.create_all(vec![deposits]);

	let proxied_wallet = state.wallets.iter().find(|w| w.r#type == WalletType::Proxied).cloned();
	let wallet_id = proxied_wallet
		.as_ref()
		.map(|w| w.id)
		.unwrap_or_else(|| state.wallets.iter().map(|w| w.id).max().unwrap_or_default() + 1);
	let discovered = proxy::discover_proxied(&state.proxies, &state.accounts, &[], wallet_id);

	if !discovered.is_empty() {
		if proxied_wallet.is_none() {
			state.wallets.create_all(vec![Wallet {
				id: wallet_id,
				name: "Proxied".into(),
				r#type: WalletType::Proxied,
			}]);
		}

		state.accounts.create_all(discovered);
	}

	let chains =
		state.chains.iter().map(|c| (c.chain_id, c.clone())).collect::<HashMap<_, _>>();
	let fresh = aggregator::aggregate(
		&state.wallets,
		&state.accounts,
		&state.proxies,
		&state.deposits,
		&chains,
	);
	let diff = aggregator::diff(
		&state.proxy_groups,
		&fresh,
		&aggregator::covered_chains(&state.deposits, &chains),
	);

	state.proxy_groups.delete_all(&diff.to_remove.iter().map(|g| g.key()).collect::<Vec<_>>());
	state.proxy_groups.create_all(diff.to_add.into_iter().chain(diff.to_update).collect());
	database.save()?;

	for g in &database.state.proxy_groups {
		println!(
			"wallet({}) {} deposit {}",
			g.wallet_id,
			array_bytes::bytes2hex("0x", g.proxied_account_id),
			g.total_deposit
		);
	}

	Ok(())
}

fn resolve(configuration: &Configuration, cmd: ResolveCmd) -> Result<()> {
	let database = Database::open(&configuration.database)?;
	let (_, wrappers) = wrappers_of(&database.state, &cmd)?;

	match wrappers {
		Some(w) if w.is_empty() => println!("signed directly"),
		Some(w) => println!("{w:#?}"),
		None => println!("unavailable"),
	}

	Ok(())
}

async fn track(configuration: &Configuration, events: PathBuf) -> Result<()> {
	let notices = serde_json::from_str::<Vec<ChainNotice>>(&fs::read_to_string(events)?)?;
	let mut database = Database::open(&configuration.database)?;
	let notifier = Webhooks::new(configuration.notification.webhooks.clone())?;
	let (tx, rx) = mpsc::channel(notices.len().max(1));
	let feed = async move {
		for n in notices {
			tx.send(n).await?;
		}

		Ok::<_, anyhow::Error>(())
	};
	let (fed, observed) = tokio::join!(feed, observer::run(rx, &mut database, &notifier));

	fed?;
	observed
}

async fn transfer(configuration: &Configuration, cmd: TransferCmd) -> Result<()> {
	let mut database = Database::open(&configuration.database)?;
	let node = Node::connect(&configuration.node_endpoint).await?;
	let pair = Pair::from_seed(&cmd.seed);
	let (target, wrappers) = wrappers_of(&database.state, &cmd.resolve)?;
	let core = Call::new(
		"Balances",
		"transfer_keep_alive",
		vec![util::multi_address(&cmd.dest), Value::u128(cmd.amount)],
	);
	let request = Request::new(node.chain_id, target, core, wrappers)?;
	let mut flow = OperationFlow::new(node.balance_watcher(), node.deposit_constants()?);

	if flow.start(request)? == Step::Warning {
		tracing::warn!("the call is dispatched through a proxy");

		flow.advance(StepResult::Acknowledged)?;
	}

	flow.subscriber().refresh().await?;

	let mut approval = Approval::initiate();

	if let Some(call_hash) = flow.wrap(&node, &approval)?.call_hash {
		let pending = database.state.multisig_transactions.iter().find(|t| {
			t.call_hash == call_hash
				&& t.chain_id == node.chain_id
				&& t.status == MultisigStatus::Signing
		});

		if let Some(t) = pending {
			let multisig = database
				.state
				.multisig(&t.account_id)
				.ok_or(Error::Rejected(Rejection::ForeignEvent))?;

			approval = t.next_approval(multisig);
		}
	}
	if let Some(w) = configuration.max_weight {
		approval = approval.with_max_weight(w);
	}

	let wrapped = flow.wrap(&node, &approval)?;
	let signer = wrapped.signer.unwrap_or(cmd.resolve.target);

	if signer != Sign::account_id(&pair) {
		anyhow::bail!("seed does not belong to signer({})", array_bytes::bytes2hex("0x", signer));
	}

	let fee = node.estimate_fee(&wrapped.submittable, &pair).await?;

	flow.advance(StepResult::Validated { wrapped, approval, fee })?;
	flow.advance(StepResult::Confirmed)?;

	let outcome = flow.sign_and_submit(&node, &pair).await?;

	for n in flow.notices() {
		if let Err(e) = observer::apply(&mut database.state, n) {
			tracing::warn!("skip notice, {e}");
		}
	}

	database.save()?;

	println!(
		"extrinsic {} at {}-{}, success {}",
		array_bytes::bytes2hex("0x", outcome.extrinsic_hash),
		outcome.timepoint.height,
		outcome.timepoint.index,
		outcome.is_success()
	);

	flow.finish_after(Duration::ZERO).await?;

	Ok(())
}
