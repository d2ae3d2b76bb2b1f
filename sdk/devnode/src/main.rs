use {
  crate::settings::SystemSettings,
  anyhow::anyhow,
  clap::Parser,
  crowdfund_devnode::{DevNode, Genesis, LedgerRules, SystemClock, Wallet},
  crowdfund_primitives::{Address, Ether},
  crowdfund_sdk::{Client, ClientConfig},
  rand::{rngs::StdRng, Rng, SeedableRng},
  std::sync::Arc,
  tracing::{info, subscriber::set_global_default, warn},
  tracing_subscriber::{EnvFilter, FmtSubscriber},
};

mod settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // configure logging, RUST_LOG overrides the default level
  set_global_default(
    FmtSubscriber::builder()
      .with_env_filter(
        EnvFilter::try_from_default_env()
          .unwrap_or_else(|_| EnvFilter::new("info")),
      )
      .finish(),
  )?;

  // gather CLI parameters
  let settings = SystemSettings::parse();
  info!("startup settings: {settings:#?}");

  let mut rng = match settings.seed() {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };
  let accounts: Vec<Address> = (0..settings.accounts())
    .map(|_| Address::new(rng.gen()))
    .collect();

  let node = Arc::new(DevNode::new(
    Genesis {
      contract: settings.contract(),
      rules: LedgerRules {
        vote_policy: settings.vote_policy(),
        approval_threshold: settings.approval_threshold(),
        ..Default::default()
      },
      allocations: accounts
        .iter()
        .map(|account| (*account, Ether::from(settings.balance()).to_wei()))
        .collect(),
    },
    Arc::new(SystemClock),
  ));
  let runloop = node.spawn_runloop(settings.block_time());

  let wallet = Arc::new(Wallet::new(accounts.clone()));
  let client = Client::new(
    ClientConfig {
      contract: settings.contract(),
      vote_policy: settings.vote_policy(),
      ..Default::default()
    },
    node.clone(),
    node.clone(),
    wallet.clone(),
  );

  let outcome = play(&client, &wallet, &settings, &mut rng, &accounts).await;
  for account in &accounts {
    info!("{account} holds {}", node.balance(account).to_ether());
  }

  runloop.abort();
  outcome
}

/// Runs one campaign to its end: contributions from every backer, then
/// either a voted use request or refunds.
async fn play(
  client: &Client,
  wallet: &Wallet,
  settings: &SystemSettings,
  rng: &mut StdRng,
  accounts: &[Address],
) -> anyhow::Result<()> {
  let (owner, backers) = accounts
    .split_first()
    .ok_or_else(|| anyhow!("at least one account is required"))?;
  let identity = &client.identity;
  let _changes = identity.on_account_changed(|active| match active {
    Some(account) => info!("acting as {account}"),
    None => warn!("wallet exposes no account"),
  });

  identity.authenticate().await?;
  wallet.switch_account(*owner);
  client
    .lifecycle
    .create_campaign(
      identity,
      *owner,
      "Community garden",
      "Seeds, soil and tools for the empty lot",
      "QmCommunityGardenPlan",
      settings.goal(),
      settings.duration(),
    )
    .await?
    .await?;
  let index = client.campaigns.campaign_count().await?;

  let most = (settings.goal() * 2 / backers.len().max(1) as u64)
    .clamp(1, settings.balance().max(1));
  for backer in backers {
    if client.campaigns.get_campaign(index).await?.over {
      break;
    }

    wallet.switch_account(*backer);
    let amount = rng.gen_range(1..=most);
    match client.lifecycle.contribute(identity, index, amount).await?.await {
      Ok(receipt) => info!("contributed {amount} in block {}", receipt.block),
      Err(e) => warn!("contribution of {amount} failed: {e}"),
    }
  }

  let campaign = client.campaigns.get_campaign(index).await?;
  info!(
    "campaign #{index} raised {} of {} from {} funders",
    campaign.amount, campaign.goal, campaign.num_funders
  );

  if campaign.success {
    wallet.switch_account(*owner);
    let spend = (settings.goal() / 2).max(1);
    client
      .voting
      .propose_use(identity, index, spend, "First batch of seeds")
      .await?
      .await?;

    for backer in backers {
      wallet.switch_account(*backer);
      if client
        .campaigns
        .get_my_contribution(identity, index)
        .await?
        .is_zero()
      {
        continue;
      }

      let agree = rng.gen_bool(0.7);
      let vote = client.voting.cast_vote(identity, index, 1, agree);
      let outcome = match vote.await {
        Ok(handle) => handle.await.map(|_| ()),
        Err(e) => Err(e),
      };
      if let Err(e) = outcome {
        warn!("vote {agree} not counted: {e}");
      }
    }

    let request = client.uses.get_use_request(identity, index, 1).await?;
    info!(
      "use request resolved: {}, approving {}, disagreeing {}",
      request.over, request.agree_amount, request.disagree
    );
  } else {
    info!("waiting for campaign #{index} to expire");
    tokio::time::sleep(settings.duration() + settings.block_time()).await;

    for backer in backers {
      wallet.switch_account(*backer);
      let mine = client.campaigns.get_my_contribution(identity, index).await?;
      if mine.is_zero() {
        continue;
      }
      client.lifecycle.request_refund(identity, index).await?.await?;
      info!("refunded {mine}");
    }
  }

  Ok(())
}
