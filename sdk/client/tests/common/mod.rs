#![allow(dead_code)]

use {
  crowdfund_devnode::{DevNode, Genesis, LedgerRules, ManualClock, Wallet},
  crowdfund_sdk::{
    primitives::{to_atomic, Address, Receipt},
    Client,
    ClientConfig,
    Error,
    TransactionHandle,
  },
  std::{sync::Arc, time::Duration},
  tracing_subscriber::EnvFilter,
};

/// Block time of the genesis block, every test starts here.
pub const T0: u64 = 1_700_000_000;

/// Genesis balance of every test account, in whole units.
pub const BALANCE: &str = "100";

pub fn account(byte: u8) -> Address {
  Address::new([byte; 20])
}

/// A devnode with six funded accounts and a client connected to it.
///
/// Blocks are only produced when a test asks for one, and time only moves
/// through `clock`.
pub struct Harness {
  pub node: Arc<DevNode>,
  pub clock: Arc<ManualClock>,
  pub wallet: Arc<Wallet>,
  pub client: Client,
}

impl Harness {
  pub fn new() -> Self {
    Self::with(ClientConfig::default(), LedgerRules::default())
  }

  pub fn with(config: ClientConfig, rules: LedgerRules) -> Self {
    let accounts = (1..=6).map(account).collect();
    Self::with_wallet(config, rules, Wallet::new(accounts))
  }

  pub fn with_wallet(
    config: ClientConfig,
    rules: LedgerRules,
    wallet: Wallet,
  ) -> Self {
    // RUST_LOG=debug shows the ledger executing each transaction
    let _ = tracing_subscriber::fmt()
      .with_env_filter(EnvFilter::from_default_env())
      .with_test_writer()
      .try_init();

    let clock = Arc::new(ManualClock::new(T0));
    let node = Arc::new(DevNode::new(
      Genesis {
        contract: ClientConfig::default().contract,
        rules,
        allocations: (1..=6)
          .map(|byte| (account(byte), to_atomic(BALANCE).unwrap()))
          .collect(),
      },
      clock.clone(),
    ));

    let wallet = Arc::new(wallet);
    let client =
      Client::new(config, node.clone(), node.clone(), wallet.clone());
    Self {
      node,
      clock,
      wallet,
      client,
    }
  }

  pub fn act_as(&self, byte: u8) {
    self.wallet.switch_account(account(byte));
  }

  pub fn advance(&self, seconds: u64) {
    self.clock.advance(Duration::from_secs(seconds));
  }

  /// Seals whatever was submitted into a block and waits for the outcome.
  pub async fn confirm(
    &self,
    submitted: Result<TransactionHandle, Error>,
  ) -> Result<Receipt, Error> {
    let handle = submitted?;
    self.node.produce();
    handle.await
  }

  /// Creates a campaign owned and submitted by `owner`, returning its index.
  pub async fn create(
    &self,
    owner: u8,
    goal: &str,
    seconds: u64,
  ) -> Result<u64, Error> {
    self.act_as(owner);
    let submitted = self
      .client
      .lifecycle
      .create_campaign(
        &self.client.identity,
        account(owner),
        format!("campaign by {owner}"),
        "details",
        "QmDigest",
        goal,
        Duration::from_secs(seconds),
      )
      .await;
    self.confirm(submitted).await?;
    self.client.campaigns.campaign_count().await
  }

  pub async fn contribute(
    &self,
    who: u8,
    index: u64,
    amount: &str,
  ) -> Result<Receipt, Error> {
    self.act_as(who);
    let submitted = self
      .client
      .lifecycle
      .contribute(&self.client.identity, index, amount)
      .await;
    self.confirm(submitted).await
  }

  pub async fn refund(&self, who: u8, index: u64) -> Result<Receipt, Error> {
    self.act_as(who);
    let submitted = self
      .client
      .lifecycle
      .request_refund(&self.client.identity, index)
      .await;
    self.confirm(submitted).await
  }

  pub async fn propose(
    &self,
    who: u8,
    index: u64,
    goal: &str,
  ) -> Result<Receipt, Error> {
    self.act_as(who);
    let submitted = self
      .client
      .voting
      .propose_use(&self.client.identity, index, goal, "tools and seeds")
      .await;
    self.confirm(submitted).await
  }

  pub async fn vote(
    &self,
    who: u8,
    index: u64,
    use_index: u64,
    agree: bool,
  ) -> Result<Receipt, Error> {
    self.act_as(who);
    let submitted = self
      .client
      .voting
      .cast_vote(&self.client.identity, index, use_index, agree)
      .await;
    self.confirm(submitted).await
  }

  /// Contribution of `who` to a campaign, as the canonical decimal.
  pub async fn my_contribution(&self, who: u8, index: u64) -> String {
    self.act_as(who);
    self
      .client
      .campaigns
      .get_my_contribution(&self.client.identity, index)
      .await
      .unwrap()
      .to_string()
  }

  /// Campaign #1 by account 1 with a goal of 10, reached by account 2
  /// giving 6 and account 3 giving 4.
  pub async fn funded(&self) -> anyhow::Result<u64> {
    let index = self.create(1, "10", 3600).await?;
    self.contribute(2, index, "6").await?;
    self.contribute(3, index, "4").await?;
    Ok(index)
  }

  pub fn balance(&self, byte: u8) -> String {
    self.node.balance(&account(byte)).to_ether().to_string()
  }
}
