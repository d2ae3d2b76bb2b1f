use {
  clap::Parser,
  crowdfund_primitives::Address,
  crowdfund_devnode::MAX_THRESHOLD,
  crowdfund_sdk::{ClientConfig, VotePolicy},
  humantime::Duration,
};

/// Crowdfunding Local Devnode
///
/// A single node ledger running the crowdfunding contract in memory with
/// no consensus algorithm, for dev, CI and test scenarios. Plays one
/// campaign through to the end with randomly generated accounts.
#[derive(Debug, Parser)]
pub struct SystemSettings {
  /// Address the contract is deployed at
  #[clap(long, short,
    value_name = "ADDRESS",
    default_value_t = ClientConfig::default().contract)]
  contract: Address,

  /// Block production interval
  #[clap(long, short = 't',
    value_name = "DURATION",
    default_value = "2s")]
  block_time: Duration,

  /// Number of funded accounts, the first one initiates the campaign
  #[clap(long, short,
    value_name = "COUNT",
    default_value = "5")]
  accounts: usize,

  /// Genesis balance of every account, in whole currency units
  #[clap(long, short,
    value_name = "AMOUNT",
    default_value = "100")]
  balance: u64,

  /// Goal of the demo campaign, in whole currency units
  #[clap(long, short,
    value_name = "AMOUNT",
    default_value = "50")]
  goal: u64,

  /// How long the demo campaign accepts contributions
  #[clap(long, short,
    value_name = "DURATION",
    default_value = "10s")]
  duration: Duration,

  /// Percentage of the raised amount approvals must exceed, at most 99
  #[clap(long,
    value_name = "PERCENT",
    default_value = "50")]
  approval_threshold: u64,

  /// Let contributors replace their vote on a use request
  #[clap(long)]
  allow_revote: bool,

  /// Seed for generated accounts and contributions
  #[clap(long, value_name = "SEED")]
  seed: Option<u64>,
}

impl SystemSettings {
  pub fn contract(&self) -> Address {
    self.contract
  }

  pub fn block_time(&self) -> std::time::Duration {
    self.block_time.into()
  }

  pub fn accounts(&self) -> usize {
    self.accounts.max(2)
  }

  pub fn balance(&self) -> u64 {
    self.balance
  }

  pub fn goal(&self) -> u64 {
    self.goal.max(1)
  }

  pub fn duration(&self) -> std::time::Duration {
    self.duration.into()
  }

  pub fn approval_threshold(&self) -> u64 {
    self.approval_threshold.min(MAX_THRESHOLD)
  }

  pub fn vote_policy(&self) -> VotePolicy {
    match self.allow_revote {
      true => VotePolicy::Overwrite,
      false => VotePolicy::Reject,
    }
  }

  pub fn seed(&self) -> Option<u64> {
    self.seed
  }
}
