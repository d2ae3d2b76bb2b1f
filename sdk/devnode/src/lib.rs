mod clock;
mod contract;
mod mempool;
mod node;
mod wallet;

pub use {
  clock::{Clock, ManualClock, SystemClock},
  contract::{CrowdFunding, GasSchedule, LedgerRules, MAX_THRESHOLD},
  mempool::Mempool,
  node::{DevNode, Genesis},
  wallet::Wallet,
};
