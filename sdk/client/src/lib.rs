mod channel;
mod client;
mod config;
mod error;
mod identity;
mod lifecycle;
mod repository;
mod uses;
mod voting;
mod watcher;

pub use {
  channel::{
    IdentityChannel,
    QueryChannel,
    TransactionChannel,
    TransactionHandle,
  },
  client::Client,
  config::{ClientConfig, VotePolicy},
  crowdfund_primitives as primitives,
  error::{ChannelError, Error},
  identity::{IdentityResolver, Subscription},
  lifecycle::CampaignLifecycle,
  repository::{CampaignRepository, MyCampaigns},
  uses::UseRequestLedger,
  voting::UseRequestLifecycle,
  watcher::ConfirmationWatcher,
};
