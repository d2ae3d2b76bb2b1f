use crowdfund_primitives::Address;

/// What to do when an account votes on a use request it already voted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VotePolicy {
  /// Refuse locally, nothing is submitted.
  #[default]
  Reject,

  /// Submit the new vote and let the ledger replace the previous one.
  Overwrite,
}

/// Client-wide settings shared by all components.
///
/// Each component receives its own copy at construction, there is no
/// global contract handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Ledger node the channels are connected to.
  pub endpoint: String,

  /// Address of the deployed crowdfunding contract.
  pub contract: Address,

  /// Name of the contract interface the channels encode calls for.
  pub abi: String,

  /// Gas limit attached to every submission.
  pub gas: u64,

  pub vote_policy: VotePolicy,

  /// How many independent reads aggregate queries keep in flight.
  /// `1` makes them strictly sequential. Results are always reassembled
  /// in index order.
  pub read_concurrency: usize,
}

impl ClientConfig {
  pub(crate) fn fanout(&self) -> usize {
    self.read_concurrency.max(1)
  }
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      endpoint: "http://127.0.0.1:8545".into(),
      contract: Address::new([
        0xfa, 0xb1, 0x45, 0xc6, 0x4c, 0xa0, 0x79, 0xc3, 0x34, 0x00, 0xf0,
        0xd8, 0xea, 0x04, 0x69, 0xf0, 0xf6, 0x58, 0x6c, 0x5c,
      ]),
      abi: "CrowdFunding".into(),
      gas: 1_000_000,
      vote_policy: VotePolicy::Reject,
      read_concurrency: 8,
    }
  }
}
