use {
  crate::{Address, Wei},
  serde::{Deserialize, Serialize},
};

/// Read-only contract methods. Executing one has no side effects, so
/// any of them may be retried freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Call {
  /// Number of campaigns ever created.
  NumFundings,

  /// The raw record of one campaign.
  Funding { index: u64 },

  /// Recorded contribution of `account` to a campaign.
  MyFunding { account: Address, index: u64 },

  /// Number of use requests of a campaign.
  UseLength { index: u64 },

  /// One use request together with the vote cast by `account`.
  Use {
    index: u64,
    use_index: u64,
    account: Address,
  },
}

impl Call {
  pub fn method(&self) -> &'static str {
    match self {
      Call::NumFundings => "numFundings",
      Call::Funding { .. } => "fundings",
      Call::MyFunding { .. } => "getMyFundings",
      Call::UseLength { .. } => "getUseLength",
      Call::Use { .. } => "getUse",
    }
  }
}

/// State-changing contract methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
  NewFunding {
    initiator: Address,
    title: String,
    info: String,
    hash: String,
    goal: Wei,
    seconds: u64,
  },

  /// Payable, the contributed amount travels as the transaction value.
  Contribute { index: u64 },

  ReturnMoney { index: u64 },

  NewUse { index: u64, goal: Wei, info: String },

  AgreeUse {
    index: u64,
    use_index: u64,
    agree: bool,
  },
}

impl Mutation {
  pub fn method(&self) -> &'static str {
    match self {
      Mutation::NewFunding { .. } => "newFunding",
      Mutation::Contribute { .. } => "contribute",
      Mutation::ReturnMoney { .. } => "returnMoney",
      Mutation::NewUse { .. } => "newUse",
      Mutation::AgreeUse { .. } => "agreeUse",
    }
  }
}

/// Envelope parameters of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SendOptions {
  /// The signing account.
  pub from: Address,

  /// The contract receiving the call.
  pub to: Address,

  /// Payment attached to the call, only meaningful for payable methods.
  pub value: Option<Wei>,

  /// Upper bound on execution cost.
  pub gas: u64,
}
