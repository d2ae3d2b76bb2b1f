use {
  crate::{
    ClientConfig,
    Error,
    IdentityResolver,
    TransactionChannel,
    TransactionHandle,
  },
  crowdfund_primitives::{
    Address,
    IntoAtomic,
    Mutation,
    SendOptions,
    ToBase58String,
    Wei,
  },
  std::{sync::Arc, time::Duration},
  tracing::info,
};

/// Hands mutations to the transaction channel on behalf of an account.
#[derive(Clone)]
pub(crate) struct Submitter {
  config: ClientConfig,
  transactions: Arc<dyn TransactionChannel>,
}

impl Submitter {
  pub fn new(
    config: ClientConfig,
    transactions: Arc<dyn TransactionChannel>,
  ) -> Self {
    Self {
      config,
      transactions,
    }
  }

  /// Resolves the signer right before sending, never earlier.
  pub async fn submit(
    &self,
    identity: &IdentityResolver,
    mutation: Mutation,
    value: Option<Wei>,
  ) -> Result<TransactionHandle, Error> {
    let from = identity.current_account().await?;
    self.submit_as(from, mutation, value).await
  }

  pub async fn submit_as(
    &self,
    from: Address,
    mutation: Mutation,
    value: Option<Wei>,
  ) -> Result<TransactionHandle, Error> {
    let method = mutation.method();
    let options = SendOptions {
      from,
      to: self.config.contract,
      value,
      gas: self.config.gas,
    };

    let handle = self.transactions.send(mutation, options).await?;
    info!(
      "{method} from {from} submitted in transaction {}",
      handle.hash().to_b58()
    );
    Ok(handle)
  }
}

/// The write path for campaigns: creation, contributions and refunds.
///
/// Only input shape is validated locally. Deadlines, goals and ownership
/// are evaluated by the ledger when the transaction executes, and a
/// violation comes back from the handle as
/// [`Error::PreconditionFailed`].
#[derive(Clone)]
pub struct CampaignLifecycle {
  submitter: Submitter,
}

impl CampaignLifecycle {
  pub fn new(
    config: ClientConfig,
    transactions: Arc<dyn TransactionChannel>,
  ) -> Self {
    Self {
      submitter: Submitter::new(config, transactions),
    }
  }

  /// Opens a new campaign owned by `owner`, accepting contributions for
  /// `duration` from the moment the ledger executes the creation. The
  /// ledger counts in whole seconds, so `duration` must be one.
  #[allow(clippy::too_many_arguments)]
  pub async fn create_campaign(
    &self,
    identity: &IdentityResolver,
    owner: Address,
    title: impl Into<String>,
    info: impl Into<String>,
    hash: impl Into<String>,
    goal: impl IntoAtomic,
    duration: Duration,
  ) -> Result<TransactionHandle, Error> {
    let goal = positive(goal, "goal")?;
    if duration.as_secs() == 0 {
      return Err(Error::InvalidAmount(
        "campaign duration must be at least one second".into(),
      ));
    }
    if duration.subsec_nanos() != 0 {
      return Err(Error::InvalidAmount(format!(
        "campaign duration of {duration:?} is not a whole number of seconds"
      )));
    }

    let mutation = Mutation::NewFunding {
      initiator: owner,
      title: title.into(),
      info: info.into(),
      hash: hash.into(),
      goal,
      seconds: duration.as_secs(),
    };
    self.submitter.submit(identity, mutation, None).await
  }

  /// Pays `amount` into an open campaign.
  pub async fn contribute(
    &self,
    identity: &IdentityResolver,
    index: u64,
    amount: impl IntoAtomic,
  ) -> Result<TransactionHandle, Error> {
    check_index(index)?;
    let amount = positive(amount, "contribution")?;
    self
      .submitter
      .submit(identity, Mutation::Contribute { index }, Some(amount))
      .await
  }

  /// Claims back the full recorded contribution of the active account
  /// from a campaign that ended without reaching its goal.
  pub async fn request_refund(
    &self,
    identity: &IdentityResolver,
    index: u64,
  ) -> Result<TransactionHandle, Error> {
    check_index(index)?;
    self
      .submitter
      .submit(identity, Mutation::ReturnMoney { index }, None)
      .await
  }
}

/// Converts a caller amount that must be strictly positive.
pub(crate) fn positive(
  amount: impl IntoAtomic,
  what: &str,
) -> Result<Wei, Error> {
  let amount = amount.into_atomic()?;
  if amount.is_zero() {
    return Err(Error::InvalidAmount(format!("{what} must be positive")));
  }
  Ok(amount)
}

/// Campaign and use request indices are 1-based, zero never exists.
pub(crate) fn check_index(index: u64) -> Result<(), Error> {
  match index {
    0 => Err(Error::NotFound {
      kind: "campaign",
      index,
      count: 0,
    }),
    _ => Ok(()),
  }
}
