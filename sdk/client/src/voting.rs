use {
  crate::{
    lifecycle::{check_index, positive, Submitter},
    ClientConfig,
    Error,
    IdentityResolver,
    QueryChannel,
    TransactionChannel,
    TransactionHandle,
    UseRequestLedger,
    VotePolicy,
  },
  crowdfund_primitives::{IntoAtomic, Mutation},
  std::sync::Arc,
  tracing::debug,
};

/// The write path for use requests: proposing a spend and voting on it.
///
/// Who may propose, who may vote and when a request resolves is decided by
/// the ledger. This type only watches the outcome through
/// [`UseRequestLedger`], except for repeated votes under
/// [`VotePolicy::Reject`], which are refused before submission.
#[derive(Clone)]
pub struct UseRequestLifecycle {
  policy: VotePolicy,
  submitter: Submitter,
  uses: UseRequestLedger,
}

impl UseRequestLifecycle {
  pub fn new(
    config: ClientConfig,
    query: Arc<dyn QueryChannel>,
    transactions: Arc<dyn TransactionChannel>,
  ) -> Self {
    Self {
      policy: config.vote_policy,
      uses: UseRequestLedger::new(config.clone(), query),
      submitter: Submitter::new(config, transactions),
    }
  }

  /// Proposes spending `goal` out of a funded campaign. Only the campaign
  /// initiator is allowed to, and only up to the unspent funds.
  pub async fn propose_use(
    &self,
    identity: &IdentityResolver,
    campaign: u64,
    goal: impl IntoAtomic,
    info: impl Into<String>,
  ) -> Result<TransactionHandle, Error> {
    check_index(campaign)?;
    let goal = positive(goal, "requested amount")?;
    let mutation = Mutation::NewUse {
      index: campaign,
      goal,
      info: info.into(),
    };
    self.submitter.submit(identity, mutation, None).await
  }

  /// Approves or rejects a use request with the weight of the active
  /// account's contribution.
  pub async fn cast_vote(
    &self,
    identity: &IdentityResolver,
    campaign: u64,
    use_index: u64,
    agree: bool,
  ) -> Result<TransactionHandle, Error> {
    check_index(campaign)?;
    if use_index == 0 {
      return Err(Error::NotFound {
        kind: "use request",
        index: use_index,
        count: 0,
      });
    }

    let voter = identity.current_account().await?;
    if self.policy == VotePolicy::Reject {
      let request =
        self.uses.use_request_for(voter, campaign, use_index).await?;
      if request.agree.is_cast() {
        return Err(Error::PreconditionFailed(format!(
          "{voter} already voted {:?} on use request #{use_index} of campaign \
           #{campaign}",
          request.agree
        )));
      }

      // the check above only holds for the account it was made for
      if identity.current_account().await? != voter {
        return Err(Error::PreconditionFailed(
          "active account changed while checking the vote".into(),
        ));
      }
    }

    debug!("{voter} votes {agree} on use request #{use_index}");
    let mutation = Mutation::AgreeUse {
      index: campaign,
      use_index,
      agree,
    };
    self.submitter.submit_as(voter, mutation, None).await
  }
}
