use {
  crate::{
    channel::fetch,
    lifecycle::check_index,
    ClientConfig,
    Error,
    IdentityResolver,
    QueryChannel,
  },
  crowdfund_primitives::{Address, Call, RawUse, UseRequest},
  futures::{stream, StreamExt, TryStreamExt},
  std::sync::Arc,
  tracing::debug,
};

/// The read path for use requests of a campaign.
#[derive(Clone)]
pub struct UseRequestLedger {
  config: ClientConfig,
  query: Arc<dyn QueryChannel>,
}

impl UseRequestLedger {
  pub fn new(config: ClientConfig, query: Arc<dyn QueryChannel>) -> Self {
    Self { config, query }
  }

  /// Number of use requests proposed against a campaign.
  pub async fn use_count(&self, campaign: u64) -> Result<u64, Error> {
    let call = Call::UseLength { index: campaign };
    fetch(&*self.query, &self.config.contract, call).await
  }

  /// One use request, with `agree` set to the active account's vote.
  pub async fn get_use_request(
    &self,
    identity: &IdentityResolver,
    campaign: u64,
    use_index: u64,
  ) -> Result<UseRequest, Error> {
    self.check_campaign(campaign).await?;
    let count = self.use_count(campaign).await?;
    if use_index == 0 || use_index > count {
      return Err(not_found(use_index, count));
    }

    let account = identity.current_account().await?;
    self.use_request_for(account, campaign, use_index).await
  }

  /// All use requests of a campaign in proposal order, each with the
  /// active account's vote. Any failing read aborts the whole call.
  pub async fn get_all_use_requests(
    &self,
    identity: &IdentityResolver,
    campaign: u64,
  ) -> Result<Vec<UseRequest>, Error> {
    self.check_campaign(campaign).await?;
    let count = self.use_count(campaign).await?;
    debug!("fetching {count} use requests of campaign #{campaign}");
    if count == 0 {
      return Ok(vec![]);
    }

    let account = identity.current_account().await?;
    stream::iter(1..=count)
      .map(|use_index| self.use_request_for(account, campaign, use_index))
      .buffered(self.config.fanout())
      .try_collect()
      .await
  }

  /// A campaign past `campaignCount` reports itself as missing rather
  /// than as a campaign without use requests.
  async fn check_campaign(&self, campaign: u64) -> Result<(), Error> {
    check_index(campaign)?;
    let count: u64 =
      fetch(&*self.query, &self.config.contract, Call::NumFundings).await?;
    match campaign > count {
      true => Err(Error::NotFound {
        kind: "campaign",
        index: campaign,
        count,
      }),
      false => Ok(()),
    }
  }

  /// One use request as seen by `account`, without bounds checking.
  pub async fn use_request_for(
    &self,
    account: Address,
    campaign: u64,
    use_index: u64,
  ) -> Result<UseRequest, Error> {
    let call = Call::Use {
      index: campaign,
      use_index,
      account,
    };
    let raw: RawUse = fetch(&*self.query, &self.config.contract, call).await?;
    Ok(UseRequest::from_raw(use_index, raw)?)
  }
}

fn not_found(index: u64, count: u64) -> Error {
  Error::NotFound {
    kind: "use request",
    index,
    count,
  }
}
