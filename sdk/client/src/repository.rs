use {
  crate::{channel::fetch, ClientConfig, Error, IdentityResolver, QueryChannel},
  crowdfund_primitives::{
    to_decimal,
    Address,
    Call,
    Campaign,
    Ether,
    RawFunding,
    Wei,
  },
  futures::{stream, StreamExt, TryStreamExt},
  std::sync::Arc,
  tracing::debug,
};

/// Campaigns related to one account.
///
/// A campaign the account both initiated and contributed to appears in
/// both lists. Every entry carries the account's contribution in
/// `my_amount`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MyCampaigns {
  pub initiated: Vec<Campaign>,
  pub contributed: Vec<Campaign>,
}

/// The read path for campaigns.
///
/// Every call produces a fresh snapshot of ledger state, nothing is cached.
#[derive(Clone)]
pub struct CampaignRepository {
  config: ClientConfig,
  query: Arc<dyn QueryChannel>,
}

impl CampaignRepository {
  pub fn new(config: ClientConfig, query: Arc<dyn QueryChannel>) -> Self {
    Self { config, query }
  }

  /// Number of campaigns created so far. Valid indices are `1..=count`.
  pub async fn campaign_count(&self) -> Result<u64, Error> {
    fetch(&*self.query, &self.config.contract, Call::NumFundings).await
  }

  pub async fn get_campaign(&self, index: u64) -> Result<Campaign, Error> {
    if index == 0 {
      return Err(not_found(index, 0));
    }

    let count = self.campaign_count().await?;
    if index > count {
      return Err(not_found(index, count));
    }

    self.fetch_campaign(index).await
  }

  /// All campaigns in creation order.
  ///
  /// Any failing read aborts the whole call, no partial list is returned.
  pub async fn get_all_campaigns(&self) -> Result<Vec<Campaign>, Error> {
    let count = self.campaign_count().await?;
    debug!("fetching {count} campaigns");

    stream::iter(1..=count)
      .map(|index| self.fetch_campaign(index))
      .buffered(self.config.fanout())
      .try_collect()
      .await
  }

  /// How much the active account contributed to a campaign, zero if it
  /// never did.
  pub async fn get_my_contribution(
    &self,
    identity: &IdentityResolver,
    index: u64,
  ) -> Result<Ether, Error> {
    let account = identity.current_account().await?;
    self.contribution_of(account, index).await
  }

  pub async fn contribution_of(
    &self,
    account: Address,
    index: u64,
  ) -> Result<Ether, Error> {
    let call = Call::MyFunding { account, index };
    let amount: Wei = fetch(&*self.query, &self.config.contract, call).await?;
    Ok(to_decimal(amount))
  }

  /// Splits all campaigns into those the active account initiated and
  /// those it contributed to.
  ///
  /// This costs one extra round-trip per campaign on top of
  /// [`CampaignRepository::get_all_campaigns`].
  pub async fn get_my_campaigns(
    &self,
    identity: &IdentityResolver,
  ) -> Result<MyCampaigns, Error> {
    let account = identity.current_account().await?;
    let campaigns = self.get_all_campaigns().await?;

    let contributions: Vec<Ether> = stream::iter(campaigns.iter())
      .map(|campaign| self.contribution_of(account, campaign.index))
      .buffered(self.config.fanout())
      .try_collect()
      .await?;

    let mut mine = MyCampaigns::default();
    for (campaign, my_amount) in campaigns.into_iter().zip(contributions) {
      let campaign = campaign.with_my_amount(my_amount);
      if campaign.initiator == account {
        mine.initiated.push(campaign.clone());
      }
      if !my_amount.is_zero() {
        mine.contributed.push(campaign);
      }
    }

    Ok(mine)
  }

  async fn fetch_campaign(&self, index: u64) -> Result<Campaign, Error> {
    let call = Call::Funding { index };
    let raw: RawFunding =
      fetch(&*self.query, &self.config.contract, call).await?;
    Ok(Campaign::from_raw(index, raw)?)
  }
}

fn not_found(index: u64, count: u64) -> Error {
  Error::NotFound {
    kind: "campaign",
    index,
    count,
  }
}
