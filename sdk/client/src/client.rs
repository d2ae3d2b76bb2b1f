use {
  crate::{
    CampaignLifecycle,
    CampaignRepository,
    ClientConfig,
    IdentityChannel,
    IdentityResolver,
    QueryChannel,
    TransactionChannel,
    UseRequestLedger,
    UseRequestLifecycle,
  },
  std::sync::Arc,
  tracing::info,
};

/// All components wired to one set of channels and one configuration.
pub struct Client {
  pub identity: IdentityResolver,
  pub campaigns: CampaignRepository,
  pub lifecycle: CampaignLifecycle,
  pub uses: UseRequestLedger,
  pub voting: UseRequestLifecycle,
}

impl Client {
  pub fn new(
    config: ClientConfig,
    query: Arc<dyn QueryChannel>,
    transactions: Arc<dyn TransactionChannel>,
    identity: Arc<dyn IdentityChannel>,
  ) -> Self {
    info!(
      "{} contract at {} via {}",
      config.abi, config.contract, config.endpoint
    );

    Self {
      identity: IdentityResolver::new(identity),
      campaigns: CampaignRepository::new(config.clone(), Arc::clone(&query)),
      lifecycle: CampaignLifecycle::new(
        config.clone(),
        Arc::clone(&transactions),
      ),
      uses: UseRequestLedger::new(config.clone(), Arc::clone(&query)),
      voting: UseRequestLifecycle::new(config, query, transactions),
    }
  }
}
