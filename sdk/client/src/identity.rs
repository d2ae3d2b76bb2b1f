use {
  crate::{Error, IdentityChannel},
  crowdfund_primitives::Address,
  futures::StreamExt,
  std::sync::Arc,
  tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
  },
  tracing::{debug, info},
};

/// Answers "who is acting now".
///
/// The active account is never cached across suspension points: every call
/// to [`IdentityResolver::current_account`] asks the wallet again. Pushed
/// identity changes are republished on a watch channel where the most
/// recent value wins.
///
/// Authorization is remembered until the wallet stops exposing accounts,
/// then the next lookup asks the wallet once more.
pub struct IdentityResolver {
  channel: Arc<dyn IdentityChannel>,
  authorized: Mutex<bool>,
  current: Arc<watch::Sender<Option<Address>>>,
  listener: JoinHandle<()>,
}

impl IdentityResolver {
  pub fn new(channel: Arc<dyn IdentityChannel>) -> Self {
    let (current, _) = watch::channel(None);
    let current = Arc::new(current);

    let listener = tokio::spawn({
      let current = Arc::clone(&current);
      let mut changes = channel.account_changes();
      async move {
        while let Some(accounts) = changes.next().await {
          let active = accounts.first().copied();
          if publish(&current, active) {
            info!("active account changed to {active:?}");
          }
        }
        debug!("wallet stopped publishing account changes");
      }
    });

    Self {
      channel,
      authorized: Mutex::new(false),
      current,
      listener,
    }
  }

  /// Asks the wallet for access to its accounts. Concurrent callers wait
  /// for a single request, and once granted it is not repeated.
  pub async fn authenticate(&self) -> Result<(), Error> {
    let mut authorized = self.authorized.lock().await;
    if !*authorized {
      self.channel.enable().await?;
      *authorized = true;
    }
    Ok(())
  }

  /// The account that signs submissions at this instant.
  pub async fn current_account(&self) -> Result<Address, Error> {
    self.authenticate().await?;
    let mut accounts = self.channel.accounts().await?;
    if accounts.is_empty() {
      // access was revoked since it was granted
      info!("wallet exposes no account, requesting access again");
      *self.authorized.lock().await = false;
      self.authenticate().await?;
      accounts = self.channel.accounts().await?;
    }

    let account = accounts.first().copied().ok_or(Error::NotAuthorized)?;
    publish(&self.current, Some(account));
    Ok(account)
  }

  /// Receiver of identity changes. Intermediate values may be skipped,
  /// the receiver always sees the latest one.
  pub fn subscribe(&self) -> watch::Receiver<Option<Address>> {
    self.current.subscribe()
  }

  /// Invokes `callback` with the new active account after every observed
  /// change, until the returned subscription is dropped.
  pub fn on_account_changed<F>(&self, mut callback: F) -> Subscription
  where
    F: FnMut(Option<Address>) + Send + 'static,
  {
    let mut changes = self.subscribe();
    Subscription(tokio::spawn(async move {
      while changes.changed().await.is_ok() {
        let active = *changes.borrow_and_update();
        callback(active);
      }
    }))
  }
}

impl Drop for IdentityResolver {
  fn drop(&mut self) {
    self.listener.abort();
  }
}

/// Keeps an identity change listener alive.
pub struct Subscription(JoinHandle<()>);

impl Drop for Subscription {
  fn drop(&mut self) {
    self.0.abort();
  }
}

fn publish(
  current: &watch::Sender<Option<Address>>,
  active: Option<Address>,
) -> bool {
  let changed = *current.borrow() != active;
  if changed {
    current.send_replace(active);
  }
  changed
}
