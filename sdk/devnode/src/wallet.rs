use {
  async_trait::async_trait,
  crowdfund_primitives::Address,
  crowdfund_sdk::{ChannelError, IdentityChannel},
  futures::{
    channel::mpsc::{self, UnboundedSender},
    stream::BoxStream,
    StreamExt,
  },
  parking_lot::Mutex,
  tracing::info,
};

struct State {
  accounts: Vec<Address>,
  grant: bool,
  enabled: bool,
  enables: usize,
  subscribers: Vec<UnboundedSender<Vec<Address>>>,
}

/// A browser-wallet stand-in holding a set of accounts.
///
/// Accounts stay hidden until the first successful [`IdentityChannel::enable`].
/// Switching the active account pushes the new list to every subscriber.
pub struct Wallet {
  state: Mutex<State>,
}

impl Wallet {
  pub fn new(accounts: Vec<Address>) -> Self {
    Self::with_grant(accounts, true)
  }

  /// A wallet whose user declines every authorization request.
  pub fn denying(accounts: Vec<Address>) -> Self {
    Self::with_grant(accounts, false)
  }

  fn with_grant(accounts: Vec<Address>, grant: bool) -> Self {
    Self {
      state: Mutex::new(State {
        accounts,
        grant,
        enabled: false,
        enables: 0,
        subscribers: vec![],
      }),
    }
  }

  /// Makes `account` the active signer, adding it if the wallet did not
  /// hold it yet.
  pub fn switch_account(&self, account: Address) {
    let mut state = self.state.lock();
    state.accounts.retain(|a| *a != account);
    state.accounts.insert(0, account);
    info!("wallet switched to {account}");
    notify(&mut state);
  }

  /// Revokes access, as if the user disconnected the site.
  pub fn disconnect(&self) {
    let mut state = self.state.lock();
    state.enabled = false;
    notify(&mut state);
  }

  /// Number of authorization requests that reached the wallet.
  pub fn enables(&self) -> usize {
    self.state.lock().enables
  }
}

fn exposed(state: &State) -> Vec<Address> {
  match state.enabled {
    true => state.accounts.clone(),
    false => vec![],
  }
}

fn notify(state: &mut State) {
  let accounts = exposed(state);
  state
    .subscribers
    .retain(|subscriber| subscriber.unbounded_send(accounts.clone()).is_ok());
}

#[async_trait]
impl IdentityChannel for Wallet {
  async fn accounts(&self) -> Result<Vec<Address>, ChannelError> {
    Ok(exposed(&self.state.lock()))
  }

  async fn enable(&self) -> Result<(), ChannelError> {
    let mut state = self.state.lock();
    state.enables += 1;
    if !state.grant {
      return Err(ChannelError::NotAuthorized);
    }
    if !state.enabled {
      state.enabled = true;
      notify(&mut state);
    }
    Ok(())
  }

  fn account_changes(&self) -> BoxStream<'static, Vec<Address>> {
    let (tx, rx) = mpsc::unbounded();
    self.state.lock().subscribers.push(tx);
    rx.boxed()
  }
}
