use {
  crate::{ChannelError, Error},
  async_trait::async_trait,
  crowdfund_primitives::{
    Address,
    Call,
    Mutation,
    Receipt,
    SendOptions,
    Status,
    ToBase58String,
  },
  futures::{
    future::{BoxFuture, FutureExt},
    stream::BoxStream,
  },
  multihash::Multihash,
  serde::de::DeserializeOwned,
  std::future::IntoFuture,
  tokio::sync::oneshot,
  tracing::{debug, info},
};

/// Read-only access to contract state.
///
/// Implementations return the MessagePack encoding of the method's result.
/// Calls have no side effects and may be retried by the caller.
#[async_trait]
pub trait QueryChannel: Send + Sync {
  async fn call(
    &self,
    contract: &Address,
    call: &Call,
  ) -> Result<Vec<u8>, ChannelError>;
}

/// Submission of state-changing calls.
///
/// Submissions are not idempotent. A returned handle resolves once the
/// transaction is executed by the ledger.
#[async_trait]
pub trait TransactionChannel: Send + Sync {
  async fn send(
    &self,
    mutation: Mutation,
    options: SendOptions,
  ) -> Result<TransactionHandle, ChannelError>;
}

/// The wallet side: which accounts may sign right now.
#[async_trait]
pub trait IdentityChannel: Send + Sync {
  /// Accounts exposed by the wallet, the first one is the active signer.
  async fn accounts(&self) -> Result<Vec<Address>, ChannelError>;

  /// One-time authorization request.
  async fn enable(&self) -> Result<(), ChannelError>;

  /// Every change of the exposed account list.
  fn account_changes(&self) -> BoxStream<'static, Vec<Address>>;
}

/// Pending outcome of a submitted transaction.
///
/// There is no way to cancel a submission. Dropping the handle only
/// stops observing it.
pub struct TransactionHandle {
  hash: Multihash,
  receipt: oneshot::Receiver<Receipt>,
}

impl TransactionHandle {
  pub fn new(hash: Multihash, receipt: oneshot::Receiver<Receipt>) -> Self {
    Self { hash, receipt }
  }

  pub fn hash(&self) -> &Multihash {
    &self.hash
  }

  /// Waits for the ledger to execute the transaction.
  ///
  /// A reverted execution surfaces as [`Error::PreconditionFailed`], losing
  /// track of the transaction as [`Error::TransportFailure`].
  pub async fn confirmed(self) -> Result<Receipt, Error> {
    let receipt = self.receipt.await.map_err(|_| {
      Error::TransportFailure(format!(
        "lost track of transaction {}",
        self.hash.to_b58()
      ))
    })?;

    match &receipt.status {
      Status::Confirmed => {
        info!(
          "transaction {} confirmed in block {}",
          self.hash.to_b58(),
          receipt.block
        );
        Ok(receipt)
      }
      Status::Reverted(reason) => {
        Err(Error::PreconditionFailed(reason.clone()))
      }
    }
  }
}

impl IntoFuture for TransactionHandle {
  type IntoFuture = BoxFuture<'static, Self::Output>;
  type Output = Result<Receipt, Error>;

  fn into_future(self) -> Self::IntoFuture {
    self.confirmed().boxed()
  }
}

impl std::fmt::Debug for TransactionHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TransactionHandle")
      .field("hash", &self.hash.to_b58())
      .finish()
  }
}

/// Runs one query and decodes its result.
pub(crate) async fn fetch<T: DeserializeOwned>(
  channel: &dyn QueryChannel,
  contract: &Address,
  call: Call,
) -> Result<T, Error> {
  debug!("query {}: {call:?}", call.method());
  let bytes = channel.call(contract, &call).await?;
  Ok(rmp_serde::from_slice(&bytes)?)
}
