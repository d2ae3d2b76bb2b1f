use {
  crate::{
    clock::Clock,
    contract::{CrowdFunding, LedgerRules},
    mempool::Mempool,
  },
  async_trait::async_trait,
  crowdfund_primitives::{
    Address,
    Block,
    Call,
    Mutation,
    SendOptions,
    ToBase58String,
    Transaction,
    Wei,
  },
  crowdfund_sdk::{
    ChannelError,
    ConfirmationWatcher,
    QueryChannel,
    TransactionChannel,
    TransactionHandle,
  },
  futures::{
    channel::mpsc::{self, UnboundedSender},
    Stream,
  },
  parking_lot::Mutex,
  std::{
    sync::{
      atomic::{AtomicU64, Ordering},
      Arc,
    },
    time::Duration,
  },
  tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
  },
  tracing::{debug, info},
};

/// Initial state of a devnode ledger.
#[derive(Debug, Clone)]
pub struct Genesis {
  /// Address the contract is deployed at. Calls to any other address fail.
  pub contract: Address,
  pub rules: LedgerRules,
  pub allocations: Vec<(Address, Wei)>,
}

struct Ledger {
  contract: CrowdFunding,
  mempool: Mempool,
  latest: Block,
  subscribers: Vec<UnboundedSender<Block>>,
}

/// A single-node ledger with no consensus, for dev, CI and tests.
///
/// Submitted transactions wait in the mempool until the next block is
/// produced, either by calling [`DevNode::produce`] or by the periodic
/// runloop. Must be created inside a tokio runtime.
pub struct DevNode {
  contract: Address,
  clock: Arc<dyn Clock>,
  nonce: AtomicU64,
  ledger: Mutex<Ledger>,
  watcher: ConfirmationWatcher,
}

impl DevNode {
  pub fn new(genesis: Genesis, clock: Arc<dyn Clock>) -> Self {
    let mut contract = CrowdFunding::new(genesis.rules);
    for (account, amount) in genesis.allocations {
      contract.fund(account, amount);
    }

    let latest = Block::zero(clock.now());
    let (confirmations, stream) = mpsc::unbounded();
    let watcher = ConfirmationWatcher::new(latest.clone(), stream);
    info!("genesis block {}", latest.hash().to_b58());

    Self {
      contract: genesis.contract,
      clock,
      nonce: AtomicU64::new(0),
      ledger: Mutex::new(Ledger {
        contract,
        mempool: Mempool::default(),
        latest,
        subscribers: vec![confirmations],
      }),
      watcher,
    }
  }

  pub fn contract(&self) -> Address {
    self.contract
  }

  /// Executes everything in the mempool and publishes the resulting block.
  pub fn produce(&self) -> Block {
    let mut ledger = self.ledger.lock();
    let ledger = &mut *ledger;
    let timestamp = self.clock.now().max(ledger.latest.timestamp);
    let block = ledger.mempool.produce(
      &mut ledger.contract,
      &ledger.latest,
      timestamp,
    );

    if block.receipts.is_empty() {
      debug!("produced empty block {}", block.height);
    } else {
      info!(
        "produced block {} with {} transactions",
        block.height,
        block.receipts.len()
      );
    }

    ledger.latest = block.clone();
    ledger
      .subscribers
      .retain(|subscriber| subscriber.unbounded_send(block.clone()).is_ok());
    block
  }

  /// Every block produced from now on.
  pub fn blocks(&self) -> impl Stream<Item = Block> + Unpin + Send {
    let (tx, rx) = mpsc::unbounded();
    self.ledger.lock().subscribers.push(tx);
    rx
  }

  pub fn latest(&self) -> Block {
    self.ledger.lock().latest.clone()
  }

  pub fn pending(&self) -> usize {
    self.ledger.lock().mempool.len()
  }

  pub fn watcher(&self) -> &ConfirmationWatcher {
    &self.watcher
  }

  pub fn balance(&self, account: &Address) -> Wei {
    self.ledger.lock().contract.balance(account)
  }

  /// Produces a block every `block_time` until the returned task is
  /// aborted.
  pub fn spawn_runloop(
    self: &Arc<Self>,
    block_time: Duration,
  ) -> JoinHandle<()> {
    let node = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = interval(block_time);
      interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
      loop {
        interval.tick().await;
        node.produce();
      }
    })
  }

  fn check_contract(&self, address: &Address) -> Result<(), ChannelError> {
    match *address == self.contract {
      true => Ok(()),
      false => Err(ChannelError::Transport(format!(
        "no contract deployed at {address}"
      ))),
    }
  }
}

#[async_trait]
impl QueryChannel for DevNode {
  async fn call(
    &self,
    contract: &Address,
    call: &Call,
  ) -> Result<Vec<u8>, ChannelError> {
    self.check_contract(contract)?;
    let ledger = self.ledger.lock();
    let now = self.clock.now().max(ledger.latest.timestamp);
    ledger
      .contract
      .query(call, now)
      .map_err(|e| ChannelError::Transport(e.to_string()))
  }
}

#[async_trait]
impl TransactionChannel for DevNode {
  async fn send(
    &self,
    mutation: Mutation,
    options: SendOptions,
  ) -> Result<TransactionHandle, ChannelError> {
    self.check_contract(&options.to)?;
    let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
    let tx = Transaction::new(mutation, options, nonce);

    // registered before the transaction can land in a block
    let handle = self.watcher.watch(*tx.hash());
    debug!("{} queued as {}", tx.mutation.method(), tx.hash().to_b58());
    self.ledger.lock().mempool.consume(tx);
    Ok(handle)
  }
}
