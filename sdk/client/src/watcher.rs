use {
  crate::{Error, TransactionHandle},
  crowdfund_primitives::{Block, Receipt, Status, ToBase58String},
  dashmap::DashMap,
  futures::{Stream, StreamExt},
  multihash::Multihash,
  std::sync::Arc,
  tokio::{
    sync::{
      oneshot::{self, Sender},
      watch,
    },
    task::JoinHandle,
  },
  tracing::{error, info, warn},
};

/// This type monitors blocks produced by the ledger and resolves
/// transaction handles once their receipts show up.
///
/// Register interest with [`ConfirmationWatcher::watch`] before handing a
/// transaction to the ledger, so a block produced right after submission
/// cannot be missed.
pub struct ConfirmationWatcher {
  watchlist: Arc<DashMap<Multihash, Sender<Receipt>>>,
  latest: watch::Receiver<Block>,
  runloop: JoinHandle<()>,
}

impl ConfirmationWatcher {
  pub fn new(
    recent: Block,
    stream: impl Stream<Item = Block> + Unpin + Send + 'static,
  ) -> Self {
    let watchlist = Arc::new(DashMap::<Multihash, Sender<Receipt>>::new());
    let (latest_tx, latest) = watch::channel(recent);

    let runloop = tokio::spawn({
      let watchlist = Arc::clone(&watchlist);
      async move {
        let mut stream = stream;
        while let Some(block) = stream.next().await {
          for receipt in block.receipts.iter() {
            if let Status::Reverted(reason) = &receipt.status {
              warn!(
                "transaction {} reverted: {reason}",
                receipt.transaction.to_b58()
              );
            }

            if let Some((_, signal)) = watchlist.remove(&receipt.transaction) {
              if signal.send(receipt.clone()).is_err() {
                // the handle was dropped, nobody is waiting anymore
                info!(
                  "confirmation of {} no longer awaited",
                  receipt.transaction.to_b58()
                );
              }
            }
          }
          latest_tx.send_replace(block);
        }
        error!("block stream closed, pending confirmations are lost");
        watchlist.clear();
      }
    });

    Self {
      watchlist,
      latest,
      runloop,
    }
  }

  /// Starts waiting for the receipt of a transaction with the given hash.
  pub fn watch(&self, hash: Multihash) -> TransactionHandle {
    let (tx, rx) = oneshot::channel();
    self.watchlist.insert(hash, tx);
    TransactionHandle::new(hash, rx)
  }

  pub fn pending(&self) -> usize {
    self.watchlist.len()
  }

  pub fn most_recent_block(&self) -> Block {
    self.latest.borrow().clone()
  }

  /// Resolves once a block at `height` or above has been observed.
  pub async fn await_block_height(&self, height: u64) -> Result<Block, Error> {
    let mut latest = self.latest.clone();
    loop {
      {
        let block = latest.borrow_and_update();
        if block.height >= height {
          return Ok(block.clone());
        }
      }
      latest.changed().await.map_err(|_| {
        Error::TransportFailure(format!(
          "block stream closed before height {height}"
        ))
      })?;
    }
  }

  pub fn stop(self) {
    self.runloop.abort();
  }
}

#[cfg(test)]
mod tests {
  use {
    super::ConfirmationWatcher,
    crate::Error,
    crowdfund_primitives::{Block, Receipt, Status},
    futures::channel::mpsc,
    multihash::MultihashDigest,
  };

  fn receipt(tx: &[u8], status: Status) -> Receipt {
    Receipt {
      transaction: multihash::Code::Sha3_256.digest(tx),
      block: 1,
      gas_used: 1,
      status,
    }
  }

  #[tokio::test]
  async fn resolves_confirmed_and_reverted() -> anyhow::Result<()> {
    let genesis = Block::zero(0);
    let (blocks, stream) = mpsc::unbounded();
    let watcher = ConfirmationWatcher::new(genesis.clone(), stream);

    let ok = watcher.watch(multihash::Code::Sha3_256.digest(b"ok"));
    let bad = watcher.watch(multihash::Code::Sha3_256.digest(b"bad"));
    assert_eq!(watcher.pending(), 2);

    blocks.unbounded_send(Block::new(&genesis, 1, vec![
      receipt(b"ok", Status::Confirmed),
      receipt(b"bad", Status::Reverted("not over yet".into())),
    ]))?;

    assert!(ok.await?.is_confirmed());
    assert_eq!(
      bad.await,
      Err(Error::PreconditionFailed("not over yet".into()))
    );
    assert_eq!(watcher.await_block_height(1).await?.height, 1);
    assert_eq!(watcher.pending(), 0);
    Ok(())
  }

  #[tokio::test]
  async fn closed_stream_fails_pending() {
    let (blocks, stream) = mpsc::unbounded::<Block>();
    let watcher = ConfirmationWatcher::new(Block::zero(0), stream);
    let pending = watcher.watch(multihash::Code::Sha3_256.digest(b"lost"));
    drop(blocks);

    assert!(matches!(pending.await, Err(Error::TransportFailure(_))));
    assert!(matches!(
      watcher.await_block_height(5).await,
      Err(Error::TransportFailure(_))
    ));
  }
}
