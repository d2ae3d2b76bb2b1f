use {
  crate::contract::CrowdFunding,
  crowdfund_primitives::{Block, Receipt, Transaction},
};

/// Transactions waiting for the next block, in submission order.
#[derive(Default)]
pub struct Mempool {
  txs: Vec<Transaction>,
}

impl Mempool {
  pub fn consume(&mut self, tx: Transaction) {
    self.txs.push(tx);
  }

  pub fn len(&self) -> usize {
    self.txs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.txs.is_empty()
  }

  /// Executes every pending transaction against the contract at block time
  /// `timestamp` and seals the receipts into a block on top of `parent`.
  pub fn produce(
    &mut self,
    contract: &mut CrowdFunding,
    parent: &Block,
    timestamp: u64,
  ) -> Block {
    let height = parent.height + 1;
    let receipts = std::mem::take(&mut self.txs)
      .iter()
      .map(|tx| {
        let (gas_used, status) = contract.execute(tx, timestamp);
        Receipt {
          transaction: *tx.hash(),
          block: height,
          gas_used,
          status,
        }
      })
      .collect();

    Block::new(parent, timestamp, receipts)
  }
}
