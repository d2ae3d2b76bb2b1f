use {
  crate::b58::ToBase58String,
  multihash::{Hasher, Multihash, MultihashDigest, Sha3_256},
  once_cell::sync::OnceCell,
  serde::{Deserialize, Serialize},
};

/// Outcome of executing one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
  Confirmed,

  /// The contract refused the mutation. Nothing was applied.
  Reverted(String),
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
  pub transaction: Multihash,
  pub block: u64,
  pub gas_used: u64,
  pub status: Status,
}

impl Receipt {
  pub fn is_confirmed(&self) -> bool {
    self.status == Status::Confirmed
  }
}

impl core::fmt::Debug for Receipt {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Receipt")
      .field("transaction", &self.transaction.to_b58())
      .field("block", &self.block)
      .field("gas_used", &self.gas_used)
      .field("status", &self.status)
      .finish()
  }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Block {
  pub height: u64,
  pub parent: Multihash,

  /// Unix seconds at which the block's transactions were executed.
  pub timestamp: u64,
  pub receipts: Vec<Receipt>,

  #[serde(skip)]
  hash_cache: OnceCell<Multihash>,
}

impl Block {
  pub fn new(parent: &Block, timestamp: u64, receipts: Vec<Receipt>) -> Self {
    Self {
      height: parent.height + 1,
      parent: *parent.hash(),
      timestamp,
      receipts,
      hash_cache: Default::default(),
    }
  }

  pub fn zero(timestamp: u64) -> Self {
    Self {
      height: 0,
      parent: Multihash::default(),
      timestamp,
      receipts: vec![],
      hash_cache: OnceCell::new(),
    }
  }

  pub fn hash(&self) -> &Multihash {
    self.hash_cache.get_or_init(|| {
      let mut hasher = Sha3_256::default();
      hasher.update(
        &rmp_serde::to_vec(self).expect("in-memory serialization of a block"),
      );
      multihash::Code::Sha3_256
        .wrap(hasher.finalize())
        .expect("sha3-256 digest fits the default multihash size")
    })
  }
}

impl core::fmt::Debug for Block {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Block")
      .field("height", &self.height)
      .field("parent", &self.parent.to_b58())
      .field("hash", &self.hash().to_b58())
      .field("timestamp", &self.timestamp)
      .field("receipts", &self.receipts)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{Block, Receipt, Status},
    multihash::MultihashDigest,
  };

  #[test]
  fn chained_blocks() {
    let genesis = Block::zero(100);
    let receipt = Receipt {
      transaction: multihash::Code::Sha3_256.digest(b"tx1"),
      block: 1,
      gas_used: 21000,
      status: Status::Confirmed,
    };
    let next = Block::new(&genesis, 102, vec![receipt]);

    assert_eq!(next.height, 1);
    assert_eq!(&next.parent, genesis.hash());
    assert_ne!(next.hash(), genesis.hash());
    assert!(next.receipts[0].is_confirmed());
  }
}
