use {
  crate::{Mutation, SendOptions},
  multihash::{Hasher, Multihash, MultihashDigest, Sha3_256},
  once_cell::sync::OnceCell,
  serde::{Deserialize, Serialize},
};

/// A signed-off submission of a contract mutation.
///
/// The nonce is assigned by whoever submits the transaction, it keeps two
/// otherwise identical submissions (the same account contributing the same
/// amount twice) distinguishable by hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
  pub mutation: Mutation,
  pub options: SendOptions,
  pub nonce: u64,

  #[serde(skip)]
  hash_cache: OnceCell<Multihash>,
}

impl Transaction {
  pub fn new(mutation: Mutation, options: SendOptions, nonce: u64) -> Self {
    Self {
      mutation,
      options,
      nonce,
      hash_cache: OnceCell::new(),
    }
  }

  pub fn hash(&self) -> &Multihash {
    self.hash_cache.get_or_init(|| {
      let mut hasher = Sha3_256::default();
      hasher.update(self.mutation.method().as_bytes());
      hasher.update(
        &rmp_serde::to_vec(&(&self.mutation, &self.options, self.nonce))
          .expect("in-memory serialization of plain data"),
      );
      multihash::Code::Sha3_256
        .wrap(hasher.finalize())
        .expect("sha3-256 digest fits the default multihash size")
    })
  }
}

impl PartialEq for Transaction {
  fn eq(&self, other: &Self) -> bool {
    self.hash() == other.hash()
  }
}

impl Eq for Transaction {}
