use {
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
  },
  thiserror::Error,
};

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("Address must start with 0x")]
  MissingPrefix,

  #[error("Invalid address length {0}, expected 40 hex characters")]
  InvalidLength(usize),

  #[error("Invalid hex in address: {0}")]
  InvalidHex(#[from] hex::FromHexError),
}

/// Identity of an account on the ledger.
///
/// Wallets render the same account in different letter cases (checksummed
/// or lowercase), so equality is defined over the decoded bytes and never
/// over the textual form.
#[derive(
  Copy,
  Clone,
  Default,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
pub struct Address([u8; 20]);

impl Address {
  pub const fn new(bytes: [u8; 20]) -> Self {
    Self(bytes)
  }

  /// The all-zero address, used by the ledger as the value of
  /// unset identity fields.
  pub const fn zero() -> Self {
    Self([0u8; 20])
  }

  pub fn is_zero(&self) -> bool {
    self.0.iter().all(|b| *b == 0)
  }
}

impl AsRef<[u8]> for Address {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Deref for Address {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "0x{}", hex::encode(self.0))
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "address(0x{})", hex::encode(self.0))
  }
}

impl From<Address> for String {
  fn from(addr: Address) -> Self {
    addr.to_string()
  }
}

impl From<[u8; 20]> for Address {
  fn from(bytes: [u8; 20]) -> Self {
    Self(bytes)
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let digits = s
      .strip_prefix("0x")
      .or_else(|| s.strip_prefix("0X"))
      .ok_or(Error::MissingPrefix)?;

    if digits.len() != 40 {
      return Err(Error::InvalidLength(digits.len()));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)?;
    Ok(Self(bytes))
  }
}

impl TryFrom<&str> for Address {
  type Error = Error;

  fn try_from(value: &str) -> Result<Self, Self::Error> {
    FromStr::from_str(value)
  }
}
