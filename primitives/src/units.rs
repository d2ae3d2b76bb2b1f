use {
  once_cell::sync::Lazy,
  primitive_types::U256,
  serde::{Deserialize, Serialize},
  std::{fmt::Display, str::FromStr},
  thiserror::Error,
};

/// Number of fractional digits of the human-facing currency unit.
pub const DECIMALS: usize = 18;

static WEI_PER_ETHER: Lazy<U256> = Lazy::new(|| U256::exp10(DECIMALS));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("Negative amount {0:?}")]
  Negative(String),

  #[error("Malformed decimal amount {0:?}")]
  Malformed(String),

  #[error("Amount {0:?} has more than 18 fractional digits")]
  Precision(String),

  #[error("Amount {0:?} does not fit in 256 bits of atomic units")]
  Overflow(String),
}

/// An amount expressed in the ledger's atomic (indivisible) unit.
#[derive(
  Debug,
  Copy,
  Clone,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
pub struct Wei(pub U256);

impl Wei {
  pub fn zero() -> Self {
    Self(U256::zero())
  }

  pub fn is_zero(&self) -> bool {
    self.0.is_zero()
  }

  pub fn checked_add(self, other: Wei) -> Option<Wei> {
    self.0.checked_add(other.0).map(Wei)
  }

  pub fn checked_sub(self, other: Wei) -> Option<Wei> {
    self.0.checked_sub(other.0).map(Wei)
  }

  pub fn saturating_sub(self, other: Wei) -> Wei {
    Wei(self.0.saturating_sub(other.0))
  }

  pub fn to_ether(self) -> Ether {
    to_decimal(self)
  }
}

impl From<u64> for Wei {
  fn from(value: u64) -> Self {
    Self(U256::from(value))
  }
}

impl From<U256> for Wei {
  fn from(value: U256) -> Self {
    Self(value)
  }
}

impl Display for Wei {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A decimal currency amount.
///
/// Displays in its canonical spelling: no leading zeros in the integer part
/// (except a lone `0`), no trailing zeros in the fractional part and no
/// dangling decimal point. Equality is equality of the underlying value.
#[derive(
  Debug,
  Copy,
  Clone,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Ether(Wei);

impl Ether {
  pub fn zero() -> Self {
    Self(Wei::zero())
  }

  pub fn is_zero(&self) -> bool {
    self.0.is_zero()
  }

  pub fn to_wei(self) -> Wei {
    self.0
  }
}

impl Display for Ether {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let (whole, fraction) = self.0 .0.div_mod(*WEI_PER_ETHER);
    if fraction.is_zero() {
      return write!(f, "{whole}");
    }

    let fraction =
      format!("{:0>width$}", fraction.to_string(), width = DECIMALS);
    write!(f, "{whole}.{}", fraction.trim_end_matches('0'))
  }
}

impl FromStr for Ether {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    to_atomic(s).map(Ether)
  }
}

impl TryFrom<String> for Ether {
  type Error = Error;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Ether> for String {
  fn from(value: Ether) -> Self {
    value.to_string()
  }
}

impl From<Wei> for Ether {
  fn from(value: Wei) -> Self {
    Self(value)
  }
}

impl From<u64> for Ether {
  fn from(value: u64) -> Self {
    // u64::MAX * 10^18 is far below 2^256
    Self(Wei(U256::from(value) * *WEI_PER_ETHER))
  }
}

/// Converts a decimal amount to atomic units at the fixed 18-digit scale.
///
/// Accepts `digits` or `digits.digits`. Anything else, including a sign,
/// an exponent, surrounding whitespace or more fractional digits than the
/// scale can represent, is rejected rather than rounded.
pub fn to_atomic(decimal: &str) -> Result<Wei, Error> {
  if decimal.starts_with('-') {
    return Err(Error::Negative(decimal.to_owned()));
  }

  let malformed = || Error::Malformed(decimal.to_owned());
  let is_digits =
    |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

  let (whole, fraction) = match decimal.split_once('.') {
    Some((whole, fraction)) => (whole, fraction),
    None => (decimal, "0"),
  };

  if !is_digits(whole) || !is_digits(fraction) {
    return Err(malformed());
  }

  if fraction.len() > DECIMALS {
    return Err(Error::Precision(decimal.to_owned()));
  }

  let overflow = || Error::Overflow(decimal.to_owned());
  let whole = U256::from_dec_str(whole).map_err(|_| overflow())?;
  let fraction =
    U256::from_dec_str(&format!("{:0<width$}", fraction, width = DECIMALS))
      .map_err(|_| malformed())?;

  whole
    .checked_mul(*WEI_PER_ETHER)
    .and_then(|w| w.checked_add(fraction))
    .map(Wei)
    .ok_or_else(overflow)
}

/// Converts atomic units to a decimal amount.
///
/// Lossless: every atomic value has exactly one decimal representation
/// at the fixed scale.
pub fn to_decimal(atomic: Wei) -> Ether {
  Ether(atomic)
}

/// Anything a caller may hand in as a human-facing amount.
pub trait IntoAtomic {
  fn into_atomic(self) -> Result<Wei, Error>;
}

impl IntoAtomic for &str {
  fn into_atomic(self) -> Result<Wei, Error> {
    to_atomic(self)
  }
}

impl IntoAtomic for &String {
  fn into_atomic(self) -> Result<Wei, Error> {
    to_atomic(self)
  }
}

impl IntoAtomic for String {
  fn into_atomic(self) -> Result<Wei, Error> {
    to_atomic(&self)
  }
}

impl IntoAtomic for u64 {
  fn into_atomic(self) -> Result<Wei, Error> {
    Ok(Ether::from(self).to_wei())
  }
}

impl IntoAtomic for &Ether {
  fn into_atomic(self) -> Result<Wei, Error> {
    Ok(self.to_wei())
  }
}

impl IntoAtomic for Ether {
  fn into_atomic(self) -> Result<Wei, Error> {
    Ok(self.to_wei())
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{to_atomic, to_decimal, Error, Ether, IntoAtomic, Wei},
    primitive_types::U256,
  };

  #[test]
  fn whole_and_fractional() -> anyhow::Result<()> {
    assert_eq!(to_atomic("1")?, Wei(U256::exp10(18)));
    assert_eq!(to_atomic("0.5")?, Wei(U256::exp10(17) * 5));
    assert_eq!(to_atomic("0.000000000000000001")?, Wei::from(1));
    assert_eq!(to_atomic("0")?, Wei::zero());
    Ok(())
  }

  #[test]
  fn canonical_decimal() {
    assert_eq!(to_decimal(Wei::zero()).to_string(), "0");
    assert_eq!(
      to_decimal(Wei::from(1)).to_string(),
      "0.000000000000000001"
    );
    assert_eq!(
      to_decimal(Wei(U256::exp10(18) * 10 + U256::exp10(17) * 5))
        .to_string(),
      "10.5"
    );
  }

  #[test]
  fn round_trip_on_canonical_spellings() -> anyhow::Result<()> {
    for x in [
      "0",
      "4",
      "10",
      "10.5",
      "0.1",
      "123456789.000000000000000001",
      "115792089237316195423570985008687907853269984665640564039457",
    ] {
      assert_eq!(to_decimal(to_atomic(x)?).to_string(), x);
    }
    Ok(())
  }

  #[test]
  fn non_canonical_spelling_normalizes() -> anyhow::Result<()> {
    assert_eq!(to_atomic("1.50")?, to_atomic("1.5")?);
    assert_eq!("007.10".parse::<Ether>()?.to_string(), "7.1");
    assert_eq!("2.0".parse::<Ether>()?, Ether::from(2));
    Ok(())
  }

  #[test]
  fn rejects_bad_input() {
    assert!(matches!(to_atomic("-1"), Err(Error::Negative(_))));
    for bad in ["", ".5", "5.", "1e18", " 1", "1 ", "+1", "1.2.3", "abc"] {
      assert!(
        matches!(to_atomic(bad), Err(Error::Malformed(_))),
        "{bad:?} should be malformed"
      );
    }
    assert!(matches!(
      to_atomic("0.0000000000000000001"),
      Err(Error::Precision(_))
    ));
    assert!(matches!(
      to_atomic(&"9".repeat(80)),
      Err(Error::Overflow(_))
    ));
  }

  #[test]
  fn numeric_inputs() -> anyhow::Result<()> {
    assert_eq!(10u64.into_atomic()?, to_atomic("10")?);
    assert_eq!(Ether::from(3).into_atomic()?, to_atomic("3")?);
    assert!(Ether::zero().is_zero());
    assert!(!Ether::from(1).is_zero());
    Ok(())
  }
}
