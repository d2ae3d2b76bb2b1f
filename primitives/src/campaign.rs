use {
  crate::{units::to_decimal, Address, Ether, Wei},
  serde::{Deserialize, Serialize},
  thiserror::Error,
  time::OffsetDateTime,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("Unknown vote code {0}")]
  UnknownVote(u8),

  #[error("End time {0} is not a valid unix timestamp")]
  InvalidEndTime(u64),
}

/// A funding round record exactly as the contract stores it.
///
/// Amounts are in atomic units. Unknown indices read back as the
/// all-zero record, the way a contract mapping does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFunding {
  pub initiator: Address,
  pub title: String,
  pub info: String,
  pub hash: String,
  pub goal: Wei,
  pub end_time: u64,
  pub success: bool,
  pub over: bool,
  pub amount: Wei,
  pub num_funders: u64,
  pub num_uses: u64,
}

/// A spend proposal record as returned by `getUse`.
///
/// `agree` is the vote code of the account the query was made for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUse {
  pub info: String,
  pub goal: Wei,
  pub agree_amount: Wei,
  pub disagree: Wei,
  pub over: bool,
  pub agree: u8,
}

/// One account's position on a use request.
#[derive(
  Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Vote {
  #[default]
  Unset,
  Approved,
  Rejected,
}

impl Vote {
  pub fn code(&self) -> u8 {
    match self {
      Vote::Unset => 0,
      Vote::Approved => 1,
      Vote::Rejected => 2,
    }
  }

  pub fn is_cast(&self) -> bool {
    *self != Vote::Unset
  }
}

impl From<bool> for Vote {
  fn from(agree: bool) -> Self {
    match agree {
      true => Vote::Approved,
      false => Vote::Rejected,
    }
  }
}

impl TryFrom<u8> for Vote {
  type Error = Error;

  fn try_from(code: u8) -> Result<Self, Self::Error> {
    match code {
      0 => Ok(Vote::Unset),
      1 => Ok(Vote::Approved),
      2 => Ok(Vote::Rejected),
      other => Err(Error::UnknownVote(other)),
    }
  }
}

/// A funding round with a goal, a deadline and an initiator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
  /// 1-based position in creation order.
  pub index: u64,
  pub title: String,
  pub info: String,

  /// Reference to off-band content, such as a document digest.
  pub hash: String,
  pub goal: Ether,

  /// Raised so far.
  pub amount: Ether,

  /// Contributions are accepted only before this instant.
  pub end_time: OffsetDateTime,
  pub initiator: Address,
  pub over: bool,
  pub success: bool,
  pub num_funders: u64,
  pub num_uses: u64,

  /// Contribution of the account a view was built for. Not part of the
  /// on-chain record.
  pub my_amount: Option<Ether>,
}

impl Campaign {
  /// Normalizes a raw contract record into the entity.
  pub fn from_raw(index: u64, raw: RawFunding) -> Result<Self, Error> {
    let end_time = i64::try_from(raw.end_time)
      .ok()
      .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
      .ok_or(Error::InvalidEndTime(raw.end_time))?;

    Ok(Self {
      index,
      title: raw.title,
      info: raw.info,
      hash: raw.hash,
      goal: to_decimal(raw.goal),
      amount: to_decimal(raw.amount),
      end_time,
      initiator: raw.initiator,
      over: raw.over,
      success: raw.success,
      num_funders: raw.num_funders,
      num_uses: raw.num_uses,
      my_amount: None,
    })
  }

  pub fn with_my_amount(self, my_amount: Ether) -> Self {
    Self {
      my_amount: Some(my_amount),
      ..self
    }
  }
}

/// A spend proposal against a funded campaign's raised funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseRequest {
  /// 1-based position within the parent campaign.
  pub index: u64,
  pub info: String,
  pub goal: Ether,
  pub agree_amount: Ether,
  pub disagree: Ether,

  /// Resolved one way or another. The outcome rule belongs to the ledger.
  pub over: bool,

  /// The querying account's own vote, not the aggregate outcome.
  pub agree: Vote,
}

impl UseRequest {
  pub fn from_raw(index: u64, raw: RawUse) -> Result<Self, Error> {
    Ok(Self {
      index,
      info: raw.info,
      goal: to_decimal(raw.goal),
      agree_amount: to_decimal(raw.agree_amount),
      disagree: to_decimal(raw.disagree),
      over: raw.over,
      agree: Vote::try_from(raw.agree)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{Campaign, Error, RawFunding, RawUse, UseRequest, Vote},
    crate::{to_atomic, Ether},
  };

  #[test]
  fn campaign_from_raw() -> anyhow::Result<()> {
    let raw = RawFunding {
      initiator: "0x00000000000000000000000000000000000000aa".parse()?,
      title: "Solar roof".into(),
      info: "panels for the school".into(),
      hash: "QmDigest".into(),
      goal: to_atomic("10")?,
      end_time: 1_700_000_000,
      amount: to_atomic("2.5")?,
      num_funders: 2,
      ..Default::default()
    };

    let campaign = Campaign::from_raw(3, raw)?;
    assert_eq!(campaign.index, 3);
    assert_eq!(campaign.goal, Ether::from(10));
    assert_eq!(campaign.amount.to_string(), "2.5");
    assert_eq!(campaign.end_time.unix_timestamp(), 1_700_000_000);
    assert_eq!(campaign.my_amount, None);

    let mine = campaign.with_my_amount("1.5".parse()?);
    assert_eq!(mine.my_amount.map(|a| a.to_string()), Some("1.5".into()));
    Ok(())
  }

  #[test]
  fn end_time_out_of_range() {
    let raw = RawFunding {
      end_time: u64::MAX,
      ..Default::default()
    };
    assert_eq!(
      Campaign::from_raw(1, raw),
      Err(Error::InvalidEndTime(u64::MAX))
    );
  }

  #[test]
  fn vote_codes() -> anyhow::Result<()> {
    for vote in [Vote::Unset, Vote::Approved, Vote::Rejected] {
      assert_eq!(Vote::try_from(vote.code())?, vote);
    }
    assert_eq!(Vote::from(true), Vote::Approved);
    assert_eq!(Vote::from(false), Vote::Rejected);
    assert_eq!(Vote::try_from(7), Err(Error::UnknownVote(7)));

    let raw = RawUse {
      agree: 3,
      ..Default::default()
    };
    assert!(UseRequest::from_raw(1, raw).is_err());
    Ok(())
  }
}
