mod address;
mod b58;
mod block;
mod call;
mod campaign;
mod transaction;
mod units;

pub use {
  address::{Address, Error as AddressError},
  b58::ToBase58String,
  block::{Block, Receipt, Status},
  call::{Call, Mutation, SendOptions},
  campaign::{
    Campaign,
    Error as RecordError,
    RawFunding,
    RawUse,
    UseRequest,
    Vote,
  },
  transaction::Transaction,
  units::{
    to_atomic,
    to_decimal,
    Error as UnitError,
    Ether,
    IntoAtomic,
    Wei,
    DECIMALS,
  },
};
