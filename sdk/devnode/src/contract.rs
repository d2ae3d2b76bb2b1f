use {
  crowdfund_primitives::{
    Address,
    Call,
    Mutation,
    RawFunding,
    RawUse,
    Status,
    Transaction,
    Vote,
    Wei,
  },
  crowdfund_sdk::VotePolicy,
  primitive_types::U256,
  std::collections::HashMap,
  tracing::debug,
};

/// Gas charged by each contract method, flat per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasSchedule {
  pub new_funding: u64,
  pub contribute: u64,
  pub return_money: u64,
  pub new_use: u64,
  pub agree_use: u64,
}

impl GasSchedule {
  pub fn cost(&self, mutation: &Mutation) -> u64 {
    match mutation {
      Mutation::NewFunding { .. } => self.new_funding,
      Mutation::Contribute { .. } => self.contribute,
      Mutation::ReturnMoney { .. } => self.return_money,
      Mutation::NewUse { .. } => self.new_use,
      Mutation::AgreeUse { .. } => self.agree_use,
    }
  }
}

impl Default for GasSchedule {
  fn default() -> Self {
    Self {
      new_funding: 250_000,
      contribute: 80_000,
      return_money: 50_000,
      new_use: 150_000,
      agree_use: 90_000,
    }
  }
}

/// Parameters of the contract that the client never sees directly.
#[derive(Debug, Clone)]
pub struct LedgerRules {
  /// What happens when a contributor votes twice on the same request.
  pub vote_policy: VotePolicy,

  /// Percentage of the raised amount the approving weight has to exceed
  /// for a use request to pass. A disagreeing weight reaching the
  /// complement rejects it. Values above 99 count as 99.
  pub approval_threshold: u64,
  pub gas: GasSchedule,
}

/// Highest usable approval threshold. At 100 the rejecting complement is
/// zero and any vote would reject.
pub const MAX_THRESHOLD: u64 = 99;

impl Default for LedgerRules {
  fn default() -> Self {
    Self {
      vote_policy: VotePolicy::Reject,
      approval_threshold: 50,
      gas: GasSchedule::default(),
    }
  }
}

struct UseState {
  info: String,
  goal: Wei,
  agree_amount: Wei,
  disagree: Wei,
  over: bool,
  votes: HashMap<Address, (Vote, Wei)>,
}

struct Funding {
  record: RawFunding,
  spent: Wei,
  contributions: HashMap<Address, Wei>,
  uses: Vec<UseState>,
}

impl Funding {
  /// Campaigns close on the first interaction past their deadline.
  fn settle(&mut self, now: u64) {
    settle(&mut self.record, now);
  }

  fn unspent(&self) -> Wei {
    self.record.amount.saturating_sub(self.spent)
  }
}

fn settle(record: &mut RawFunding, now: u64) {
  if !record.over && now >= record.end_time {
    record.over = true;
    record.success = record.amount >= record.goal;
  }
}

/// In-memory rendition of the crowdfunding contract.
///
/// Every mutation either applies completely or reverts with a reason and
/// leaves state untouched.
pub struct CrowdFunding {
  rules: LedgerRules,
  fundings: Vec<Funding>,
  balances: HashMap<Address, Wei>,
}

impl CrowdFunding {
  pub fn new(rules: LedgerRules) -> Self {
    Self {
      rules,
      fundings: vec![],
      balances: HashMap::new(),
    }
  }

  pub fn rules(&self) -> &LedgerRules {
    &self.rules
  }

  /// Credits an account out of thin air, the genesis allocation.
  pub fn fund(&mut self, account: Address, amount: Wei) {
    let balance = self.balances.entry(account).or_default();
    *balance = balance.checked_add(amount).unwrap_or(Wei(U256::MAX));
  }

  pub fn balance(&self, account: &Address) -> Wei {
    self.balances.get(account).copied().unwrap_or_default()
  }

  /// Executes one transaction at block time `now`, returning the gas it
  /// consumed and its outcome.
  pub fn execute(&mut self, tx: &Transaction, now: u64) -> (u64, Status) {
    let cost = self.rules.gas.cost(&tx.mutation);
    if tx.options.gas < cost {
      return (
        tx.options.gas,
        Status::Reverted(format!(
          "out of gas: {} needs {cost}, limit was {}",
          tx.mutation.method(),
          tx.options.gas
        )),
      );
    }

    let from = tx.options.from;
    let value = tx.options.value.unwrap_or_default();
    let outcome = match &tx.mutation {
      Mutation::Contribute { index } => {
        self.contribute(from, *index, value, now)
      }
      other if !value.is_zero() => {
        Err(format!("{} is not payable", other.method()))
      }
      Mutation::NewFunding {
        initiator,
        title,
        info,
        hash,
        goal,
        seconds,
      } => self.new_funding(
        *initiator,
        title.clone(),
        info.clone(),
        hash.clone(),
        *goal,
        *seconds,
        now,
      ),
      Mutation::ReturnMoney { index } => self.return_money(from, *index, now),
      Mutation::NewUse { index, goal, info } => {
        self.new_use(from, *index, *goal, info.clone(), now)
      }
      Mutation::AgreeUse {
        index,
        use_index,
        agree,
      } => self.agree_use(from, *index, *use_index, *agree, now),
    };

    match outcome {
      Ok(()) => (cost, Status::Confirmed),
      Err(reason) => {
        debug!("{} from {from} reverted: {reason}", tx.mutation.method());
        (cost, Status::Reverted(reason))
      }
    }
  }

  /// Answers a read-only call with the MessagePack encoding of its result.
  ///
  /// Reads see deadlines as already settled, even if no transaction has
  /// touched the campaign since it expired.
  pub fn query(
    &self,
    call: &Call,
    now: u64,
  ) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    match call {
      Call::NumFundings => rmp_serde::to_vec(&(self.fundings.len() as u64)),
      Call::Funding { index } => {
        let record = match self.get(*index) {
          Some(funding) => {
            let mut record = funding.record.clone();
            settle(&mut record, now);
            record
          }
          None => RawFunding::default(),
        };
        rmp_serde::to_vec(&record)
      }
      Call::MyFunding { account, index } => rmp_serde::to_vec(
        &self
          .get(*index)
          .and_then(|f| f.contributions.get(account).copied())
          .unwrap_or_default(),
      ),
      Call::UseLength { index } => rmp_serde::to_vec(
        &self.get(*index).map(|f| f.uses.len() as u64).unwrap_or(0),
      ),
      Call::Use {
        index,
        use_index,
        account,
      } => {
        let record = self
          .get(*index)
          .and_then(|f| position(*use_index).and_then(|i| f.uses.get(i)))
          .map(|u| RawUse {
            info: u.info.clone(),
            goal: u.goal,
            agree_amount: u.agree_amount,
            disagree: u.disagree,
            over: u.over,
            agree: u
              .votes
              .get(account)
              .map(|(vote, _)| vote.code())
              .unwrap_or_default(),
          })
          .unwrap_or_default();
        rmp_serde::to_vec(&record)
      }
    }
  }

  fn get(&self, index: u64) -> Option<&Funding> {
    position(index).and_then(|i| self.fundings.get(i))
  }

  #[allow(clippy::too_many_arguments)]
  fn new_funding(
    &mut self,
    initiator: Address,
    title: String,
    info: String,
    hash: String,
    goal: Wei,
    seconds: u64,
    now: u64,
  ) -> Result<(), String> {
    ensure(!goal.is_zero(), "goal must be positive")?;
    ensure(seconds > 0, "duration must be positive")?;
    let end_time = now
      .checked_add(seconds)
      .ok_or_else(|| format!("duration of {seconds}s is out of range"))?;

    self.fundings.push(Funding {
      record: RawFunding {
        initiator,
        title,
        info,
        hash,
        goal,
        end_time,
        ..Default::default()
      },
      spent: Wei::zero(),
      contributions: HashMap::new(),
      uses: vec![],
    });
    Ok(())
  }

  fn contribute(
    &mut self,
    from: Address,
    index: u64,
    value: Wei,
    now: u64,
  ) -> Result<(), String> {
    let funding = find(&mut self.fundings, index)?;
    funding.settle(now);
    ensure(!funding.record.over, format!("campaign #{index} is over"))?;
    ensure(!value.is_zero(), "contribution must be positive")?;

    let amount = funding
      .record
      .amount
      .checked_add(value)
      .ok_or("raised amount overflows")?;
    let balance = self.balances.entry(from).or_default();
    let held = *balance;
    *balance = held.checked_sub(value).ok_or_else(|| {
      format!("insufficient funds: {from} holds {held}, needs {value}")
    })?;

    let previous = funding.contributions.entry(from).or_default();
    if previous.is_zero() {
      funding.record.num_funders += 1;
    }
    // a contribution never exceeds the campaign total
    *previous = previous.checked_add(value).unwrap_or(amount);

    let record = &mut funding.record;
    record.amount = amount;
    if record.amount >= record.goal {
      record.over = true;
      record.success = true;
    }
    Ok(())
  }

  fn return_money(
    &mut self,
    from: Address,
    index: u64,
    now: u64,
  ) -> Result<(), String> {
    let funding = find(&mut self.fundings, index)?;
    funding.settle(now);
    ensure(funding.record.over, format!("campaign #{index} is still open"))?;
    ensure(
      !funding.record.success,
      format!("campaign #{index} reached its goal"),
    )?;

    let contribution = funding
      .contributions
      .get_mut(&from)
      .filter(|c| !c.is_zero())
      .ok_or_else(|| format!("{from} has nothing to refund in #{index}"))?;

    let balance = self.balances.entry(from).or_default();
    *balance = balance
      .checked_add(*contribution)
      .ok_or("balance overflows")?;
    *contribution = Wei::zero();
    Ok(())
  }

  fn new_use(
    &mut self,
    from: Address,
    index: u64,
    goal: Wei,
    info: String,
    now: u64,
  ) -> Result<(), String> {
    let funding = find(&mut self.fundings, index)?;
    funding.settle(now);
    ensure(
      funding.record.initiator == from,
      format!("only the initiator of campaign #{index} may propose a use"),
    )?;
    ensure(
      funding.record.success,
      format!("campaign #{index} has not been funded"),
    )?;
    ensure(!goal.is_zero(), "requested amount must be positive")?;
    let unspent = funding.unspent();
    ensure(
      goal <= unspent,
      format!("requested {goal} exceeds the {unspent} left in #{index}"),
    )?;

    funding.uses.push(UseState {
      info,
      goal,
      agree_amount: Wei::zero(),
      disagree: Wei::zero(),
      over: false,
      votes: HashMap::new(),
    });
    funding.record.num_uses += 1;
    Ok(())
  }

  fn agree_use(
    &mut self,
    from: Address,
    index: u64,
    use_index: u64,
    agree: bool,
    now: u64,
  ) -> Result<(), String> {
    let policy = self.rules.vote_policy;
    let threshold = self.rules.approval_threshold.min(MAX_THRESHOLD);

    let funding = find(&mut self.fundings, index)?;
    funding.settle(now);
    let Funding {
      record,
      spent,
      contributions,
      uses,
    } = funding;

    let weight = contributions
      .get(&from)
      .copied()
      .filter(|w| !w.is_zero())
      .ok_or_else(|| format!("{from} did not contribute to #{index}"))?;
    let request = position(use_index)
      .and_then(|i| uses.get_mut(i))
      .ok_or_else(|| {
        format!("use request #{use_index} of #{index} does not exist")
      })?;
    ensure(
      !request.over,
      format!("use request #{use_index} of #{index} is resolved"),
    )?;

    let vote = Vote::from(agree);
    if let Some((previous, counted)) = request.votes.get(&from).copied() {
      match policy {
        VotePolicy::Reject => {
          return Err(format!(
            "{from} already voted on use request #{use_index} of #{index}"
          ));
        }
        VotePolicy::Overwrite => {
          let side = match previous {
            Vote::Approved => &mut request.agree_amount,
            _ => &mut request.disagree,
          };
          *side = side.saturating_sub(counted);
        }
      }
    }

    let side = match vote {
      Vote::Approved => &mut request.agree_amount,
      _ => &mut request.disagree,
    };
    *side = side.checked_add(weight).ok_or("vote weight overflows")?;
    request.votes.insert(from, (vote, weight));

    let raised = record.amount.0;
    let approved = request.agree_amount.0.full_mul(U256::from(100))
      > raised.full_mul(U256::from(threshold));
    let rejected = request.disagree.0.full_mul(U256::from(100))
      >= raised.full_mul(U256::from(100 - threshold));

    if approved {
      request.over = true;
      *spent = spent.checked_add(request.goal).ok_or("spent overflows")?;
      let payee = self.balances.entry(record.initiator).or_default();
      *payee = payee.checked_add(request.goal).ok_or("balance overflows")?;
      debug!("use request #{use_index} of #{index} approved");
    } else if rejected {
      request.over = true;
      debug!("use request #{use_index} of #{index} rejected");
    }
    Ok(())
  }
}

/// 1-based index to vector position.
fn position(index: u64) -> Option<usize> {
  index.checked_sub(1).and_then(|i| usize::try_from(i).ok())
}

fn find(fundings: &mut [Funding], index: u64) -> Result<&mut Funding, String> {
  position(index)
    .and_then(|i| fundings.get_mut(i))
    .ok_or_else(|| format!("campaign #{index} does not exist"))
}

fn ensure(condition: bool, reason: impl Into<String>) -> Result<(), String> {
  match condition {
    true => Ok(()),
    false => Err(reason.into()),
  }
}
