use std::{
  sync::atomic::{AtomicU64, Ordering},
  time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Source of block timestamps, in unix seconds.
pub trait Clock: Send + Sync {
  fn now(&self) -> u64;
}

/// Wall clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> u64 {
    SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or_default()
  }
}

/// A clock that only moves when told to. Used by tests to step over
/// campaign deadlines without waiting for them.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
  pub fn new(start: u64) -> Self {
    Self(AtomicU64::new(start))
  }

  pub fn advance(&self, by: Duration) {
    self.0.fetch_add(by.as_secs(), Ordering::SeqCst);
  }

  pub fn set(&self, to: u64) {
    self.0.store(to, Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> u64 {
    self.0.load(Ordering::SeqCst)
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{Clock, ManualClock, SystemClock},
    std::time::Duration,
  };

  #[test]
  fn manual_clock_steps() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now(), 1_000);
    clock.advance(Duration::from_secs(61));
    assert_eq!(clock.now(), 1_061);
    clock.set(5);
    assert_eq!(clock.now(), 5);
  }

  #[test]
  fn system_clock_is_past_2022() {
    assert!(SystemClock.now() > 1_640_000_000);
  }
}
