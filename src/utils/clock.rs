use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing dates across application. Record and backup
/// timestamps come from here so tests can pin them.
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub mod test_clock {
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, Utc};

    use super::Clock;

    /// Clock that only moves when told to.
    pub struct FixedClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for FixedClock {
        fn time(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    impl Clock for std::sync::Arc<FixedClock> {
        fn time(&self) -> DateTime<Utc> {
            self.as_ref().time()
        }
    }
}
