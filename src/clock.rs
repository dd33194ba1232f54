// Clock
//
// Injectable source of the current (possibly simulated) time.
// The dispatch loop drives a SimulatedClock; admission and pricing only read it.

use chrono::{Duration, Local, NaiveDateTime};
use std::sync::Mutex;

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock used by the shift simulation and in tests
#[derive(Debug)]
pub struct SimulatedClock {
    current: Mutex<NaiveDateTime>,
}

impl SimulatedClock {
    pub fn at(start: NaiveDateTime) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock to `time`. Moving backwards is ignored.
    pub fn set(&self, time: NaiveDateTime) {
        let mut current = self.lock();
        if time > *current {
            *current = time;
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.lock();
        *current += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned clock still holds a valid timestamp
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nine_am() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_simulated_clock_advances() {
        let clock = SimulatedClock::at(nine_am());
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), nine_am() + Duration::minutes(90));
    }

    #[test]
    fn test_simulated_clock_never_moves_backwards() {
        let clock = SimulatedClock::at(nine_am());
        clock.set(nine_am() - Duration::hours(1));
        assert_eq!(clock.now(), nine_am());

        clock.set(nine_am() + Duration::hours(2));
        assert_eq!(clock.now(), nine_am() + Duration::hours(2));
    }
}
