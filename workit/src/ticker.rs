// Resettable periodic ticker

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Ticker driving the sequence engine
///
/// A zero period yields a disabled ticker that never ticks. A periodic ticker
/// fires one period after construction or after the last [`Ticker::reset`],
/// whichever is later. `reset` may be called while another task is waiting in
/// [`Ticker::tick`]; the waiter then sleeps until the moved deadline.
#[derive(Debug)]
pub enum Ticker {
    Disabled,
    Periodic(Periodic),
}

#[derive(Debug)]
pub struct Periodic {
    period: Duration,
    next: Mutex<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        if period.is_zero() {
            return Ticker::Disabled;
        }

        Ticker::Periodic(Periodic {
            period,
            next: Mutex::new(Instant::now() + period),
        })
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Ticker::Disabled)
    }

    /// Wait for the next deadline. Pends forever if disabled.
    pub async fn tick(&self) {
        let per = match self {
            Ticker::Disabled => return std::future::pending().await,
            Ticker::Periodic(per) => per,
        };

        loop {
            let next = {
                let mut next = per.next.lock().unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();
                if now >= *next {
                    *next = now + per.period;
                    return;
                }
                *next
            };

            sleep_until(next).await;
        }
    }

    /// Move the next deadline to one full period from now
    pub fn reset(&self) {
        if let Ticker::Periodic(per) = self {
            let mut next = per.next.lock().unwrap_or_else(PoisonError::into_inner);
            *next = Instant::now() + per.period;
        }
    }
}
