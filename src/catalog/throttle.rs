//! Request pacing
//!
//! Every fetch is followed by a fixed pause whose length depends on the kind of
//! page fetched. The accumulated pause time lives in a [`Throttle`] value that is
//! handed to the fetcher explicitly, so a test can account for the delays without
//! actually sleeping.

use crate::config::PolitenessConfig;
use std::time::Duration;

/// The kind of page being fetched, which selects the post-fetch delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A paginated catalog listing
    Listing,

    /// A single book's detail page
    Detail,
}

/// Post-fetch delays per page kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    pub listing: Duration,
    pub detail: Duration,
}

impl DelayPolicy {
    /// Delay to observe after fetching a page of the given kind
    pub fn delay_for(&self, kind: PageKind) -> Duration {
        match kind {
            PageKind::Listing => self.listing,
            PageKind::Detail => self.detail,
        }
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            listing: Duration::from_millis(1000),
            detail: Duration::from_millis(500),
        }
    }
}

impl From<&PolitenessConfig> for DelayPolicy {
    fn from(config: &PolitenessConfig) -> Self {
        Self {
            listing: config.listing_delay(),
            detail: config.detail_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clock {
    /// Sleep on the tokio timer
    Real,
    /// Only account for the delay
    Simulated,
}

/// Accumulates inter-request delay for one run
///
/// There is no way to cancel a pause once started; an interrupted run stops at
/// the next iteration boundary instead.
#[derive(Debug, Clone)]
pub struct Throttle {
    clock: Clock,
    total: Duration,
    pauses: u64,
}

impl Throttle {
    /// A throttle that actually sleeps
    pub fn real() -> Self {
        Self::with_clock(Clock::Real)
    }

    /// A throttle that records delays without sleeping
    pub fn simulated() -> Self {
        Self::with_clock(Clock::Simulated)
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            total: Duration::ZERO,
            pauses: 0,
        }
    }

    /// Pauses for `delay` and adds it to the running total
    pub async fn pause(&mut self, delay: Duration) {
        self.total += delay;
        self.pauses += 1;

        tracing::trace!("Pausing {:?} (cumulative {:?})", delay, self.total);

        if self.clock == Clock::Real && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Cumulative delay observed so far
    pub fn total_delay(&self) -> Duration {
        self.total
    }

    /// Number of pauses taken, one per fetch
    pub fn pause_count(&self) -> u64 {
        self.pauses
    }

    pub fn is_simulated(&self) -> bool {
        self.clock == Clock::Simulated
    }
}
