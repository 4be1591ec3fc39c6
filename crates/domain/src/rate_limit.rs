//! Token-bucket limiter for providers with a per-minute request cap

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep};

/// Token bucket refilled one token per `refill_every`
///
/// `acquire` blocks until a token is available. With a capacity of one the
/// bucket enforces a minimum spacing between consecutive requests.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    refill_every: Duration,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket
    pub fn new(capacity: u32, refill_every: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            refill_every,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Bucket sized for a documented requests-per-minute cap
    pub fn per_minute(requests: u32) -> Self {
        let requests = requests.max(1);
        Self::new(requests, Duration::from_secs(60) / requests)
    }

    /// Single-token bucket enforcing `spacing` between requests
    pub fn with_spacing(spacing: Duration) -> Self {
        Self::new(1, spacing)
    }

    /// Bucket that never waits
    pub fn unlimited() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Minimum interval between tokens
    pub fn refill_every(&self) -> Duration {
        self.refill_every
    }

    /// Wait for a token and take it
    pub async fn acquire(&self) {
        if self.refill_every.is_zero() {
            return;
        }

        loop {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            self.refill(&mut state, now);

            if state.tokens > 0 {
                if state.tokens == self.capacity {
                    // A full bucket stops accruing; the next token is due one interval from now.
                    state.last_refill = now;
                }
                state.tokens -= 1;
                return;
            }

            let wait_for = self
                .refill_every
                .saturating_sub(now.duration_since(state.last_refill));
            drop(state);

            tracing::debug!(
                wait_ms = wait_for.as_millis() as u64,
                "Rate limiter waiting for token"
            );
            sleep(wait_for).await;
        }
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.duration_since(state.last_refill);
        let earned = (elapsed.as_nanos() / self.refill_every.as_nanos())
            .min(u128::from(self.capacity)) as u32;
        if earned == 0 {
            return;
        }

        state.tokens = (state.tokens + earned).min(self.capacity);
        state.last_refill = if state.tokens == self.capacity {
            now
        } else {
            state.last_refill + self.refill_every * earned
        };
    }
}
