//! Per-row latency for synthetic queries.

use crate::config::QuerySpec;
use crate::error::{Result, WebcatError};
use rand::Rng;
use std::time::Duration;

/// How long a synthetic source pauses between rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelayPolicy {
    /// No pause.
    None,
    /// The same pause every time.
    Fixed(Duration),
    /// A fresh uniform sample from `[low, high)` every time.
    Random { low: Duration, high: Duration },
}

impl DelayPolicy {
    /// Resolves the delay policy for a query.
    ///
    /// `_delay` and `_random_delay` are mutually exclusive.
    pub fn resolve(spec: &QuerySpec) -> Result<Self> {
        match (spec.delay, spec.random_delay) {
            (Some(_), Some(_)) => Err(WebcatError::config(format!(
                "Query '{}': incompatible keys _delay and _random_delay",
                spec.id
            ))),
            (Some(seconds), None) => Ok(Self::Fixed(seconds_to_duration(&spec.id, seconds)?)),
            (None, Some((low, high))) => {
                let low = seconds_to_duration(&spec.id, low)?;
                let high = seconds_to_duration(&spec.id, high)?;
                if low > high {
                    return Err(WebcatError::config(format!(
                        "Query '{}': _random_delay low bound exceeds high bound",
                        spec.id
                    )));
                }
                if low == high {
                    return Ok(Self::Fixed(low));
                }
                Ok(Self::Random { low, high })
            }
            (None, None) => Ok(Self::None),
        }
    }

    /// Produces the next pause.
    pub fn next_delay(&self) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => delay,
            Self::Random { low, high } => rand::thread_rng().gen_range(low..high),
        }
    }

    /// Turns the policy into a zero-argument producer.
    pub fn into_fn(self) -> impl FnMut() -> Duration + Send + 'static {
        move || self.next_delay()
    }
}

fn seconds_to_duration(query_id: &str, seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        WebcatError::config(format!(
            "Query '{query_id}': delay must be a non-negative number of seconds, got {seconds}"
        ))
    })
}
