use crate::error::StatsError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Cumulative counters for one agent.
///
/// Entries are never mutated in place: every invocation produces a successor
/// via [`StatEntry::with_invocation`], which is what makes concurrent readers
/// safe to hand owned copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub invocation_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: u64,
    #[serde(default)]
    pub average_response_time_ms: f64,
    #[serde(default)]
    pub total_response_time_ms: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub last_used: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub first_used: OffsetDateTime,
}

impl StatEntry {
    /// A never-invoked entry stamped with `now`.
    pub fn initial(agent_name: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            agent_name: agent_name.into(),
            invocation_count: 0,
            success_count: 0,
            failure_count: 0,
            average_response_time_ms: 0.0,
            total_response_time_ms: 0,
            last_used: now,
            first_used: now,
        }
    }

    /// The entry that results from one more invocation at `now`.
    ///
    /// `last_used` never moves before `first_used`, even if the wall clock
    /// stepped backwards. Overflowing any counter is an error and leaves
    /// `self` as the current state.
    pub fn with_invocation(
        &self,
        success: bool,
        response_time_ms: u64,
        now: OffsetDateTime,
    ) -> Result<Self, StatsError> {
        let overflow = || StatsError::CounterOverflow {
            agent: self.agent_name.clone(),
        };

        let invocation_count = self.invocation_count.checked_add(1).ok_or_else(overflow)?;
        let (success_count, failure_count) = if success {
            (
                self.success_count.checked_add(1).ok_or_else(overflow)?,
                self.failure_count,
            )
        } else {
            (
                self.success_count,
                self.failure_count.checked_add(1).ok_or_else(overflow)?,
            )
        };
        let total_response_time_ms = self
            .total_response_time_ms
            .checked_add(response_time_ms)
            .ok_or_else(overflow)?;

        Ok(Self {
            agent_name: self.agent_name.clone(),
            invocation_count,
            success_count,
            failure_count,
            average_response_time_ms: average(total_response_time_ms, invocation_count),
            total_response_time_ms,
            last_used: now.max(self.first_used),
            first_used: self.first_used,
        })
    }

    /// Successful invocations as a percentage, 0.0 when never invoked.
    pub fn success_rate(&self) -> f64 {
        percentage(self.success_count, self.invocation_count)
    }

    /// Failed invocations as a percentage, 0.0 when never invoked.
    pub fn failure_rate(&self) -> f64 {
        percentage(self.failure_count, self.invocation_count)
    }

    /// Restore the entry invariants on data read from disk.
    ///
    /// The map key wins over the stored name; success is capped at the
    /// invocation count and failures are derived from the remainder.
    pub(crate) fn normalized(mut self, key: &str) -> Self {
        self.agent_name = key.to_string();
        self.success_count = self.success_count.min(self.invocation_count);
        self.failure_count = self.invocation_count - self.success_count;
        self.average_response_time_ms =
            average(self.total_response_time_ms, self.invocation_count);
        self.last_used = self.last_used.max(self.first_used);
        self
    }
}

fn average(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
