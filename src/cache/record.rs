use crate::Severity;

/// Latest known result for one (host, service) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRecord {
    pub host: String,
    pub service: String,

    pub state: Severity,

    /// Message of the most recent result
    pub output: String,

    /// Unix seconds of the most recent write
    pub last_updated: i64,

    /// Unix seconds at which `state` last changed to its current value
    pub status_first_seen: i64,
}

impl CheckRecord {
    /// Applies a write on top of the previous record for the same pair.
    ///
    /// `status_first_seen` only moves when the severity changes. A write
    /// stamped earlier than the previous one is applied at the previous
    /// timestamp, so neither timestamp of a record ever goes backwards.
    pub fn next(
        previous: Option<&CheckRecord>,
        host: &str,
        service: &str,
        state: Severity,
        output: &str,
        timestamp: i64,
    ) -> CheckRecord {
        let timestamp = previous.map_or(timestamp, |prev| timestamp.max(prev.last_updated));
        let status_first_seen = match previous {
            Some(prev) if prev.state == state => prev.status_first_seen,
            _ => timestamp,
        };

        CheckRecord {
            host: host.to_string(),
            service: service.to_string(),
            state,
            output: output.to_string(),
            last_updated: timestamp,
            status_first_seen,
        }
    }
}
