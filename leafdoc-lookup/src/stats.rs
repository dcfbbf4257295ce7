//! Lookup statistics.

/// Counters kept by one leaf lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    /// `get` calls answered from the memo table.
    pub hits: u64,
    /// `get` calls that had to resolve and load.
    pub misses: u64,
    /// Successful loads (one per memoized name).
    pub loads: u64,
    /// Misses that failed to resolve or load.
    pub failures: u64,
}

impl LookupStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_stats_hit_rate() {
        let stats = LookupStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = LookupStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
