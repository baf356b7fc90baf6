/// Bounds for a single accumulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationPolicy {
    /// Unique names to collect when the caller does not ask for a specific count.
    pub target: usize,
    /// Per-call ceiling on requested samples.
    pub batch_limit: usize,
    /// Consecutive calls that add no new name before giving up.
    pub max_attempts: usize,
    pub temperature: f32,
}

impl Default for AccumulationPolicy {
    fn default() -> Self {
        Self {
            target: 5,
            batch_limit: 5,
            max_attempts: 10,
            temperature: 0.6,
        }
    }
}

impl AccumulationPolicy {
    /// Samples to request when `deficit` names are still missing.
    pub fn batch_size(&self, deficit: usize) -> usize {
        deficit.min(self.batch_limit.max(1))
    }
}

/// Runtime settings consumed by the name service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub policy: AccumulationPolicy,
    pub strict_validation: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            policy: AccumulationPolicy::default(),
            strict_validation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_is_capped_by_limit_and_deficit() {
        let policy = AccumulationPolicy::default();
        assert_eq!(policy.batch_size(12), 5);
        assert_eq!(policy.batch_size(2), 2);
    }

    #[test]
    fn zero_batch_limit_still_requests_one_sample() {
        let policy = AccumulationPolicy {
            batch_limit: 0,
            ..AccumulationPolicy::default()
        };
        assert_eq!(policy.batch_size(3), 1);
    }
}
