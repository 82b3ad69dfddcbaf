//! Well-known memory keys.
//!
//! `Agent::run` is the only writer of these keys. Other code may read them
//! but should treat them as owned by the agent lifecycle.

/// Keys the agent lifecycle writes into an agent's memory.
pub struct MemoryKeys;

impl MemoryKeys {
    /// The task most recently handed to `Agent::run`. Written before the
    /// processor is invoked, so it is present even when the run fails.
    pub const CURRENT_TASK: &'static str = "current_task";

    /// Output of the most recent successful run. Left untouched by failures.
    pub const LAST_RESULT: &'static str = "last_result";

    /// All lifecycle keys.
    pub fn all() -> &'static [&'static str] {
        &[Self::CURRENT_TASK, Self::LAST_RESULT]
    }

    /// Whether `key` is reserved for the agent lifecycle.
    pub fn is_reserved(key: &str) -> bool {
        Self::all().contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_keys_are_distinct() {
        assert_ne!(MemoryKeys::CURRENT_TASK, MemoryKeys::LAST_RESULT);
        assert!(MemoryKeys::is_reserved("current_task"));
        assert!(MemoryKeys::is_reserved("last_result"));
        assert!(!MemoryKeys::is_reserved("user_context"));
    }
}
