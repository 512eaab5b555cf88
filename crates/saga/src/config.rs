//! Saga configuration loaded from environment variables.

/// Orchestration policy knobs with sensible defaults.
///
/// Reads from environment variables:
/// - `ALLOW_EXACT_DEPLETION` — whether an order may exhaust a book's
///   stock exactly (default: `false`, orders must leave at least one
///   unit behind)
#[derive(Debug, Clone, Default)]
pub struct SagaConfig {
    /// Whether CheckInventory accepts an order that brings stock to
    /// exactly zero.
    pub allow_exact_depletion: bool,
}

impl SagaConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            allow_exact_depletion: std::env::var("ALLOW_EXACT_DEPLETION")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rejects_exact_depletion() {
        let config = SagaConfig::default();
        assert!(!config.allow_exact_depletion);
    }
}
