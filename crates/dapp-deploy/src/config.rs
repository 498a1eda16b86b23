use serde::{Deserialize, Serialize};

use crate::constants;

/// Behavior switches and storage fees for a deployment attempt.
///
/// The field names follow the engine's configuration surface, so a configuration file written
/// as `{"enableVerboseContractErrors": true}` deserializes with everything else defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployConfig {
    /// Emit diagnostics for failed deployments. Never changes the returned result.
    pub enable_verbose_contract_errors: bool,
    /// Allow contract code to emit host-visible diagnostic output while it executes.
    pub enable_context_println: bool,
    /// Ask the loader to retain debug metadata.
    pub preserve_debuggability: bool,
    /// Energy charged per byte of persisted object graph.
    pub write_price_per_byte: u64,
    /// Upper bound on the serialized object graph, in bytes. Can only tighten
    /// [`MAX_GRAPH_SIZE`](constants::MAX_GRAPH_SIZE), see [`Self::graph_size_bound`].
    pub max_graph_size: usize,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            enable_verbose_contract_errors: false,
            enable_context_println: false,
            preserve_debuggability: false,
            write_price_per_byte: constants::WRITE_PRICE_PER_BYTE,
            max_graph_size: constants::MAX_GRAPH_SIZE,
        }
    }
}

impl DeployConfig {
    /// Sets whether failed deployments are reported through the diagnostic channel.
    pub fn with_verbose_contract_errors(mut self, enabled: bool) -> Self {
        self.enable_verbose_contract_errors = enabled;
        self
    }

    /// Sets whether contract code may print through its runtime.
    pub fn with_context_println(mut self, enabled: bool) -> Self {
        self.enable_context_println = enabled;
        self
    }

    /// Sets whether the loader keeps debug metadata.
    pub fn with_preserve_debuggability(mut self, enabled: bool) -> Self {
        self.preserve_debuggability = enabled;
        self
    }

    /// Overrides the per-byte price of persisting the object graph.
    pub fn with_write_price_per_byte(mut self, price: u64) -> Self {
        self.write_price_per_byte = price;
        self
    }

    /// Overrides the maximum serialized object graph size.
    pub fn with_max_graph_size(mut self, max_graph_size: usize) -> Self {
        self.max_graph_size = max_graph_size;
        self
    }

    /// The largest object graph a deployment may persist.
    pub const fn graph_size_bound(&self) -> usize {
        if self.max_graph_size < constants::MAX_GRAPH_SIZE {
            self.max_graph_size
        } else {
            constants::MAX_GRAPH_SIZE
        }
    }

    /// Energy charged for persisting `graph_len` bytes.
    pub const fn graph_write_cost(&self, graph_len: usize) -> u64 {
        (graph_len as u64).saturating_mul(self.write_price_per_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_storage_constants() {
        let config = DeployConfig::default();
        assert!(!config.enable_verbose_contract_errors);
        assert!(!config.enable_context_println);
        assert!(!config.preserve_debuggability);
        assert_eq!(config.write_price_per_byte, constants::WRITE_PRICE_PER_BYTE);
        assert_eq!(config.max_graph_size, constants::MAX_GRAPH_SIZE);
    }

    #[test]
    fn test_graph_write_cost_saturates() {
        let config = DeployConfig::default().with_write_price_per_byte(u64::MAX);
        assert_eq!(config.graph_write_cost(0), 0);
        assert_eq!(config.graph_write_cost(2), u64::MAX);
        let config = DeployConfig::default().with_write_price_per_byte(5);
        assert_eq!(config.graph_write_cost(200), 1000);
    }

    #[test]
    fn test_graph_size_bound_never_exceeds_hard_limit() {
        let config = DeployConfig::default().with_max_graph_size(64);
        assert_eq!(config.graph_size_bound(), 64);
        let config = DeployConfig::default().with_max_graph_size(constants::MAX_GRAPH_SIZE * 20);
        assert_eq!(config.graph_size_bound(), constants::MAX_GRAPH_SIZE);
    }
}
