//! Keeper configuration options.

/// Keeper configuration.
#[derive(Debug, Clone, Default)]
pub struct KeeperConfig {
    /// Print every emitted event to stdout.
    pub verbose: bool,
}

impl KeeperConfig {
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}
