//! Wiring of configuration, logging and the blockchain actor.

use neo_chain::{
    Blockchain, BlockchainContext, BlockchainHandle, ChainError, ChainResult, CommitHandler,
    CommitHandlers,
};
use neo_config::{ConfigError, NodeConfig, ProtocolSettings};
use neo_telemetry::TelemetryError;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

/// Failures while bringing the ledger up or down.
#[derive(Debug, Error)]
pub enum SystemError {
    /// Configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The blockchain actor failed
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// The actor task panicked or was cancelled
    #[error("Ledger task did not finish cleanly: {0}")]
    Join(String),
}

/// Result type for system operations
pub type SystemResult<T> = Result<T, SystemError>;

/// A running ledger: the blockchain actor plus the configuration it was
/// started with.
pub struct LedgerSystem {
    config: NodeConfig,
    chain: BlockchainHandle,
    task: JoinHandle<ChainResult<()>>,
}

impl LedgerSystem {
    /// Installs the global subscriber described by the `[logging]` section.
    pub fn init_logging(config: &NodeConfig) -> SystemResult<()> {
        neo_telemetry::init_logging(&config.logging)?;
        Ok(())
    }

    /// Validates `config`, spawns the actor and persists or checks genesis.
    ///
    /// Handlers without their own exception policy fall back to
    /// `config.ledger.exception_policy`.
    pub async fn start(
        config: NodeConfig,
        context: BlockchainContext,
        handlers: Vec<Arc<dyn CommitHandler>>,
    ) -> SystemResult<Self> {
        config.validate()?;

        let mut extensions = CommitHandlers::new(config.ledger.exception_policy);
        for handler in handlers {
            extensions.register(handler);
        }

        let (chain, task) = Blockchain::spawn(
            config.protocol.clone(),
            config.ledger.clone(),
            context,
            extensions,
        );

        if let Err(err) = chain.initialize().await {
            // The actor exits on a fatal initialization error; surface that
            // error rather than the closed channel.
            return match task.await {
                Ok(Err(fatal)) => Err(fatal.into()),
                Ok(Ok(())) => Err(err.into()),
                Err(join) => Err(SystemError::Join(join.to_string())),
            };
        }

        info!(
            target: "neo",
            network = config.protocol.network,
            height = chain.current_height(),
            "ledger started"
        );

        Ok(Self {
            config,
            chain,
            task,
        })
    }

    /// Handle to the blockchain actor.
    pub fn blockchain(&self) -> &BlockchainHandle {
        &self.chain
    }

    /// Protocol settings the actor runs with.
    pub fn settings(&self) -> &ProtocolSettings {
        &self.config.protocol
    }

    /// Full configuration, including logging and ledger tuning.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Whether the actor task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the actor and waits for it to exit.
    ///
    /// Returns the fatal error if the actor had already stopped because of one.
    pub async fn shutdown(self) -> SystemResult<()> {
        // The actor may already be gone; its exit status is reported below.
        let _ = self.chain.shutdown().await;
        match self.task.await {
            Ok(result) => {
                result?;
                info!(target: "neo", "ledger stopped");
                Ok(())
            }
            Err(join) => Err(SystemError::Join(join.to_string())),
        }
    }
}
