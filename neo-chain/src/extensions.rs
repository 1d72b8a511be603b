//! Extensions hooked into block persistence.
//!
//! A [`CommitHandler`] sees every block twice: while its state changes are
//! still pending in the block snapshot (`on_committing`) and after they hit
//! the store (`on_committed`). Failures are routed through a fixed dispatch
//! table keyed by the error kind and the handler's exception policy.

use crate::error::{ChainError, ChainResult};
use neo_config::UnhandledExceptionPolicy;
use neo_core::network::payloads::Block;
use neo_core::persistence::DataCache;
use neo_core::smart_contract::ApplicationExecuted;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

/// Failure reported by a commit handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The handler wants to be switched off. Never stops the node.
    #[error("handler disabled itself: {0}")]
    Disable(String),

    /// The handler failed. Routed by its exception policy.
    #[error("handler failed: {0}")]
    Fault(String),
}

/// Observer of block persistence.
pub trait CommitHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Policy for [`HookError::Fault`]. `None` uses the registry default.
    fn exception_policy(&self) -> Option<UnhandledExceptionPolicy> {
        None
    }

    /// Called before the block snapshot is committed.
    fn on_committing(
        &self,
        _block: &Block,
        _snapshot: &DataCache,
        _executed: &[ApplicationExecuted],
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Called after the block snapshot is committed.
    fn on_committed(&self, _block: &Block) -> Result<(), HookError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookAction {
    Continue,
    StopHandler,
    AbortNode,
}

fn dispatch(error: &HookError, policy: UnhandledExceptionPolicy) -> HookAction {
    match (error, policy) {
        (HookError::Disable(_), _) => HookAction::StopHandler,
        (HookError::Fault(_), UnhandledExceptionPolicy::StopNode) => HookAction::AbortNode,
        (HookError::Fault(_), UnhandledExceptionPolicy::StopPlugin) => HookAction::StopHandler,
        (HookError::Fault(_), UnhandledExceptionPolicy::Ignore) => HookAction::Continue,
    }
}

struct Registered {
    handler: Arc<dyn CommitHandler>,
    stopped: bool,
}

/// Registry of commit handlers owned by one ledger actor.
pub struct CommitHandlers {
    handlers: Vec<Registered>,
    default_policy: UnhandledExceptionPolicy,
}

impl Default for CommitHandlers {
    fn default() -> Self {
        Self::new(UnhandledExceptionPolicy::default())
    }
}

impl CommitHandlers {
    pub fn new(default_policy: UnhandledExceptionPolicy) -> Self {
        Self {
            handlers: Vec::new(),
            default_policy,
        }
    }

    pub fn register(&mut self, handler: Arc<dyn CommitHandler>) {
        self.handlers.push(Registered {
            handler,
            stopped: false,
        });
    }

    /// Builder form of [`CommitHandlers::register`].
    pub fn with(mut self, handler: Arc<dyn CommitHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Whether the handler called `name` has been switched off.
    pub fn is_stopped(&self, name: &str) -> bool {
        self.handlers
            .iter()
            .any(|entry| entry.stopped && entry.handler.name() == name)
    }

    pub(crate) fn invoke_committing(
        &mut self,
        block: &Block,
        snapshot: &DataCache,
        executed: &[ApplicationExecuted],
    ) -> ChainResult<()> {
        self.invoke(|handler| handler.on_committing(block, snapshot, executed))
    }

    pub(crate) fn invoke_committed(&mut self, block: &Block) -> ChainResult<()> {
        self.invoke(|handler| handler.on_committed(block))
    }

    fn invoke<F>(&mut self, call: F) -> ChainResult<()>
    where
        F: Fn(&dyn CommitHandler) -> Result<(), HookError>,
    {
        let default_policy = self.default_policy;
        for entry in self.handlers.iter_mut().filter(|entry| !entry.stopped) {
            let Err(hook_error) = call(entry.handler.as_ref()) else {
                continue;
            };
            let name = entry.handler.name().to_string();
            let policy = entry.handler.exception_policy().unwrap_or(default_policy);
            match dispatch(&hook_error, policy) {
                HookAction::Continue => {
                    warn!(target: "neo", handler = %name, error = %hook_error, "commit handler failed; ignoring");
                }
                HookAction::StopHandler => {
                    warn!(target: "neo", handler = %name, error = %hook_error, "commit handler stopped");
                    entry.stopped = true;
                }
                HookAction::AbortNode => {
                    error!(target: "neo", handler = %name, error = %hook_error, "commit handler aborted the node");
                    return Err(ChainError::ExtensionAborted {
                        name,
                        reason: hook_error.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing {
        name: &'static str,
        policy: Option<UnhandledExceptionPolicy>,
        error: HookError,
        calls: AtomicUsize,
    }

    impl Failing {
        fn new(name: &'static str, policy: Option<UnhandledExceptionPolicy>, error: HookError) -> Arc<Self> {
            Arc::new(Self {
                name,
                policy,
                error,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl CommitHandler for Failing {
        fn name(&self) -> &str {
            self.name
        }

        fn exception_policy(&self) -> Option<UnhandledExceptionPolicy> {
            self.policy
        }

        fn on_committed(&self, _block: &Block) -> Result<(), HookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }
    }

    #[test]
    fn dispatch_table() {
        use UnhandledExceptionPolicy::*;
        let disable = HookError::Disable("done".into());
        let fault = HookError::Fault("io".into());
        for policy in [Ignore, StopPlugin, StopNode] {
            assert_eq!(dispatch(&disable, policy), HookAction::StopHandler);
        }
        assert_eq!(dispatch(&fault, Ignore), HookAction::Continue);
        assert_eq!(dispatch(&fault, StopPlugin), HookAction::StopHandler);
        assert_eq!(dispatch(&fault, StopNode), HookAction::AbortNode);
    }

    #[test]
    fn stopped_handlers_are_skipped() {
        let handler = Failing::new("indexer", None, HookError::Fault("disk full".into()));
        let mut handlers = CommitHandlers::default().with(handler.clone());
        let block = Block::default();

        assert!(handlers.invoke_committed(&block).is_ok());
        assert!(handlers.is_stopped("indexer"));
        assert!(handlers.invoke_committed(&block).is_ok());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ignore_policy_keeps_calling() {
        let handler = Failing::new(
            "metrics",
            Some(UnhandledExceptionPolicy::Ignore),
            HookError::Fault("timeout".into()),
        );
        let mut handlers = CommitHandlers::default().with(handler.clone());
        let block = Block::default();

        handlers.invoke_committed(&block).unwrap();
        handlers.invoke_committed(&block).unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
        assert!(!handlers.is_stopped("metrics"));
    }

    #[test]
    fn stop_node_policy_aborts() {
        let handler = Failing::new("state-root", None, HookError::Fault("mismatch".into()));
        let mut handlers =
            CommitHandlers::new(UnhandledExceptionPolicy::StopNode).with(handler);

        let err = handlers.invoke_committed(&Block::default()).unwrap_err();
        assert!(matches!(err, ChainError::ExtensionAborted { ref name, .. } if name == "state-root"));
    }

    #[test]
    fn disable_wins_over_stop_node() {
        let handler = Failing::new(
            "oracle",
            Some(UnhandledExceptionPolicy::StopNode),
            HookError::Disable("not configured".into()),
        );
        let mut handlers = CommitHandlers::default().with(handler);

        assert!(handlers.invoke_committed(&Block::default()).is_ok());
        assert!(handlers.is_stopped("oracle"));
    }
}
