// Gateway Port
// Read-only view of node state used by the query handlers

use crate::domain::{Address, Block, BlockSeq, BlockchainStatus, UnspentOutput};
use crate::error::Result;
use async_trait::async_trait;

/// Gateway trait
///
/// Shared by every RPC worker, so implementations must tolerate
/// concurrent calls.
///
/// Implementations:
/// - SqliteChainIndex: reads the node's chain index database
/// - MockGateway: fixed data for tests
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Current node status
    async fn status(&self) -> Result<BlockchainStatus>;

    /// The most recent `num` blocks, ascending by seq
    async fn last_blocks(&self, num: u64) -> Result<Vec<Block>>;

    /// Blocks with `start <= seq <= end`, ascending by seq
    ///
    /// # Errors
    /// - AppError::Domain(InvalidBlockRange) if `start > end`
    async fn blocks(&self, start: BlockSeq, end: BlockSeq) -> Result<Vec<Block>>;

    /// Unspent outputs owned by any of `addresses`
    async fn unspent_outputs(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::DomainError;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Mock gateway behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always return the configured data
        Success,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Wait for a permit from `MockGateway::release` before answering
        Gated,
    }

    /// Mock Gateway for testing
    pub struct MockGateway {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<AtomicUsize>,
        gate: Arc<Semaphore>,
        status: BlockchainStatus,
        blocks: Vec<Block>,
        outputs: Vec<UnspentOutput>,
    }

    impl MockGateway {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(AtomicUsize::new(0)),
                gate: Arc::new(Semaphore::new(0)),
                status: BlockchainStatus::new(0, "", Duration::ZERO),
                blocks: Vec::new(),
                outputs: Vec::new(),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn new_gated() -> Self {
            Self::new(MockBehavior::Gated)
        }

        pub fn with_status(mut self, status: BlockchainStatus) -> Self {
            self.status = status;
            self
        }

        pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
            self.blocks = blocks;
            self
        }

        pub fn with_outputs(mut self, outputs: Vec<UnspentOutput>) -> Self {
            self.outputs = outputs;
            self
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        /// Let `n` gated calls proceed
        pub fn release(&self, n: usize) {
            self.gate.add_permits(n);
        }

        /// Number of calls that have entered the gateway (including blocked ones)
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        async fn enter(&self) -> Result<()> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(AppError::Internal(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Gated => {
                    let permit = self
                        .gate
                        .acquire()
                        .await
                        .map_err(|e| AppError::Internal(e.to_string()))?;
                    permit.forget();
                    Ok(())
                }
            }
        }
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn status(&self) -> Result<BlockchainStatus> {
            self.enter().await?;
            Ok(self.status.clone())
        }

        async fn last_blocks(&self, num: u64) -> Result<Vec<Block>> {
            self.enter().await?;
            let skip = self.blocks.len().saturating_sub(num as usize);
            Ok(self.blocks[skip..].to_vec())
        }

        async fn blocks(&self, start: BlockSeq, end: BlockSeq) -> Result<Vec<Block>> {
            self.enter().await?;
            if start > end {
                return Err(DomainError::InvalidBlockRange { start, end }.into());
            }
            Ok(self
                .blocks
                .iter()
                .filter(|b| b.seq >= start && b.seq <= end)
                .cloned()
                .collect())
        }

        async fn unspent_outputs(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>> {
            self.enter().await?;
            Ok(self
                .outputs
                .iter()
                .filter(|o| addresses.contains(&o.address))
                .cloned()
                .collect())
        }
    }
}
