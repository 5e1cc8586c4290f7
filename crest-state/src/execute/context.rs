//! Execution context for transaction processing.

/// Execution context carrying block-level information.
///
/// This context is passed to all transaction handlers and provides the
/// block timestamp and other block-level metadata needed for validation.
/// Transfer times and timeline resolution both use `timestamp`.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// Current block timestamp (unix seconds).
    pub timestamp: u64,

    /// Current block height.
    pub block_height: u64,
}

impl ExecutionContext {
    /// Create a new execution context.
    pub fn new(timestamp: u64, block_height: u64) -> Self {
        Self {
            timestamp,
            block_height,
        }
    }

    /// Create an execution context with a specific timestamp.
    pub fn with_timestamp(timestamp: u64) -> Self {
        Self {
            timestamp,
            block_height: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_context_new() {
        let ctx = ExecutionContext::new(1700000000, 100);
        assert_eq!(ctx.timestamp, 1700000000);
        assert_eq!(ctx.block_height, 100);
    }

    #[test]
    fn test_execution_context_with_timestamp() {
        let ctx = ExecutionContext::with_timestamp(42);
        assert_eq!(ctx.timestamp, 42);
        assert_eq!(ctx.block_height, 0);
    }
}
