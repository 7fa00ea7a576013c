use crate::domain_port::{StorageTx, TxManager};

/// Transaction front for the memory backend. Memory repos apply writes
/// immediately, so commit and rollback are both no-ops: a command that
/// fails between writes can leave partial state behind. The engine checks
/// its preconditions before the first write, which keeps single-process
/// tests and dev runs consistent; durability guarantees come from the
/// MySQL backend.
pub struct MemoryTxManager;

impl MemoryTxManager {
    pub fn new() -> Self {
        MemoryTxManager
    }
}

impl Default for MemoryTxManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        Ok(Box::new(MemoryTx))
    }
}

pub struct MemoryTx;

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
