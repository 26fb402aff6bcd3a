use std::sync::{Arc, Mutex};

use resticon::engine::{BackupArgs, BackupEngine, EngineFuture};
use resticon::errors::ResticonError;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Backup(BackupArgs),
    Check,
    Snapshots,
}

/// A fake engine that:
/// - records every call
/// - answers with a fixed text, or with an engine error when `failing`.
#[derive(Debug, Clone)]
pub struct FakeEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    reply: String,
    failing: bool,
}

impl FakeEngine {
    pub fn new(reply: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: reply.to_string(),
            failing: false,
        }
    }

    /// Every call fails with `ResticonError::Engine(reply)`.
    pub fn failing(reply: &str) -> Self {
        Self {
            failing: true,
            ..Self::new(reply)
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: EngineCall) -> EngineFuture<'_> {
        self.calls.lock().unwrap().push(call);
        let reply = self.reply.clone();
        let failing = self.failing;
        Box::pin(async move {
            if failing {
                Err(ResticonError::Engine(reply))
            } else {
                Ok(reply)
            }
        })
    }
}

impl BackupEngine for FakeEngine {
    fn backup(&self, args: BackupArgs) -> EngineFuture<'_> {
        self.answer(EngineCall::Backup(args))
    }

    fn check(&self) -> EngineFuture<'_> {
        self.answer(EngineCall::Check)
    }

    fn snapshots(&self) -> EngineFuture<'_> {
        self.answer(EngineCall::Snapshots)
    }
}
