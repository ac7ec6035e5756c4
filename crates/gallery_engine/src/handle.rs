use std::sync::mpsc;
use std::thread;

use gallery_core::EngagementSnapshot;

use crate::service::{LedgerService, ServiceError};

enum LedgerCommand {
    View {
        id: String,
        username: Option<String>,
        reply: mpsc::Sender<Result<EngagementSnapshot, ServiceError>>,
    },
    ToggleHeart {
        id: String,
        username: Option<String>,
        reply: mpsc::Sender<Result<EngagementSnapshot, ServiceError>>,
    },
    Query {
        id: String,
        username: Option<String>,
        reply: mpsc::Sender<EngagementSnapshot>,
    },
    ResetAll {
        ids: Vec<String>,
        reply: mpsc::Sender<Result<(), ServiceError>>,
    },
}

/// Single-writer front for [`LedgerService`].
///
/// All commands funnel through one worker thread, so concurrent callers
/// cannot interleave inside a read-modify-write: two simultaneous heart
/// toggles for the same id serialize instead of losing one update. Clone
/// the handle freely; every clone feeds the same worker.
#[derive(Clone)]
pub struct LedgerHandle {
    cmd_tx: mpsc::Sender<LedgerCommand>,
}

impl LedgerHandle {
    pub fn new(mut service: LedgerService) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&mut service, command);
            }
        });

        Self { cmd_tx }
    }

    pub fn view(
        &self,
        id: &str,
        username: Option<&str>,
    ) -> Result<EngagementSnapshot, ServiceError> {
        let (reply, rx) = mpsc::channel();
        let _ = self.cmd_tx.send(LedgerCommand::View {
            id: id.to_string(),
            username: username.map(str::to_string),
            reply,
        });
        rx.recv().map_err(|_| ServiceError::Unavailable)?
    }

    pub fn toggle_heart(
        &self,
        id: &str,
        username: Option<&str>,
    ) -> Result<EngagementSnapshot, ServiceError> {
        let (reply, rx) = mpsc::channel();
        let _ = self.cmd_tx.send(LedgerCommand::ToggleHeart {
            id: id.to_string(),
            username: username.map(str::to_string),
            reply,
        });
        rx.recv().map_err(|_| ServiceError::Unavailable)?
    }

    pub fn query(
        &self,
        id: &str,
        username: Option<&str>,
    ) -> Result<EngagementSnapshot, ServiceError> {
        let (reply, rx) = mpsc::channel();
        let _ = self.cmd_tx.send(LedgerCommand::Query {
            id: id.to_string(),
            username: username.map(str::to_string),
            reply,
        });
        rx.recv().map_err(|_| ServiceError::Unavailable)
    }

    pub fn reset_all(&self, ids: Vec<String>) -> Result<(), ServiceError> {
        let (reply, rx) = mpsc::channel();
        let _ = self.cmd_tx.send(LedgerCommand::ResetAll { ids, reply });
        rx.recv().map_err(|_| ServiceError::Unavailable)?
    }
}

fn handle_command(service: &mut LedgerService, command: LedgerCommand) {
    match command {
        LedgerCommand::View { id, username, reply } => {
            let _ = reply.send(service.view(&id, username.as_deref()));
        }
        LedgerCommand::ToggleHeart { id, username, reply } => {
            let _ = reply.send(service.toggle_heart(&id, username.as_deref()));
        }
        LedgerCommand::Query { id, username, reply } => {
            let _ = reply.send(service.query(&id, username.as_deref()));
        }
        LedgerCommand::ResetAll { ids, reply } => {
            let _ = reply.send(service.reset_all(&ids));
        }
    }
}
