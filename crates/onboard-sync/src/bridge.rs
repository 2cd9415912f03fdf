use crate::engine::{EngineState, SyncEngine};
use crate::profile::OnboardingProfile;
use onboard_core::checklist::ChecklistItem;
use onboard_core::{progress, User};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

// ---------------------------------------------------------------------------
// ChatSnapshot
// ---------------------------------------------------------------------------

/// Read-only projection of the onboarding state for the chat widget:
/// who is signed in, their tasks, and how far along they are. Purely
/// derived — the widget never writes back through this.
#[derive(Debug, Clone, Default)]
pub struct ChatSnapshot {
    pub current_user: Option<User>,
    pub tasks: Vec<ChecklistItem>,
    pub completed_count: usize,
    pub total_count: usize,
    pub progress_percentage: u8,
}

impl ChatSnapshot {
    fn from_state(state: &EngineState<onboard_core::OnboardingChecklist>) -> Self {
        let tasks = state
            .loaded
            .as_ref()
            .map(|l| l.aggregate.items.clone())
            .unwrap_or_default();
        let completed_count = tasks.iter().filter(|t| t.completed).count();
        let total_count = tasks.len();
        Self {
            current_user: state.user.clone(),
            progress_percentage: progress::percentage(completed_count, total_count),
            tasks,
            completed_count,
            total_count,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatBridge
// ---------------------------------------------------------------------------

/// Bridges the onboarding sync engine to the chat widget: a snapshot on
/// demand, plus a stream of snapshots for live updates.
pub struct ChatBridge {
    rx: watch::Receiver<EngineState<onboard_core::OnboardingChecklist>>,
}

impl ChatBridge {
    pub fn new(engine: &SyncEngine<OnboardingProfile>) -> Self {
        Self {
            rx: engine.subscribe(),
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot::from_state(&self.rx.borrow())
    }

    /// Wait for the next engine state change; `None` once the engine is
    /// dropped.
    pub async fn changed(&mut self) -> Option<ChatSnapshot> {
        self.rx.changed().await.ok()?;
        Some(ChatSnapshot::from_state(&self.rx.borrow()))
    }

    /// Stream of snapshots, starting with the current state.
    pub fn updates(self) -> impl Stream<Item = ChatSnapshot> {
        WatchStream::new(self.rx).map(|state| ChatSnapshot::from_state(&state))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
