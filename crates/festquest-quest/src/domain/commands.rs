//! Commands for the Quest Progression context.

use festquest_core::command::Command;
use festquest_core::ids::UserId;
use uuid::Uuid;

use super::aggregates::QuestAction;

/// Command to apply a guest action to their current quest step.
#[derive(Debug, Clone)]
pub struct AdvanceQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The guest acting.
    pub user_id: UserId,
    /// The scanned code or uploaded photo.
    pub action: QuestAction,
}

impl Command for AdvanceQuest {
    fn command_type(&self) -> &'static str {
        "quest.advance"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Command to wipe a guest's quest progress (admin reset).
#[derive(Debug, Clone)]
pub struct ResetQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The guest whose progress is wiped.
    pub user_id: UserId,
}

impl Command for ResetQuest {
    fn command_type(&self) -> &'static str {
        "quest.reset"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }
}
