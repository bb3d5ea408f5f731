//! Command abstractions.

use uuid::Uuid;

use crate::ids::UserId;

/// Trait that all commands implement.
///
/// Every command in this system is issued on behalf of exactly one festival
/// guest, so the acting user travels with the command for log correlation.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The guest this command acts for.
    fn user_id(&self) -> UserId;
}
