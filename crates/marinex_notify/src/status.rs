//! Launch-queue status values and their human-facing labels.

/// A launch queue entry status. Unknown raw values are carried verbatim so a
/// newly added store status still produces a sensible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStatus {
    Pending,
    InProgress,
    InWater,
    Completed,
    Cancelled,
    Other(String),
}

impl QueueStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "in_progress" => Self::InProgress,
            "in_water" => Self::InWater,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    /// Portuguese label shown in the notification body. An unknown non-empty
    /// status is shown as-is; an empty one falls back to "Atualizado".
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pendente",
            Self::InProgress => "Em andamento",
            Self::InWater => "Na água",
            Self::Completed => "Concluído",
            Self::Cancelled => "Cancelado",
            Self::Other(raw) if raw.is_empty() => "Atualizado",
            Self::Other(raw) => raw,
        }
    }
}
