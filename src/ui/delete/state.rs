use crate::gateway::GatewayError;
use crate::model::UserId;
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DeleteDialogState {
    #[default]
    Hidden,
    Confirming {
        id: UserId,
        name: String,
    },
    Deleting {
        id: UserId,
        name: String,
    },
    Failed {
        id: UserId,
        name: String,
        error: GatewayError,
    },
}

impl UiState for DeleteDialogState {}

impl DeleteDialogState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn target(&self) -> Option<&UserId> {
        match self {
            Self::Hidden => None,
            Self::Confirming { id, .. } | Self::Deleting { id, .. } | Self::Failed { id, .. } => {
                Some(id)
            }
        }
    }

    /// Confirming now would start (or restart) the delete.
    pub fn can_confirm(&self) -> bool {
        matches!(self, Self::Confirming { .. } | Self::Failed { .. })
    }
}
