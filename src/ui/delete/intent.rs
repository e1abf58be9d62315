use crate::gateway::GatewayError;
use crate::model::UserId;
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum DeleteIntent {
    /// Ask before deleting `id`; `name` is shown in the prompt.
    Request { id: UserId, name: String },
    Cancel,
    Confirm,
    Succeeded,
    Failed { error: GatewayError },
}

impl Intent for DeleteIntent {}
