//! Application context, built once at startup and passed everywhere.

use std::sync::Arc;

use thiserror::Error;

use crate::cache::{CachePolicy, EntityCache};
use crate::config::{Config, ConfigError};
use crate::gateway::{AuthGateway, GatewayError, HttpGateway, UserGateway};
use crate::mutation::MutationCoordinator;
use crate::queries::UserQueries;
use crate::session::{SessionError, SessionStore};
use crate::ui::delete::DeleteDialog;
use crate::ui::drafts::DraftStore;
use crate::ui::editor::UserEditor;
use crate::ui::list::UserListView;
use crate::ui::login::LoginView;
use crate::ui::notify::Notifier;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open session: {0}")]
    Session(#[from] SessionError),

    #[error("Failed to set up API client: {0}")]
    Gateway(#[from] GatewayError),
}

/// Shared services. Cloning is cheap and shares everything.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub session: SessionStore,
    pub cache: EntityCache,
    pub auth: Arc<dyn AuthGateway>,
    pub queries: UserQueries,
    pub coordinator: MutationCoordinator,
    pub notifier: Notifier,
    pub drafts: DraftStore,
}

impl AppContext {
    /// Validates `config`, opens the persisted session, and connects the
    /// HTTP gateway.
    pub fn build(config: Config) -> Result<Self, StartupError> {
        config.validate()?;
        let session = SessionStore::open(config.storage.session_path())?;
        let gateway = Arc::new(HttpGateway::new(&config.api, session.clone())?);
        tracing::info!(base_url = %gateway.base_url(), "API client ready");
        let drafts = DraftStore::new(config.storage.drafts_dir());
        Ok(Self::with_gateways(
            config,
            session,
            gateway.clone(),
            gateway,
            drafts,
        ))
    }

    /// Wires the context around explicit gateways.
    pub fn with_gateways(
        config: Config,
        session: SessionStore,
        users: Arc<dyn UserGateway>,
        auth: Arc<dyn AuthGateway>,
        drafts: DraftStore,
    ) -> Self {
        let cache = EntityCache::new(CachePolicy::from(&config.cache));
        Self {
            queries: UserQueries::new(cache.clone(), Arc::clone(&users)),
            coordinator: MutationCoordinator::new(cache.clone(), users),
            config: Arc::new(config),
            session,
            cache,
            auth,
            notifier: Notifier::default(),
            drafts,
        }
    }

    pub fn user_list(&self) -> UserListView {
        UserListView::new(self.queries.clone())
    }

    pub fn user_editor(&self) -> UserEditor {
        UserEditor::new(
            self.queries.clone(),
            self.coordinator.clone(),
            self.notifier.clone(),
            self.drafts.clone(),
        )
    }

    pub fn delete_dialog(&self) -> DeleteDialog {
        DeleteDialog::new(self.coordinator.clone(), self.notifier.clone())
    }

    pub fn login_view(&self) -> LoginView {
        LoginView::new(
            Arc::clone(&self.auth),
            self.session.clone(),
            self.cache.clone(),
            self.notifier.clone(),
        )
    }
}
