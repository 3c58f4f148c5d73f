use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use plate_auth::{
    AuthBackend, HostedAuth, MemoryQueryCache, ProfileSource, RestClient, RestProfileSource,
    SessionManager, SessionOptions, UnconfiguredAuth, refresh,
};
use plate_config::PlateConfig;
use plate_core::SessionSnapshot;
use tokio::task::JoinHandle;

/// Extra time allowed for a profile lookup after the settling delay.
const PROFILE_WAIT: Duration = Duration::from_secs(5);

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: PlateConfig,
    pub manager: SessionManager,
    /// Present only when the hosted backend is configured.
    pub hosted: Option<Arc<HostedAuth>>,
    pub cache: Arc<MemoryQueryCache>,
    refresher: Option<JoinHandle<()>>,
}

impl AppContext {
    /// Build the session layer for the configured app and wait until it has
    /// settled on signed-in or anonymous.
    pub async fn init(config: PlateConfig) -> anyhow::Result<Self> {
        let hosted = config
            .backend
            .is_configured()
            .then(|| Arc::new(HostedAuth::from_config(&config)));

        let auth: Arc<dyn AuthBackend> = match &hosted {
            Some(hosted) => hosted.clone(),
            None => Arc::new(UnconfiguredAuth::new()),
        };

        let source: Arc<dyn ProfileSource> = Arc::new(RestProfileSource::new(
            RestClient::new(&config.backend),
            config.app.kind,
            config.app.profile_table(),
        ));
        let cache = Arc::new(MemoryQueryCache::new());

        let manager = SessionManager::new(
            auth,
            source,
            cache.clone(),
            SessionOptions::from_config(&config),
        );
        manager.mount();

        let refresher = match &hosted {
            Some(hosted) if config.session.auto_refresh => Some(refresh::spawn_auto_refresh(
                hosted.clone(),
                config.session.refresh_margin_secs,
            )),
            _ => None,
        };

        let ctx = Self {
            config,
            manager,
            hosted,
            cache,
            refresher,
        };
        ctx.settled().await.context("session layer did not settle")?;
        Ok(ctx)
    }

    /// Wait for the first non-loading snapshot.
    pub async fn settled(&self) -> anyhow::Result<SessionSnapshot> {
        let timeout = self.config.session.loading_timeout() * 2;
        tokio::time::timeout(timeout, self.manager.wait_for(|s| !s.is_loading()))
            .await
            .map_err(|_| anyhow::anyhow!("still loading after {timeout:?}"))
    }

    /// Wait until the snapshot carries `identity_id`.
    pub async fn await_identity(
        &self,
        identity_id: &str,
        timeout: Duration,
    ) -> anyhow::Result<SessionSnapshot> {
        tokio::time::timeout(
            timeout,
            self.manager
                .wait_for(|s| s.identity_id() == Some(identity_id)),
        )
        .await
        .map_err(|_| anyhow::anyhow!("identity {identity_id} not published after {timeout:?}"))
    }

    /// Wait for the current identity's profile lookup to finish, found or
    /// not. Gives up after the settling delay plus [`PROFILE_WAIT`] and
    /// returns whatever is published then.
    pub async fn resolved(&self) -> SessionSnapshot {
        let snapshot = self.manager.snapshot();
        if !snapshot.is_profile_pending() {
            return snapshot;
        }
        let deadline = self.config.session.settle_delay() + PROFILE_WAIT;
        tokio::time::timeout(
            deadline,
            self.manager.wait_for(|s| !s.is_profile_pending()),
        )
        .await
        .unwrap_or_else(|_| self.manager.snapshot())
    }

    pub fn shutdown(self) {
        if let Some(refresher) = self.refresher {
            refresher.abort();
        }
        self.manager.unmount();
    }
}
