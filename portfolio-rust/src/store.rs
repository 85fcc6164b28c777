use crate::{
    api::{BlogsApi, HttpBlogsApi},
    Article, PortfolioResult, PortfolioSnapshot,
};
use portfolio_session::{AuthState, KeyValueStore, SessionOptions, AUTH_TOKEN_KEY};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{error, info, info_span, warn};
use tracing_futures::Instrument;

/// Holds the current portfolio snapshot and refreshes its blog list when a
/// session becomes usable.
///
/// A failed refresh is logged and otherwise ignored: the previous snapshot
/// stays visible, and there is no retry.
pub struct PortfolioStore {
    api: Arc<dyn BlogsApi>,
    cache: Arc<dyn KeyValueStore>,
    snapshot: watch::Sender<Arc<PortfolioSnapshot>>,
    last_auth_state: Mutex<AuthState>,
}

impl PortfolioStore {
    /// Create a store seeded with [`PortfolioSnapshot::bundled`].
    pub fn new(api: Arc<dyn BlogsApi>, cache: Arc<dyn KeyValueStore>) -> Self {
        Self::with_snapshot(api, cache, PortfolioSnapshot::bundled())
    }

    pub fn with_snapshot(
        api: Arc<dyn BlogsApi>,
        cache: Arc<dyn KeyValueStore>,
        snapshot: PortfolioSnapshot,
    ) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(snapshot));
        Self {
            api,
            cache,
            snapshot,
            last_auth_state: Mutex::new(AuthState::Pending),
        }
    }

    pub fn from_options(
        options: &SessionOptions,
        cache: Arc<dyn KeyValueStore>,
    ) -> PortfolioResult<Self> {
        Ok(Self::new(Arc::new(HttpBlogsApi::new(options)?), cache))
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<PortfolioSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Changes only when the blog list is replaced.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<PortfolioSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Feed the current authentication state. Blogs are fetched on the
    /// transition into `Authenticated` only; observing the same state again
    /// does nothing. Returns whether this call saw that transition.
    pub async fn observe(&self, state: AuthState) -> bool {
        let previous = {
            let mut last = self
                .last_auth_state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *last, state)
        };

        if state.is_authenticated() && !previous.is_authenticated() {
            self.refresh_blogs().await;
            true
        } else {
            false
        }
    }

    /// Observe a session signal until it settles.
    pub async fn follow(&self, mut signal: watch::Receiver<AuthState>) {
        loop {
            let state = *signal.borrow_and_update();
            self.observe(state).await;
            if state.is_terminal() || signal.changed().await.is_err() {
                break;
            }
        }
    }

    async fn refresh_blogs(&self) {
        let Some(token) = self.cache.get(AUTH_TOKEN_KEY).filter(|t| !t.is_empty()) else {
            warn!("no bearer token cached, skipping blogs fetch");
            return;
        };

        let span = info_span!("portfolio_data.fetch_blogs");
        match self.api.fetch_blogs(&token).instrument(span).await {
            Ok(response) => {
                if self.merge_blogs(response.blogs) {
                    info!("blogs refreshed");
                } else {
                    warn!("blogs response was empty, keeping current blogs");
                }
            }
            Err(error) => {
                error!(%error, "failed to fetch blogs, keeping current snapshot");
            }
        }
    }

    /// Replace `blogs` with a non-empty list; anything else keeps the current
    /// list.
    fn merge_blogs(&self, blogs: Option<Vec<Article>>) -> bool {
        match blogs {
            Some(blogs) if !blogs.is_empty() => {
                self.snapshot
                    .send_modify(|snapshot| Arc::make_mut(snapshot).blogs = blogs);
                true
            }
            _ => false,
        }
    }
}
