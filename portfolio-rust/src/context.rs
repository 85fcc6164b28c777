use crate::{PortfolioError, PortfolioResult, PortfolioSnapshot, PortfolioStore};
use portfolio_session::{AuthState, KeyValueStore, SessionManager, SessionOptions};
use std::sync::Arc;

/// The scope the rendering layer reads from. Each accessor fails with
/// [`PortfolioError::NotInitialized`] if its provider was never installed,
/// which is a wiring mistake rather than a runtime condition.
#[derive(Clone, Default)]
pub struct PortfolioContext {
    session: Option<Arc<SessionManager>>,
    portfolio: Option<Arc<PortfolioStore>>,
}

impl PortfolioContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire a session manager and a portfolio store over HTTP, sharing one
    /// session-scoped cache.
    pub fn from_options(
        options: SessionOptions,
        cache: Arc<dyn KeyValueStore>,
    ) -> PortfolioResult<Self> {
        let portfolio = PortfolioStore::from_options(&options, cache.clone())?;
        let session = SessionManager::from_options(options, cache)?;
        Ok(Self::new()
            .with_session(Arc::new(session))
            .with_portfolio(Arc::new(portfolio)))
    }

    #[must_use]
    pub fn with_session(mut self, session: Arc<SessionManager>) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn with_portfolio(mut self, portfolio: Arc<PortfolioStore>) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    pub fn session(&self) -> PortfolioResult<&Arc<SessionManager>> {
        self.session
            .as_ref()
            .ok_or(PortfolioError::NotInitialized("auth_state"))
    }

    pub fn portfolio(&self) -> PortfolioResult<&Arc<PortfolioStore>> {
        self.portfolio
            .as_ref()
            .ok_or(PortfolioError::NotInitialized("portfolio_data"))
    }

    pub fn auth_state(&self) -> PortfolioResult<AuthState> {
        Ok(self.session()?.state())
    }

    pub fn portfolio_data(&self) -> PortfolioResult<Arc<PortfolioSnapshot>> {
        Ok(self.portfolio()?.snapshot())
    }

    /// Run the handshake and let the store follow its signal until both
    /// settle. Returns the session outcome.
    pub async fn start(&self) -> PortfolioResult<AuthState> {
        let session = self.session()?;
        let portfolio = self.portfolio()?;
        let signal = session.subscribe();
        let (outcome, ()) = tokio::join!(session.run(), portfolio.follow(signal));
        Ok(outcome)
    }
}
