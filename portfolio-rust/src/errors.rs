use portfolio_session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Data was requested from a context that was never given a provider.
    #[error("{0} must be used within its provider")]
    NotInitialized(&'static str),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

pub type PortfolioResult<T> = Result<T, PortfolioError>;
