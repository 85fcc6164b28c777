use crate::PortfolioSnapshot;
use tracing::error;

const BUNDLED_PORTFOLIO: &str = include_str!("../data/portfolio.json");

impl PortfolioSnapshot {
    /// The snapshot shipped with the crate: every static section filled in
    /// and a couple of sample blogs so nothing renders empty before the
    /// network answers.
    #[must_use]
    pub fn bundled() -> Self {
        serde_json::from_str(BUNDLED_PORTFOLIO).unwrap_or_else(|error| {
            error!(%error, "bundled portfolio data is malformed");
            Self::default()
        })
    }
}
