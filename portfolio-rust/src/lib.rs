pub mod api;
mod context;
mod defaults;
mod errors;
mod store;
pub mod tenure;
pub mod theme;
mod types;

pub use api::{BlogsApi, HttpBlogsApi};
pub use context::PortfolioContext;
pub use errors::{PortfolioError, PortfolioResult};
pub use store::PortfolioStore;
pub use tenure::format_tenure;
pub use theme::{ThemeMode, ThemePreference};
pub use types::*;
