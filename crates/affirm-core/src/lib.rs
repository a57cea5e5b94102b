pub mod actions;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod state;

// Re-export main types for convenience
pub use actions::Mutation;
pub use api::{AffirmationSource, AffirmationsClient};
pub use config::{CategoryEntry, Config};
pub use dashboard::{format_cell, DashboardTab};
pub use error::{ApiError, ApiResult};
pub use fetcher::{FetchCompletion, FetchIntent, FetchState, PendingFetch, RandomFetcher};
pub use model::{ActionType, AffirmationDraft, CategoryFilter, CategoryLabels, RandomAffirmation};
pub use state::{AffirmationPanel, AffirmationView, BannerKind, Feedback, PinTarget, ViewSnapshot};
