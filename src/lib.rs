pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod repository;
pub mod state;
pub mod stats;
pub mod storage;
pub mod validation;

pub use app::router;
pub use client::{ApiClient, ClientError, ErrorKind, UpdateMode};
pub use config::{ClientConfig, ServerConfig};
pub use models::{Action, ActionInput, ActionStats, FieldErrors};
pub use state::AppState;
pub use storage::load_data;
