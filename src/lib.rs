pub mod app;
pub mod backend;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod errors;
pub mod footfall;
pub mod handlers;
pub mod models;
pub mod range;
pub mod request;
pub mod session;
pub mod slots;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
