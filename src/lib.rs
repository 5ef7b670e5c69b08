pub mod backend;
pub mod chain;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod seed;
pub mod service;
pub mod state;
pub mod storage;
pub mod util;

pub use state::AppState;
