pub mod agent;
pub mod constants;
pub mod engine;
pub mod error;
pub mod layouts;
pub mod level;
pub mod maze;
pub mod mode;
pub mod save_store;
pub mod session;
pub mod targeting;
pub mod types;
