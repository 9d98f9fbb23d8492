pub mod connectors;
pub mod models;
pub mod scheduler;
pub mod sync;
