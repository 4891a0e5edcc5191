pub mod clients;
pub mod config;
pub mod services;

pub use clients::RoutineSource;
pub use clients::routines::RoutinesClient;
pub use config::Config;
