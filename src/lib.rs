pub mod attempt;
pub mod classify;
pub mod completion;
pub mod config;
pub mod parsers;
pub mod prober;
pub mod protocols;
pub mod status;
pub mod tracing;
pub mod transport;

pub use prober::{DEFAULT_PORT, DEFAULT_TIMEOUT, ProbeError, Prober, QueryOptions, query};
pub use protocols::Dialect;
pub use status::StatusRecord;
