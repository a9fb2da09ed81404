//! Storage layer: repository ports and the adapters implementing them.

pub mod infrastructure;
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod memory;
pub mod ports;

pub use infrastructure::postgres::PostgresStore;
#[cfg(feature = "test-utils")]
pub use memory::InMemoryStore;
