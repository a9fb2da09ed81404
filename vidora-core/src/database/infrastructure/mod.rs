//! Infrastructure adapters implementing the database ports.

pub mod postgres;
