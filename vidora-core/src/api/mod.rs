//! API-facing facade (route constants).

pub mod routes;
