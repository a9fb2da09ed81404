pub mod pagination;
pub mod responses;

pub use pagination::{Page, PageRequest};
pub use responses::{ApiErrorResponse, ApiResponse, Empty};
