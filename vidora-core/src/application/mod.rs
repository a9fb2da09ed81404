pub mod toggle;
pub mod unit_of_work;

pub use toggle::{toggle_like, toggle_subscription};
pub use unit_of_work::AppUnitOfWork;
