pub mod business;
pub mod listing;
pub mod result_set;

pub use business::*;
pub use listing::*;
pub use result_set::*;
