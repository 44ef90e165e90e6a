pub mod hk;
pub mod response;
pub mod table;

pub use hk::*;
pub use response::*;
pub use table::*;
