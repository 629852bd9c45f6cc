pub mod extract;
pub mod fetch;

pub use extract::*;
pub use fetch::*;
