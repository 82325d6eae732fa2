pub mod background;
pub mod job;
pub mod response;

pub use background::*;
pub use job::*;
pub use response::*;
