pub mod error;
pub mod logging;
pub mod result;
pub mod template;

pub use error::*;
pub use logging::init_tracing;
pub use result::*;
pub use template::*;
