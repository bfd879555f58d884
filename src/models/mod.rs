pub mod common;
pub mod errors;
pub mod log_record;
pub mod snapshot;
pub mod window;
