pub mod logging;
pub mod patterns;
pub mod shell;
