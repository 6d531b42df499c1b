pub mod eval;
pub mod init;
pub mod setup;
