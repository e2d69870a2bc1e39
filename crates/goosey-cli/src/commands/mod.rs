//! CLI command implementations

pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod make;
pub(crate) mod rollback;
pub(crate) mod status;
pub(crate) mod up;
