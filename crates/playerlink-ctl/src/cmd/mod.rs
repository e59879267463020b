//! CLI command modules.

pub mod acl;
pub mod http;
pub mod status;
