//! CLI command modules.

pub mod address;
pub mod http;
pub mod pinglist;
pub mod sync;
