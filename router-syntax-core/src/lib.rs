//! Target-syntax primitives used by higher-level config generators.
//!
//! Content is built as structured documents first ([`Script`] for RouterOS,
//! [`UciConfig`] for OpenWrt) and serialized in one step, so quoting rules
//! live in exactly one place per syntax.

mod comment;
pub mod script;
pub mod uci;
pub mod writer;

pub use script::{Command, Script, ScriptItem, ScriptSection};
pub use uci::{UciConfig, UciEntry, UciSection};
pub use writer::{write_dir_atomic, write_file_atomic, WriteError};
