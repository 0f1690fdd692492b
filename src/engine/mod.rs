//! Engine module: hashing, stamps, ignore rules, formatter runner and CLI plumbing

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod ignore_filter;
pub mod progress;
pub mod runner;
pub mod stamps;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, session_for, setup_opts};
pub use hashing::{digest_from_hex, digest_to_hex, hash_file};
pub use ignore_filter::{IgnoreFilter, IgnoreRule};
pub use runner::{FailureKind, FormatterCommand, InvocationResult, run_formatter};
pub use stamps::{ChangeReason, Decision, StampStore};
pub use tools::{
    normalize_extensions, path_relative_to, path_to_key_string, resolve_executable, split_list,
};
