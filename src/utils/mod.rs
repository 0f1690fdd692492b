pub mod config;
pub mod logger;
pub mod session;
pub mod stampfmt_toml;

pub use config::*;
pub use logger::{set_verbose, setup_logging};
pub use session::SessionCache;
pub(crate) use stampfmt_toml::{apply_file_to_opts, load_stampfmt_toml};
