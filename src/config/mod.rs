//! Configuration loading and merging
//!
//! Settings come from CLI flags, an optional config file and built-in
//! defaults, in that order of precedence.

pub mod loader;
pub mod merge;

pub use loader::{load_config, FileConfig, ProcessFileConfig, SyncFileConfig};
pub use merge::{
    apply_process_settings, process_after_sync, resolve_process, resolve_sync, sync_site_source,
    ProcessOverrides, SyncOverrides,
};
