//! Shared helpers

pub mod encoding;
pub mod hashing;
pub mod paths;

pub use encoding::{read_text_best_effort, DecodedText};
pub use hashing::stable_index;
pub use paths::{join_posix_normalized, normalize_path, posix_parent, relative_posix, resolve_under};
