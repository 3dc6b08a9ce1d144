//! Layered configuration resolution.
//!
//! Resolves [`Settings`] from three tiers, lowest to highest precedence:
//! 1. **Defaults** - compiled in via the `Default` impls in [`types`]
//! 2. **File** - `config.{yaml,yml,json,toml}`, searched in the supplied
//!    directory, then the working directory
//! 3. **Environment** - `SERVER_PORT`, `DATABASE_INFLUXTOKEN`, ... (the file
//!    key with dots replaced by underscores, any case)
//!
//! ## Merge Strategy
//! - Objects merge key by key; scalars and lists are replaced wholesale
//! - Keys are case-insensitive in every tier
//! - Unknown keys are ignored
//! - Values are coerced to the declared type of their key; a value that
//!   cannot be coerced fails the whole resolution

mod env;
pub mod keys;
mod loader;
mod merge;
mod types;

pub use env::env_overrides;
pub use keys::{KNOWN_KEYS, KeySpec, ValueKind};
pub use loader::{
    CONFIG_FILE_NAME, ConfigResolver, ConfigTier, Resolved, SUPPORTED_EXTENSIONS, resolve,
};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
