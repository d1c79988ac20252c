//! Process settings
//!
//! Settings are merged from four layers, later layers winning:
//! 1. Built-in defaults
//! 2. Optional TOML settings file (`--settings`)
//! 3. Environment (`AWS_REGION`, `PATH_YAML`, `SSM_PM_NAMES`, ...)
//! 4. CLI flags

mod defaults;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use merge::{deep_merge, merge_layers};
pub use settings::{
    ConfigError, ConfigOrigin, ConfigSource, EntryAssignment, Settings, ENV_ASSIGNMENT,
    ENV_PARAMETER_NAMES, ENV_REGION, ENV_TEMPLATES_PATH, ENV_TIMEOUT_SECONDS,
};
