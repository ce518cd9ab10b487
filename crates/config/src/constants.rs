//! Default file names and environment variables

/// State file used when neither the CLI nor the config file names one
pub const DEFAULT_STATE_FILE: &str = ".fastdl";

/// Config file looked up in the working directory before the user config dir
pub const LOCAL_CONFIG_FILE: &str = "bubz2.toml";

/// Directory under the user config/data dirs
pub const APP_DIR: &str = "bubz2";

pub const ENV_LEVEL: &str = "BUBZ2_LEVEL";
pub const ENV_JOBS: &str = "BUBZ2_JOBS";
pub const ENV_COLOR: &str = "BUBZ2_COLOR";
pub const ENV_STATE: &str = "BUBZ2_STATE";
