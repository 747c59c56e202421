// Configuration module
// Public interface for settings and the panel catalog

mod catalog;
pub mod constants;
mod loader;
mod settings;

pub use catalog::{Catalog, CommandButton, Page};
pub use loader::{
    apply_env_overrides, config_dir, config_path, load_config, load_config_at, load_config_from,
    save_config, save_config_to, ENV_SERVER_IP, ENV_SERVER_PORT,
};
pub use settings::{CommandConfig, Config, ConnectionConfig, DiscoveryConfig};
