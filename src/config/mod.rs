// ==========================================
// BOM 助手 - 配置层
// ==========================================

pub mod config_manager;
pub mod engine_config;
pub mod engine_config_trait;
pub mod error;

pub use config_manager::ConfigManager;
pub use engine_config::{config_keys, EngineConfig, FormatPalette};
pub use engine_config_trait::EngineConfigReader;
pub use error::{ConfigError, ConfigResult};
