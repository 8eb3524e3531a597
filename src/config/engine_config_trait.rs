// ==========================================
// BOM 助手 - 引擎配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 实现者: ConfigManager（config_kv 表），EngineConfig（内存配置）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::engine_config::{EngineConfig, FormatPalette};
use crate::config::error::ConfigResult;
use async_trait::async_trait;

#[async_trait]
pub trait EngineConfigReader: Send + Sync {
    /// 表头哨兵标签
    ///
    /// # 默认值
    /// - "designators"
    async fn get_header_sentinel(&self) -> ConfigResult<String>;

    /// 只读列前缀
    ///
    /// # 默认值
    /// - '_'
    async fn get_read_only_marker(&self) -> ConfigResult<char>;

    /// 是否应用背景色/字体色反馈
    async fn is_formatting_enabled(&self) -> ConfigResult<bool>;

    /// 配色方案
    async fn get_palette(&self) -> ConfigResult<FormatPalette>;

    /// 回填默认勾选字段
    async fn get_default_import_fields(&self) -> ConfigResult<Vec<String>>;

    /// 不参与勾选的字段
    ///
    /// # 默认值
    /// - ["attributes"]
    async fn get_excluded_import_fields(&self) -> ConfigResult<Vec<String>>;

    /// 读取完整引擎配置
    async fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        Ok(EngineConfig {
            header_sentinel: self.get_header_sentinel().await?,
            read_only_marker: self.get_read_only_marker().await?,
            apply_formatting: self.is_formatting_enabled().await?,
            palette: self.get_palette().await?,
            default_import_fields: self.get_default_import_fields().await?,
            excluded_import_fields: self.get_excluded_import_fields().await?,
        })
    }
}

// 内存配置直接作为配置来源
#[async_trait]
impl EngineConfigReader for EngineConfig {
    async fn get_header_sentinel(&self) -> ConfigResult<String> {
        Ok(self.header_sentinel.clone())
    }

    async fn get_read_only_marker(&self) -> ConfigResult<char> {
        Ok(self.read_only_marker)
    }

    async fn is_formatting_enabled(&self) -> ConfigResult<bool> {
        Ok(self.apply_formatting)
    }

    async fn get_palette(&self) -> ConfigResult<FormatPalette> {
        Ok(self.palette.clone())
    }

    async fn get_default_import_fields(&self) -> ConfigResult<Vec<String>> {
        Ok(self.default_import_fields.clone())
    }

    async fn get_excluded_import_fields(&self) -> ConfigResult<Vec<String>> {
        Ok(self.excluded_import_fields.clone())
    }

    async fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        Ok(self.clone())
    }
}
