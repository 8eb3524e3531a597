// ==========================================
// BOM 助手 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::engine_config::{config_keys, EngineConfig, FormatPalette};
use crate::config::engine_config_trait::EngineConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::db::{open_config_db, open_config_db_in_memory, prepare_config_connection};
use crate::domain::types::Color;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    defaults: EngineConfig,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_config_db(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            defaults: EngineConfig::default(),
        })
    }

    /// 内存库（测试与临时会话）
    pub fn in_memory() -> ConfigResult<Self> {
        let conn = open_config_db_in_memory()?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            defaults: EngineConfig::default(),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA 并建表（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            prepare_config_connection(&guard)?;
        }

        Ok(Self {
            conn,
            defaults: EngineConfig::default(),
        })
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_color(&self, key: &str, default: &Color) -> ConfigResult<Color> {
        let value = self.get_config_or_default(key, default.as_str())?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            warn_invalid(key, &value, "颜色配置为空，使用默认值");
            return Ok(default.clone());
        }
        Ok(Color::new(trimmed))
    }

    fn get_field_list(&self, key: &str, default: &[String]) -> ConfigResult<Vec<String>> {
        let raw = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default.to_vec()),
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => Ok(list),
            Err(_) => {
                warn_invalid(key, &raw, "字段列表配置格式错误，使用默认值");
                Ok(default.to_vec())
            }
        }
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::debug!(config_key = key, "配置已写入");
        Ok(())
    }

    /// 将完整引擎配置写入 config_kv
    pub fn save_engine_config(&self, config: &EngineConfig) -> ConfigResult<()> {
        let palette = &config.palette;
        let entries: Vec<(&str, String)> = vec![
            (config_keys::HEADER_SENTINEL, config.header_sentinel.clone()),
            (config_keys::READ_ONLY_MARKER, config.read_only_marker.to_string()),
            (config_keys::APPLY_FORMATTING, config.apply_formatting.to_string()),
            (config_keys::HEADER_FILL, palette.header_fill.to_string()),
            (config_keys::HEADER_FONT, palette.header_font.to_string()),
            (config_keys::READ_ONLY_FILL, palette.read_only_fill.to_string()),
            (config_keys::MATCHED_FILL, palette.matched_fill.to_string()),
            (config_keys::EXPORT_DATA_FILL, palette.export_data_fill.to_string()),
            (config_keys::DEFAULT_FONT, palette.default_font.to_string()),
            (
                config_keys::DEFAULT_IMPORT_FIELDS,
                serde_json::to_string(&config.default_import_fields)?,
            ),
            (
                config_keys::EXCLUDED_IMPORT_FIELDS,
                serde_json::to_string(&config.excluded_import_fields)?,
            ),
        ];

        for (key, value) in entries {
            self.set_config_value(key, &value)?;
        }
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 返回
    /// - Ok(String): 以 key 排序的 JSON 对象
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }

        tx.commit()?;
        tracing::info!(restored = count, "配置快照已恢复");
        Ok(count)
    }
}

fn warn_invalid(key: &str, raw: &str, message: &str) {
    tracing::warn!(config_key = key, raw_value = %raw, "{}", message);
}

// ==========================================
// EngineConfigReader Trait 实现
// ==========================================
#[async_trait]
impl EngineConfigReader for ConfigManager {
    async fn get_header_sentinel(&self) -> ConfigResult<String> {
        let value =
            self.get_config_or_default(config_keys::HEADER_SENTINEL, &self.defaults.header_sentinel)?;
        if value.trim().is_empty() {
            warn_invalid(config_keys::HEADER_SENTINEL, &value, "表头标记为空，使用默认值");
            return Ok(self.defaults.header_sentinel.clone());
        }
        Ok(value)
    }

    async fn get_read_only_marker(&self) -> ConfigResult<char> {
        let default = self.defaults.read_only_marker.to_string();
        let value = self.get_config_or_default(config_keys::READ_ONLY_MARKER, &default)?;

        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(marker), None) if !marker.is_whitespace() => Ok(marker),
            _ => {
                warn_invalid(config_keys::READ_ONLY_MARKER, &value, "只读前缀须为单个字符，使用默认值");
                Ok(self.defaults.read_only_marker)
            }
        }
    }

    async fn is_formatting_enabled(&self) -> ConfigResult<bool> {
        let default = self.defaults.apply_formatting.to_string();
        let value = self.get_config_or_default(config_keys::APPLY_FORMATTING, &default)?;
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => {
                warn_invalid(config_keys::APPLY_FORMATTING, &value, "格式开关无法解析，使用默认值");
                Ok(self.defaults.apply_formatting)
            }
        }
    }

    async fn get_palette(&self) -> ConfigResult<FormatPalette> {
        let d = &self.defaults.palette;
        Ok(FormatPalette {
            header_fill: self.get_color(config_keys::HEADER_FILL, &d.header_fill)?,
            header_font: self.get_color(config_keys::HEADER_FONT, &d.header_font)?,
            read_only_fill: self.get_color(config_keys::READ_ONLY_FILL, &d.read_only_fill)?,
            matched_fill: self.get_color(config_keys::MATCHED_FILL, &d.matched_fill)?,
            export_data_fill: self.get_color(config_keys::EXPORT_DATA_FILL, &d.export_data_fill)?,
            default_font: self.get_color(config_keys::DEFAULT_FONT, &d.default_font)?,
        })
    }

    async fn get_default_import_fields(&self) -> ConfigResult<Vec<String>> {
        self.get_field_list(
            config_keys::DEFAULT_IMPORT_FIELDS,
            &self.defaults.default_import_fields,
        )
    }

    async fn get_excluded_import_fields(&self) -> ConfigResult<Vec<String>> {
        self.get_field_list(
            config_keys::EXCLUDED_IMPORT_FIELDS,
            &self.defaults.excluded_import_fields,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_yields_defaults() {
        let manager = ConfigManager::in_memory().unwrap();
        let config = manager.load_engine_config().await.unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[tokio::test]
    async fn test_overrides_are_read_back() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_config_value(config_keys::HEADER_SENTINEL, "RefDes").unwrap();
        manager.set_config_value(config_keys::READ_ONLY_MARKER, "#").unwrap();
        manager.set_config_value(config_keys::APPLY_FORMATTING, "off").unwrap();
        manager.set_config_value(config_keys::MATCHED_FILL, "#00FF00").unwrap();

        let config = manager.load_engine_config().await.unwrap();
        assert_eq!(config.header_sentinel, "RefDes");
        assert_eq!(config.read_only_marker, '#');
        assert!(!config.apply_formatting);
        assert_eq!(config.palette.matched_fill.as_str(), "#00FF00");
        assert_eq!(config.palette.header_fill.as_str(), "#4472C4");
    }

    #[tokio::test]
    async fn test_invalid_marker_falls_back() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_config_value(config_keys::READ_ONLY_MARKER, "__").unwrap();

        let marker = manager.get_read_only_marker().await.unwrap();
        assert_eq!(marker, '_');
    }

    #[tokio::test]
    async fn test_unparsable_values_do_not_block_loading() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_config_value(config_keys::APPLY_FORMATTING, "maybe").unwrap();
        manager.set_config_value(config_keys::HEADER_FILL, "   ").unwrap();
        manager.set_config_value(config_keys::HEADER_SENTINEL, "").unwrap();
        manager.set_config_value(config_keys::MATCHED_FILL, "#00FF00").unwrap();

        let config = manager.load_engine_config().await.unwrap();
        let defaults = EngineConfig::default();
        assert_eq!(config.apply_formatting, defaults.apply_formatting);
        assert_eq!(config.palette.header_fill, defaults.palette.header_fill);
        assert_eq!(config.header_sentinel, defaults.header_sentinel);
        assert_eq!(config.palette.matched_fill.as_str(), "#00FF00");
    }

    #[tokio::test]
    async fn test_malformed_field_list_falls_back() {
        let manager = ConfigManager::in_memory().unwrap();
        manager
            .set_config_value(config_keys::DEFAULT_IMPORT_FIELDS, "status,error")
            .unwrap();

        let fields = manager.get_default_import_fields().await.unwrap();
        assert_eq!(fields, EngineConfig::default().default_import_fields);
    }

    #[test]
    fn test_snapshot_round_trip_restores_values() {
        let source = ConfigManager::in_memory().unwrap();
        source.save_engine_config(&EngineConfig::default()).unwrap();
        source.set_config_value(config_keys::HEADER_SENTINEL, "refs").unwrap();
        let snapshot = source.get_config_snapshot().unwrap();

        let target = ConfigManager::in_memory().unwrap();
        let restored = target.restore_config_from_snapshot(&snapshot).unwrap();
        assert_eq!(restored, 11);
        assert_eq!(
            target.get_global_config_value(config_keys::HEADER_SENTINEL).unwrap(),
            Some("refs".to_string())
        );
    }
}
