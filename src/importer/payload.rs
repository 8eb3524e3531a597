// ==========================================
// BOM 助手 - 回填数据解析
// ==========================================
// 职责: 粘贴的 JSON 文本 → 外部记录 + 可选字段 + 默认勾选
// 格式: JSON 对象数组，字段顺序保持原样
// ==========================================

use crate::domain::bom::ImportRecord;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// 解析后的回填数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPayload {
    pub records: Vec<ImportRecord>,
}

impl ImportPayload {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 可勾选字段: 第一条记录的字段（保持顺序），去掉排除字段
    ///
    /// # 参数
    /// - excluded: 排除字段（大小写不敏感）
    pub fn available_fields<S: AsRef<str>>(&self, excluded: &[S]) -> Vec<String> {
        let Some(first) = self.records.first() else {
            return Vec::new();
        };
        first
            .field_names()
            .filter(|name| !excluded.iter().any(|ex| ex.as_ref().eq_ignore_ascii_case(name)))
            .map(str::to_string)
            .collect()
    }
}

/// 解析回填 JSON 文本
///
/// # 返回
/// - Ok(ImportPayload): 空数组得到空数据，不视为错误
/// - Err(EmptyPayload): 文本为空白
/// - Err(MalformedPayload / NotAnArray / RecordNotAnObject): 格式错误
pub fn parse_import_payload(text: &str) -> ImportResult<ImportPayload> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptyPayload);
    }

    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(ImportRecord::new(map)),
            _ => Err(ImportError::RecordNotAnObject { index }),
        })
        .collect::<ImportResult<Vec<_>>>()?;

    debug!(records = records.len(), "回填数据解析完成");
    Ok(ImportPayload { records })
}

// ==========================================
// FieldSelection - 字段勾选状态
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    entries: Vec<(String, bool)>,
}

impl FieldSelection {
    /// 按预设勾选（字段名在预设中则勾选，大小写敏感）
    pub fn with_preset<S: AsRef<str>>(fields: &[String], preset: &[S]) -> Self {
        let entries = fields
            .iter()
            .map(|f| (f.clone(), preset.iter().any(|p| p.as_ref() == f)))
            .collect();
        Self { entries }
    }

    /// 全部勾选
    pub fn all(fields: &[String]) -> Self {
        Self {
            entries: fields.iter().map(|f| (f.clone(), true)).collect(),
        }
    }

    /// 切换勾选状态
    ///
    /// # 返回
    /// - Some(bool): 切换后的状态
    /// - None: 字段不存在
    pub fn toggle(&mut self, field: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|(name, _)| name == field)?;
        entry.1 = !entry.1;
        Some(entry.1)
    }

    pub fn set(&mut self, field: &str, checked: bool) -> bool {
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => {
                entry.1 = checked;
                true
            }
            None => false,
        }
    }

    /// 仅勾选给定字段
    ///
    /// # 返回
    /// - 不在可选字段中的名称
    pub fn select_only<S: AsRef<str>>(&mut self, fields: &[S]) -> Vec<String> {
        for entry in self.entries.iter_mut() {
            entry.1 = fields.iter().any(|f| f.as_ref() == entry.0);
        }
        fields
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| !self.entries.iter().any(|(name, _)| name == f))
            .map(str::to_string)
            .collect()
    }

    pub fn is_selected(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, checked)| *checked && name == field)
    }

    /// 已勾选字段（保持顺序）
    pub fn selected(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn any_selected(&self) -> bool {
        self.entries.iter().any(|(_, checked)| *checked)
    }

    pub fn entries(&self) -> &[(String, bool)] {
        &self.entries
    }
}

/// 默认勾选
pub fn default_selection<S: AsRef<str>>(payload: &ImportPayload, excluded: &[S], preset: &[S]) -> FieldSelection {
    FieldSelection::with_preset(&payload.available_fields(excluded), preset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"lcscPartNumber": "C123", "status": "ok", "attributes": {"a": 1}, "price": 1.5},
        {"lcscPartNumber": "C456", "status": "eol"}
    ]"#;

    #[test]
    fn test_parse_keeps_field_order_and_excludes_attributes() {
        let payload = parse_import_payload(SAMPLE).unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(
            payload.available_fields(&["attributes"]),
            vec!["lcscPartNumber", "status", "price"]
        );
        assert!(payload.records[0].get("attributes").is_some());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_import_payload("[{\"a\": 1"),
            Err(ImportError::MalformedPayload(_))
        ));
        assert_eq!(parse_import_payload("{\"a\": 1}"), Err(ImportError::NotAnArray));
        assert_eq!(
            parse_import_payload("[{\"a\": 1}, 3]"),
            Err(ImportError::RecordNotAnObject { index: 1 })
        );
        assert_eq!(parse_import_payload("   "), Err(ImportError::EmptyPayload));
    }

    #[test]
    fn test_empty_array_is_valid() {
        let payload = parse_import_payload("[]").unwrap();
        assert!(payload.is_empty());
        assert!(payload.available_fields(&["attributes"]).is_empty());
    }

    #[test]
    fn test_default_selection_and_toggle() {
        let payload = parse_import_payload(SAMPLE).unwrap();
        let mut selection = default_selection(&payload, &["attributes"], &["status", "error"]);

        assert_eq!(selection.selected(), vec!["status"]);
        assert_eq!(selection.toggle("price"), Some(true));
        assert_eq!(selection.selected(), vec!["status", "price"]);
        assert_eq!(selection.toggle("status"), Some(false));
        assert_eq!(selection.toggle("missing"), None);
        assert!(selection.any_selected());

        selection.set("price", false);
        assert!(!selection.any_selected());
    }

    #[test]
    fn test_select_only_reports_unknown_fields() {
        let payload = parse_import_payload(SAMPLE).unwrap();
        let mut selection = default_selection(&payload, &["attributes"], &["status"]);

        let unknown = selection.select_only(&["price", "stock"]);
        assert_eq!(unknown, vec!["stock"]);
        assert_eq!(selection.selected(), vec!["price"]);
        assert!(selection.is_selected("price"));
        assert!(!selection.is_selected("status"));
    }
}
