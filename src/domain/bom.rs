// ==========================================
// BOM 助手 - BOM 领域模型
// ==========================================
// 职责: BomRecord（导出结果）/ ImportRecord（外部回填数据）
// ==========================================

use crate::domain::field::BomField;
use crate::domain::types::CellValue;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ==========================================
// BomRecord - 导出的 BOM 行
// ==========================================
// 生命周期: 提取引擎按有效行生成，生成后只读
// 序列化: camelCase 字段名，字段顺序与注册表一致；整数值数量输出为整数（2 而非 2.0）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomRecord {
    pub designator: String, // 位号（必填）
    pub description: String,
    #[serde(serialize_with = "serialize_quantity")]
    pub qty_per_board: f64,
    #[serde(serialize_with = "serialize_quantity")]
    pub qty_per_order: f64,
    #[serde(serialize_with = "serialize_quantity")]
    pub qty_to_consign: f64,
    pub source: String,
    pub provider: String,
    pub ordered: String,
    #[serde(serialize_with = "serialize_quantity")]
    pub minimum_qty: f64,
    #[serde(serialize_with = "serialize_quantity")]
    pub buffer_qty: f64,
    pub model: String,
    pub manufacturer_part_number: String,
    pub product_code_provider: String,
    pub lcsc_part_number: String, // LCSC 料号（必填，回填匹配键）
    pub jlcpcb_part_number: String,
    pub mouser_part_number: String,
    pub digikey_part_number: String,
    pub comment: String,
    pub packaging: String,
}

/// 数量序列化：有限且无小数部分的值按整数输出
fn serialize_quantity<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl BomRecord {
    /// 写入文本字段（数值字段忽略）
    pub fn set_text(&mut self, field: BomField, value: String) {
        let slot = match field {
            BomField::Designator => &mut self.designator,
            BomField::Description => &mut self.description,
            BomField::Source => &mut self.source,
            BomField::Provider => &mut self.provider,
            BomField::Ordered => &mut self.ordered,
            BomField::Model => &mut self.model,
            BomField::ManufacturerPartNumber => &mut self.manufacturer_part_number,
            BomField::ProductCodeProvider => &mut self.product_code_provider,
            BomField::LcscPartNumber => &mut self.lcsc_part_number,
            BomField::JlcpcbPartNumber => &mut self.jlcpcb_part_number,
            BomField::MouserPartNumber => &mut self.mouser_part_number,
            BomField::DigikeyPartNumber => &mut self.digikey_part_number,
            BomField::Comment => &mut self.comment,
            BomField::Packaging => &mut self.packaging,
            BomField::QtyPerBoard
            | BomField::QtyPerOrder
            | BomField::QtyToConsign
            | BomField::MinimumQty
            | BomField::BufferQty => return,
        };
        *slot = value;
    }

    /// 写入数值字段（文本字段忽略）
    pub fn set_number(&mut self, field: BomField, value: f64) {
        let slot = match field {
            BomField::QtyPerBoard => &mut self.qty_per_board,
            BomField::QtyPerOrder => &mut self.qty_per_order,
            BomField::QtyToConsign => &mut self.qty_to_consign,
            BomField::MinimumQty => &mut self.minimum_qty,
            BomField::BufferQty => &mut self.buffer_qty,
            _ => return,
        };
        *slot = value;
    }
}

// ==========================================
// ImportRecord - 外部回填记录
// ==========================================
// 开放字段集合（JSON 对象），字段顺序保持原样
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportRecord {
    fields: Map<String, Value>,
}

impl ImportRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// 字段名列表（保持原顺序）
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// 读取字段值（先精确匹配，再大小写不敏感匹配）
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(field))
                .map(|(_, v)| v)
        })
    }

    /// 读取字段值并转为单元格值
    pub fn cell_value(&self, field: &str) -> Option<CellValue> {
        self.get(field).map(CellValue::from_json)
    }

    /// 匹配键文本（字段缺失或为空时返回 None）
    pub fn key_text(&self, key_field: &str) -> Option<String> {
        let text = self.cell_value(key_field)?.as_text();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for ImportRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bom_record_serializes_camel_case() {
        let record = BomRecord {
            designator: "R1".to_string(),
            lcsc_part_number: "C123".to_string(),
            qty_per_board: 2.0,
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["designator"], json!("R1"));
        assert_eq!(value["lcscPartNumber"], json!("C123"));
        assert_eq!(value["qtyPerBoard"], json!(2));
        assert!(value.get("manufacturerPartNumber").is_some());
    }

    #[test]
    fn test_quantities_serialize_like_plain_numbers() {
        let record = BomRecord {
            qty_per_board: 2.0,
            buffer_qty: 0.5,
            ..Default::default()
        };
        let text = serde_json::to_string(&record).unwrap();
        assert!(text.contains(r#""qtyPerBoard":2,"#));
        assert!(text.contains(r#""qtyPerOrder":0,"#));
        assert!(text.contains(r#""bufferQty":0.5,"#));

        let back: BomRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_setters_ignore_mismatched_kind() {
        let mut record = BomRecord::default();
        record.set_text(BomField::QtyPerBoard, "5".to_string());
        record.set_number(BomField::Comment, 5.0);
        assert_eq!(record, BomRecord::default());

        record.set_text(BomField::Comment, "DNP".to_string());
        record.set_number(BomField::BufferQty, 3.0);
        assert_eq!(record.comment, "DNP");
        assert_eq!(record.buffer_qty, 3.0);
    }

    #[test]
    fn test_import_record_key_lookup() {
        let record: ImportRecord =
            serde_json::from_value(json!({"LCSCPartNumber": "C123", "price": 1.5})).unwrap();
        assert_eq!(record.key_text("lcscPartNumber"), Some("C123".to_string()));
        assert_eq!(record.cell_value("price"), Some(CellValue::Number(1.5)));
        assert_eq!(record.key_text("missing"), None);
    }
}
