// ==========================================
// BOM 助手 - 字段注册表
// ==========================================
// 职责: 静态字段注册表（逻辑名 + 列名同义词 + 类型转换方式）
// 用途: 列解析、提取引擎、回填引擎统一按此表遍历
// ==========================================

use serde::{Deserialize, Serialize};

/// 字段类型转换方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,   // 字符串，缺省为空串
    Number, // 浮点数，缺省/解析失败为 0
}

/// BOM 逻辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BomField {
    Designator,
    Description,
    QtyPerBoard,
    QtyPerOrder,
    QtyToConsign,
    Source,
    Provider,
    Ordered,
    MinimumQty,
    BufferQty,
    Model,
    ManufacturerPartNumber,
    ProductCodeProvider,
    LcscPartNumber,
    JlcpcbPartNumber,
    MouserPartNumber,
    DigikeyPartNumber,
    Comment,
    Packaging,
}

/// 字段注册项
#[derive(Debug)]
pub struct FieldSpec {
    pub field: BomField,
    pub logical_name: &'static str,
    /// 列名同义词（小写，按优先级排列；含带只读前缀的历史列名）
    pub synonyms: &'static [&'static str],
    pub kind: FieldKind,
    pub required: bool,
}

/// 回填匹配键字段（LCSC 料号）
pub const KEY_FIELD: BomField = BomField::LcscPartNumber;

/// 字段注册表（顺序即导出 JSON 的字段顺序）
pub const FIELD_REGISTRY: &[FieldSpec] = &[
    FieldSpec {
        field: BomField::Designator,
        logical_name: "designator",
        synonyms: &["designators", "designator"],
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        field: BomField::Description,
        logical_name: "description",
        synonyms: &["desc", "description"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::QtyPerBoard,
        logical_name: "qtyPerBoard",
        synonyms: &["qtyperboard", "_qtyperboard", "qty"],
        kind: FieldKind::Number,
        required: false,
    },
    FieldSpec {
        field: BomField::QtyPerOrder,
        logical_name: "qtyPerOrder",
        synonyms: &["qtyperorder", "_qtyperorder"],
        kind: FieldKind::Number,
        required: false,
    },
    FieldSpec {
        field: BomField::QtyToConsign,
        logical_name: "qtyToConsign",
        synonyms: &["qtytoconsign", "_qtytoconsign"],
        kind: FieldKind::Number,
        required: false,
    },
    FieldSpec {
        field: BomField::Source,
        logical_name: "source",
        synonyms: &["source"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::Provider,
        logical_name: "provider",
        synonyms: &["provider"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::Ordered,
        logical_name: "ordered",
        synonyms: &["ordered"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::MinimumQty,
        logical_name: "minimumQty",
        synonyms: &["minimumqty", "_minimumqty", "min qty"],
        kind: FieldKind::Number,
        required: false,
    },
    FieldSpec {
        field: BomField::BufferQty,
        logical_name: "bufferQty",
        synonyms: &["bufferqty", "_bufferqty"],
        kind: FieldKind::Number,
        required: false,
    },
    FieldSpec {
        field: BomField::Model,
        logical_name: "model",
        synonyms: &["model"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::ManufacturerPartNumber,
        logical_name: "manufacturerPartNumber",
        synonyms: &[
            "mfr #",
            "manufacturer part number",
            "model",
            "manufacturerpartnumber",
        ],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::ProductCodeProvider,
        logical_name: "productCodeProvider",
        synonyms: &["productcodeprovider"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::LcscPartNumber,
        logical_name: "lcscPartNumber",
        synonyms: &["lcsc", "lcsc #", "lcscpartnumber", "lcsc part number"],
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        field: BomField::JlcpcbPartNumber,
        logical_name: "jlcpcbPartNumber",
        synonyms: &["jlcpcb #", "jlcpcb", "jlcpcbpartnumber"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::MouserPartNumber,
        logical_name: "mouserPartNumber",
        synonyms: &["mouser #", "mouser"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::DigikeyPartNumber,
        logical_name: "digikeyPartNumber",
        synonyms: &["digikey #", "digikey"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::Comment,
        logical_name: "comment",
        synonyms: &["comment", "comments"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        field: BomField::Packaging,
        logical_name: "packaging",
        synonyms: &["packaging"],
        kind: FieldKind::Text,
        required: false,
    },
];

impl BomField {
    /// 注册表中的字段定义
    pub fn spec(self) -> &'static FieldSpec {
        FIELD_REGISTRY
            .iter()
            .find(|spec| spec.field == self)
            .unwrap_or(&FIELD_REGISTRY[0])
    }

    pub fn logical_name(self) -> &'static str {
        self.spec().logical_name
    }

    pub fn synonyms(self) -> &'static [&'static str] {
        self.spec().synonyms
    }

    pub fn kind(self) -> FieldKind {
        self.spec().kind
    }

    /// 按逻辑名查找（大小写不敏感）
    pub fn from_logical_name(name: &str) -> Option<BomField> {
        let name = name.trim();
        FIELD_REGISTRY
            .iter()
            .find(|spec| spec.logical_name.eq_ignore_ascii_case(name))
            .map(|spec| spec.field)
    }
}
