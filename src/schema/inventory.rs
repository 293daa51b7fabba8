// src/schema/inventory.rs
use serde::{Deserialize, Serialize};

use super::{FieldAliases, NormalizedRecord, RawRecord};

pub const DEFAULT_TOOL: &str = "Unknown Tool";
pub const DEFAULT_BRAND: &str = "Unknown";

const TOOL: FieldAliases = FieldAliases {
    field: "tool",
    aliases: &["Tool", "tool", "Tool Name"],
};
const BRAND: FieldAliases = FieldAliases {
    field: "brand",
    aliases: &["Brand", "brand"],
};
const AVAILABLE_STOCK: FieldAliases = FieldAliases {
    field: "availableStock",
    aliases: &[
        "available_stock",
        "Available Stock",
        "availableStock",
        "Stock",
        "stock",
    ],
};
const SOLD: FieldAliases = FieldAliases {
    field: "sold",
    aliases: &["Sold", "sold"],
};

static FIELDS: [FieldAliases; 4] = [TOOL, BRAND, AVAILABLE_STOCK, SOLD];

/// One stocked tool line from the inventory feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub tool: String,
    pub brand: String,
    pub available_stock: f64,
    pub sold: f64,
}

impl NormalizedRecord for InventoryRecord {
    const KIND: &'static str = "inventory";

    fn fields() -> &'static [FieldAliases] {
        &FIELDS
    }

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            tool: TOOL.text(raw, DEFAULT_TOOL),
            brand: BRAND.text(raw, DEFAULT_BRAND),
            available_stock: AVAILABLE_STOCK.number(raw),
            sold: SOLD.number(raw),
        }
    }
}
