// src/schema/progress.rs
use serde::{Deserialize, Serialize};

use super::{FieldAliases, NormalizedRecord, RawRecord};

pub const DEFAULT_NAME: &str = "Unknown";

const NAME: FieldAliases = FieldAliases {
    field: "name",
    aliases: &["Name", "name", "Region", "region", "Team"],
};
const LEADS: FieldAliases = FieldAliases {
    field: "leads",
    aliases: &["Leads", "leads", "Total Leads", "Opportunities", "opportunities"],
};
const CONVERTED: FieldAliases = FieldAliases {
    field: "converted",
    aliases: &["Converted", "converted", "Conversions", "Won"],
};
const TARGET: FieldAliases = FieldAliases {
    field: "target",
    aliases: &["Target", "target", "Monthly Target"],
};

static FIELDS: [FieldAliases; 4] = [NAME, LEADS, CONVERTED, TARGET];

/// One row of the NBD progress sheet (a team or region and its counters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub name: String,
    pub leads: f64,
    pub converted: f64,
    pub target: f64,
}

impl NormalizedRecord for ProgressRecord {
    const KIND: &'static str = "nbd";

    fn fields() -> &'static [FieldAliases] {
        &FIELDS
    }

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            name: NAME.text(raw, DEFAULT_NAME),
            leads: LEADS.number(raw),
            converted: CONVERTED.number(raw),
            target: TARGET.number(raw),
        }
    }
}
