//! Warehouse directory record

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::WarehouseId;

/// Read-only from the fulfillment workflow's point of view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub location: String,
}

impl Warehouse {
    pub fn new(id: impl Into<WarehouseId>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), location: location.into() }
    }
}
