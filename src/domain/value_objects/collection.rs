use serde::{Deserialize, Serialize};
use std::fmt;

/// The three record collections reconciled against the remote authority.
/// The canonical string doubles as the persistence key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    WorkOrders,
    Inspections,
    Attachments,
}

impl Collection {
    /// Fixed iteration order for sync runs and reporting.
    pub const ALL: [Collection; 3] = [
        Collection::WorkOrders,
        Collection::Inspections,
        Collection::Attachments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::WorkOrders => "work_orders",
            Collection::Inspections => "inspections",
            Collection::Attachments => "attachments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Collection {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "work_orders" => Ok(Collection::WorkOrders),
            "inspections" => Ok(Collection::Inspections),
            "attachments" => Ok(Collection::Attachments),
            other => Err(format!("Unknown collection: {other}")),
        }
    }
}
