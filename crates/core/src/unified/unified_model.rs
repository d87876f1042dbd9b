//! Models for the unified (all-entities) import and export endpoints.

use serde::{Deserialize, Serialize};

use crate::bills::Bill;
use crate::categories::Category;
use crate::credit_cards::CreditCard;
use crate::invoices::Invoice;

/// How the server treats imported items that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicateStrategy {
    #[default]
    Skip,
    CreateDuplicate,
}

impl DuplicateStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateStrategy::Skip => "SKIP",
            DuplicateStrategy::CreateDuplicate => "CREATE_DUPLICATE",
        }
    }
}

impl std::str::FromStr for DuplicateStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SKIP" => Ok(DuplicateStrategy::Skip),
            "CREATE_DUPLICATE" => Ok(DuplicateStrategy::CreateDuplicate),
            other => Err(format!("unknown duplicate strategy '{}'", other)),
        }
    }
}

/// Per-entity counters reported by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCounts {
    #[serde(default)]
    pub processed: u32,
    #[serde(default)]
    pub created: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub errors: u32,
}

/// Result of `POST /unified/import`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    #[serde(default)]
    pub categories: ImportCounts,
    #[serde(default)]
    pub credit_cards: ImportCounts,
    #[serde(default)]
    pub bills: ImportCounts,
    #[serde(default)]
    pub invoices: ImportCounts,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl ImportResult {
    fn all(&self) -> [&ImportCounts; 4] {
        [
            &self.categories,
            &self.credit_cards,
            &self.bills,
            &self.invoices,
        ]
    }

    pub fn total_created(&self) -> u32 {
        self.all().iter().map(|c| c.created).sum()
    }

    pub fn total_errors(&self) -> u32 {
        self.all().iter().map(|c| c.errors).sum()
    }

    /// True when the import changed server data.
    pub fn has_changes(&self) -> bool {
        self.total_created() > 0
    }
}

/// Every dataset as returned by `GET /unified/export`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedExport {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub credit_cards: Vec<CreditCard>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub exported_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_wire_names() {
        assert_eq!(
            serde_json::to_string(&DuplicateStrategy::CreateDuplicate).unwrap(),
            "\"CREATE_DUPLICATE\""
        );
        assert_eq!(
            "create-duplicate".parse::<DuplicateStrategy>().unwrap(),
            DuplicateStrategy::CreateDuplicate
        );
        assert!("merge".parse::<DuplicateStrategy>().is_err());
    }

    #[test]
    fn test_import_result_totals() {
        let json = r#"{
            "categories": {"processed": 3, "created": 1, "skipped": 2, "errors": 0},
            "bills": {"processed": 10, "created": 8, "skipped": 1, "errors": 1}
        }"#;
        let result: ImportResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_created(), 9);
        assert_eq!(result.total_errors(), 1);
        assert_eq!(result.credit_cards, ImportCounts::default());
        assert!(result.has_changes());
    }
}
