//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
        }
    }
}

impl Pagination {
    /// Row offset for the page; saturates instead of overflowing on
    /// out-of-range caller input
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Reference to a document owned by the host application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRef {
    /// e.g., "sales_order", "goods_issue", "transfer_order"
    pub document_type: String,
    pub document_id: uuid::Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_basic() {
        assert_eq!(Pagination::default().offset(), 0);
        let p = Pagination {
            page: 3,
            per_page: 50,
        };
        assert_eq!(p.offset(), 100);
    }

    #[test]
    fn test_offset_saturates_instead_of_overflowing() {
        let huge = Pagination {
            page: u32::MAX,
            per_page: 200,
        };
        assert_eq!(huge.offset(), u32::MAX);

        let zero_page = Pagination {
            page: 0,
            per_page: 50,
        };
        assert_eq!(zero_page.offset(), 0);
    }
}
