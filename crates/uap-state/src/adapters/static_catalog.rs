use crate::domain::TypeId;
use crate::ports::{TransactionTypeCatalog, TransactionTypeInfo};
use std::collections::HashMap;

/// Fixed catalog built up front.
#[derive(Clone, Debug, Default)]
pub struct StaticTypeCatalog {
    entries: HashMap<TypeId, TransactionTypeInfo>,
}

impl StaticTypeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, type_id: TypeId, label: impl Into<String>) -> Self {
        self.entries.insert(
            type_id,
            TransactionTypeInfo {
                supported: true,
                label: label.into(),
            },
        );
        self
    }

    /// Known to the catalog but not yet supported.
    #[must_use]
    pub fn with_unsupported(mut self, type_id: TypeId, label: impl Into<String>) -> Self {
        self.entries.insert(
            type_id,
            TransactionTypeInfo {
                supported: false,
                label: label.into(),
            },
        );
        self
    }
}

impl TransactionTypeCatalog for StaticTypeCatalog {
    fn lookup(&self, type_id: &TypeId) -> Option<TransactionTypeInfo> {
        self.entries.get(type_id).cloned()
    }
}
