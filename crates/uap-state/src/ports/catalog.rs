use crate::domain::TypeId;

/// Catalog entry for a transaction type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionTypeInfo {
    pub supported: bool,
    pub label: String,
}

/// Read-only catalog of the transaction types assistants can attach to.
pub trait TransactionTypeCatalog: Send + Sync {
    fn lookup(&self, type_id: &TypeId) -> Option<TransactionTypeInfo>;

    fn is_supported(&self, type_id: &TypeId) -> bool {
        self.lookup(type_id).is_some_and(|info| info.supported)
    }
}
