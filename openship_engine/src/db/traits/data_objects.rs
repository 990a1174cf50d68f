use crate::db_types::OrderRecord;

#[derive(Debug, Clone)]
pub enum InsertOrderResult {
    Inserted(OrderRecord),
    AlreadyExists(OrderRecord),
}

impl InsertOrderResult {
    pub fn record(&self) -> &OrderRecord {
        match self {
            Self::Inserted(r) | Self::AlreadyExists(r) => r,
        }
    }

    pub fn into_record(self) -> OrderRecord {
        match self {
            Self::Inserted(r) | Self::AlreadyExists(r) => r,
        }
    }
}
