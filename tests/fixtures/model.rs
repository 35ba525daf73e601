use serde::{Deserialize, Serialize};

/// An order
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id
    pub id: u64,
    /// Ordered items
    pub line_items: Vec<Item>,
    pub status: OrderStatus,
    /// Free-form note
    pub note: Option<String>,
    #[serde(skip)]
    pub internal_flags: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Item {
    /// Stock keeping unit
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Shipped,
    Closed,
}

/// Filters for order searches
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub customer: String,
}

/// A page of results
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}
