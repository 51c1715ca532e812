use serde::{Deserialize, Serialize};

/// One line of an order: a single product bought by a customer
///
/// Lines sharing an `order_id` form a basket; lines sharing a `customer_id`
/// form that customer's purchase history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub order_id: String,
    pub customer_id: String,
    pub product_id: String,
}

impl OrderLine {
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        product_id: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            product_id: product_id.into(),
        }
    }
}
