use std::collections::HashMap;
use uuid::Uuid;

use crate::inventory::models::ProductRef;
use crate::inventory::resolver::ProductResolver;
use crate::orders::error::OrderError;
use crate::orders::models::{NewOrderItem, OrderLineRequest};

/// Priced, stock-checked lines ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedOrder {
    pub items: Vec<NewOrderItem>,
    /// Sum of line totals, minor units
    pub total: i64,
}

/// Service for calculating order prices and subtotals
///
/// All amounts are integer minor units.
pub struct PriceCalculator;

impl PriceCalculator {
    /// `quantity * unit_price`, failing on overflow
    pub fn calculate_subtotal(quantity: i32, unit_price: i64) -> Result<i64, OrderError> {
        unit_price
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| OrderError::ValidationFailure("Order line total is too large".to_string()))
    }

    /// Sum of subtotals, failing on overflow
    pub fn calculate_total(subtotals: &[i64]) -> Result<i64, OrderError> {
        subtotals.iter().try_fold(0i64, |acc, &s| {
            acc.checked_add(s)
                .ok_or_else(|| OrderError::ValidationFailure("Order total is too large".to_string()))
        })
    }

    /// Resolve, stock-check and price every line
    ///
    /// Nothing is written here; any failure leaves inventory untouched. Lines
    /// naming the same product are checked against their combined quantity.
    pub async fn prepare(
        resolver: &ProductResolver,
        store_id: Uuid,
        lines: &[OrderLineRequest],
    ) -> Result<PreparedOrder, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::ValidationFailure(
                "Order must have at least one item".to_string(),
            ));
        }

        let mut requested: HashMap<ProductRef, i32> = HashMap::new();
        let mut items = Vec::with_capacity(lines.len());
        let mut subtotals = Vec::with_capacity(lines.len());

        for line in lines {
            if line.quantity <= 0 {
                return Err(OrderError::ValidationFailure(format!(
                    "Quantity for product {} must be at least 1",
                    line.store_product_id
                )));
            }

            let product = resolver.resolve(store_id, line.store_product_id).await?;

            let wanted = requested.entry(product.product_ref).or_insert(0);
            *wanted = wanted.saturating_add(line.quantity);
            if product.quantity < *wanted {
                return Err(OrderError::InsufficientStock {
                    product_id: product.product_ref.id(),
                    name: product.name,
                    available: product.quantity,
                    requested: *wanted,
                });
            }

            subtotals.push(Self::calculate_subtotal(line.quantity, product.price)?);
            items.push(NewOrderItem {
                product_ref: product.product_ref,
                name: product.name,
                img_url: product.img_url,
                price: product.price,
                quantity: line.quantity,
            });
        }

        let total = Self::calculate_total(&subtotals)?;
        Ok(PreparedOrder { items, total })
    }
}
