use chrono::NaiveDate;
use serde::Deserialize;

use crate::clock::DateRange;
use crate::orders::error::OrderError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

pub(crate) const ORDER_COLUMNS: &str = "id, order_number, store_id, status, customer_name, customer_phone, \
     payment_method, total, is_delivery, delivery_street, delivery_number, delivery_neighborhood, \
     created_at, updated_at";

/// SQL query builder for a store's order listing
///
/// Filters become positional parameters bound as text; timestamps are cast
/// in the clause. LIMIT and OFFSET are written inline.
pub struct OrderQueryBuilder {
    where_clauses: Vec<String>,
    params: Vec<String>,
    limit: u32,
    offset: u32,
}

impl OrderQueryBuilder {
    /// Start a query scoped to one store
    pub fn for_store(store_id: uuid::Uuid) -> Self {
        Self {
            where_clauses: vec!["store_id = $1::uuid".to_string()],
            params: vec![store_id.to_string()],
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }

    fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    /// Case-insensitive substring match on the customer name
    pub fn add_search_filter(&mut self, search: &str) {
        let index = self.next_index();
        self.where_clauses.push(format!("customer_name ILIKE ${}", index));
        self.params.push(format!("%{}%", search));
    }

    pub fn add_status_filter(&mut self, status: &str) {
        let index = self.next_index();
        self.where_clauses.push(format!("status = ${}", index));
        self.params.push(status.to_string());
    }

    /// Both bounds are inclusive
    pub fn add_date_range(&mut self, range: &DateRange) {
        let index = self.next_index();
        self.where_clauses.push(format!(
            "created_at BETWEEN ${}::timestamptz AND ${}::timestamptz",
            index,
            index + 1
        ));
        self.params.push(range.from.to_rfc3339());
        self.params.push(range.to.to_rfc3339());
    }

    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = page.saturating_sub(1).saturating_mul(limit);
    }

    fn where_sql(&self) -> String {
        format!(" WHERE {}", self.where_clauses.join(" AND "))
    }

    /// Page query, newest first
    pub fn build(&self) -> (String, Vec<String>) {
        let query = format!(
            "SELECT {} FROM orders{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            ORDER_COLUMNS,
            self.where_sql(),
            self.limit,
            self.offset
        );
        (query, self.params.clone())
    }

    /// Row count over the same filters, ignoring pagination
    pub fn build_count(&self) -> (String, Vec<String>) {
        let query = format!("SELECT COUNT(*) FROM orders{}", self.where_sql());
        (query, self.params.clone())
    }
}

/// Listing query parameters extracted from an HTTP request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQueryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Customer name substring
    pub search: Option<String>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Validated and normalized listing filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilters {
    pub search: Option<String>,
    pub status: Option<String>,
    pub range: Option<DateRange>,
    pub page: u32,
    pub limit: u32,
}

impl Default for OrderFilters {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            range: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl OrderFilters {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }

    /// Apply these filters to a builder
    pub fn apply(&self, builder: &mut OrderQueryBuilder) {
        if let Some(ref search) = self.search {
            builder.add_search_filter(search);
        }
        if let Some(ref status) = self.status {
            builder.add_status_filter(status);
        }
        if let Some(ref range) = self.range {
            builder.add_date_range(range);
        }
        builder.set_pagination(self.page, self.limit);
    }
}

pub struct OrderQueryValidator;

impl OrderQueryValidator {
    pub fn validate(params: OrderQueryParams) -> Result<OrderFilters, OrderError> {
        let search = Self::normalize_string(params.search);
        let status = Self::normalize_string(params.status);

        if let (Some(from), Some(to)) = (params.from, params.to) {
            if from > to {
                return Err(OrderError::ValidationFailure(
                    "from cannot be after to".to_string(),
                ));
            }
        }
        let range = DateRange::from_optional_days(params.from, params.to);

        let page = match params.page {
            Some(p) => {
                Self::validate_pagination_param(p, "page")?;
                p
            }
            None => 1,
        };

        let limit = match params.limit {
            Some(l) => {
                Self::validate_pagination_param(l, "limit")?;
                l.min(MAX_PAGE_SIZE)
            }
            None => DEFAULT_PAGE_SIZE,
        };

        if (page - 1).checked_mul(limit).is_none() {
            return Err(OrderError::ValidationFailure(format!(
                "page {} is out of range for a limit of {}",
                page, limit
            )));
        }

        Ok(OrderFilters {
            search,
            status,
            range,
            page,
            limit,
        })
    }

    /// Trim and drop blank values
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    fn validate_pagination_param(value: u32, name: &str) -> Result<(), OrderError> {
        if value == 0 {
            return Err(OrderError::ValidationFailure(format!(
                "{} must be a positive number (greater than 0)",
                name
            )));
        }
        Ok(())
    }
}
