// Validation utilities module
// Domain rules that the `validator` derive cannot express on its own

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

use crate::orders::error::OrderError;

fn subdomain_regex() -> Option<&'static Regex> {
    static SUBDOMAIN: OnceLock<Option<Regex>> = OnceLock::new();
    SUBDOMAIN
        .get_or_init(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").ok())
        .as_ref()
}

/// Validates a public store subdomain: lowercase letters, digits and inner hyphens
pub fn validate_subdomain(subdomain: &str) -> Result<(), ValidationError> {
    if subdomain_regex().is_some_and(|re| re.is_match(subdomain)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_subdomain"))
    }
}

/// A delivery order needs street, number and neighborhood
pub fn validate_delivery_fields(
    is_delivery: bool,
    street: Option<&str>,
    number: Option<&str>,
    neighborhood: Option<&str>,
) -> Result<(), OrderError> {
    if !is_delivery {
        return Ok(());
    }

    let missing: Vec<&str> = [
        ("deliveryStreet", street),
        ("deliveryNumber", number),
        ("deliveryNeighborhood", neighborhood),
    ]
    .into_iter()
    .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(OrderError::ValidationFailure(format!(
            "Delivery orders require {}",
            missing.join(", ")
        )))
    }
}
