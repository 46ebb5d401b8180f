//! Domain identifier types with validation
//!
//! Newtype wrappers for store and Kit identifiers. WooCommerce and Kit both use
//! positive integer ids; zero is never a valid id on either side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn parse_positive(kind: &str, s: &str) -> Result<u64, String> {
    let trimmed = s.trim().trim_start_matches('#');
    if trimmed.is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }
    let value: u64 = trimmed
        .parse()
        .map_err(|_| format!("Invalid {kind} '{s}': expected a positive integer"))?;
    if value == 0 {
        return Err(format!("{kind} must be greater than zero"));
    }
    Ok(value)
}

/// WooCommerce order identifier
///
/// # Examples
///
/// ```
/// use kitsync::domain::ids::OrderId;
/// use std::str::FromStr;
///
/// let order_id = OrderId::from_str("#1042").unwrap();
/// assert_eq!(order_id.value(), 1042);
/// assert_eq!(order_id.to_string(), "1042");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct OrderId(u64);

impl OrderId {
    /// Creates a new OrderId
    ///
    /// # Returns
    ///
    /// Returns `Err` if the id is zero
    pub fn new(id: u64) -> Result<Self, String> {
        if id == 0 {
            return Err("Order ID must be greater than zero".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the raw numeric id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive("Order ID", s).map(Self)
    }
}

impl TryFrom<u64> for OrderId {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderId> for u64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// WooCommerce product identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ProductId(u64);

impl ProductId {
    /// Creates a new ProductId, rejecting zero
    pub fn new(id: u64) -> Result<Self, String> {
        if id == 0 {
            return Err("Product ID must be greater than zero".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the raw numeric id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for ProductId {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for u64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// Kit resource identifier (form, tag, sequence or custom field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ResourceId(u64);

impl ResourceId {
    /// Creates a new ResourceId, rejecting zero
    pub fn new(id: u64) -> Result<Self, String> {
        if id == 0 {
            return Err("Resource ID must be greater than zero".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the raw numeric id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive("Resource ID", s).map(Self)
    }
}

impl TryFrom<u64> for ResourceId {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceId> for u64 {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// Kit purchase identifier returned after purchase data is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseId(u64);

impl PurchaseId {
    /// Wraps a purchase id returned by the API
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PurchaseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive("Purchase ID", s).map(Self)
    }
}
