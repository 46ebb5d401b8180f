//! Domain models and types for kitsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`OrderId`], [`ProductId`], [`ResourceId`], [`PurchaseId`])
//! - **Domain models** ([`Order`], [`Subscription`], [`Resource`])
//! - **Error types** ([`KitSyncError`], [`KitApiError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Store and Kit ids are distinct newtypes, so an order id can never be passed
//! where a tag id is expected:
//!
//! ```rust
//! use kitsync::domain::{OrderId, Subscription};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let order_id: OrderId = "#1042".parse()?;
//! let subscription: Subscription = "tag:17".parse()?;
//!
//! assert_eq!(order_id.value(), 1042);
//! assert_eq!(subscription.resource_id().value(), 17);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, KitSyncError>`]; adapter errors
//! convert with the `?` operator.

pub mod errors;
pub mod ids;
pub mod order;
pub mod resource;
pub mod result;
pub mod subscription;

// Re-export commonly used types for convenience
pub use errors::{KitApiError, KitSyncError, StoreError};
pub use ids::{OrderId, ProductId, PurchaseId, ResourceId};
pub use order::{Customer, LineItem, Order, OrderBuilder, OrderTotals, SentMarker};
pub use result::Result;
pub use resource::{CachedResources, Resource, ResourceKind};
pub use subscription::Subscription;
