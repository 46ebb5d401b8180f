//! Kit API trait
//!
//! Abstracts the Kit endpoints kitsync uses so the sync core can run against
//! the HTTP client or a test double.

use super::models::{Account, PurchaseRequest, SubscriberRequest};
use crate::domain::ids::{PurchaseId, ResourceId};
use crate::domain::resource::{Resource, ResourceKind};
use crate::domain::subscription::Subscription;
use crate::domain::Result;
use async_trait::async_trait;

/// Operations kitsync performs against Kit
#[async_trait]
pub trait KitApi: Send + Sync {
    /// Account the credentials belong to
    async fn get_account(&self) -> Result<Account>;

    /// Every resource of one kind, following pagination to the end
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>>;

    /// Create the subscriber, or update it when the email already exists
    ///
    /// # Returns
    ///
    /// The Kit subscriber id
    async fn upsert_subscriber(&self, subscriber: &SubscriberRequest) -> Result<u64>;

    async fn add_subscriber_to_form(&self, form_id: ResourceId, email: &str) -> Result<()>;

    async fn add_subscriber_to_tag(&self, tag_id: ResourceId, email: &str) -> Result<()>;

    async fn add_subscriber_to_sequence(&self, sequence_id: ResourceId, email: &str)
        -> Result<()>;

    /// Record a purchase
    ///
    /// # Returns
    ///
    /// The Kit purchase id
    async fn create_purchase(&self, purchase: &PurchaseRequest) -> Result<PurchaseId>;

    /// Add an existing subscriber to the resource named by `subscription`
    async fn subscribe(&self, subscription: Subscription, email: &str) -> Result<()> {
        match subscription {
            Subscription::Form(id) => self.add_subscriber_to_form(id, email).await,
            Subscription::Tag(id) => self.add_subscriber_to_tag(id, email).await,
            Subscription::Sequence(id) => self.add_subscriber_to_sequence(id, email).await,
        }
    }
}
