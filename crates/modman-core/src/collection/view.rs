//! Identity-scoped, read-only view over the collection.

use crate::collection::{ModCollection, ModEntry};
use crate::types::UserId;

/// Entries relevant to one identity. Holds no state of its own; every
/// iteration re-reads the underlying collection.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionView<'a> {
    collection: &'a ModCollection,
    user: UserId,
}

impl<'a> SubscriptionView<'a> {
    pub fn new(collection: &'a ModCollection, user: UserId) -> Self {
        Self { collection, user }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn entries(self) -> impl Iterator<Item = &'a ModEntry> + 'a {
        let user = self.user;
        self.collection
            .entries()
            .filter(move |entry| entry.is_subscribed_by(user))
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}
