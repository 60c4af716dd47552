use crate::{
    retained::RetainedMessageTree,
    subscription::{SubscriptionToken, SubscriptionTree},
    topic::{Topic, TopicFilter},
    types::{RouteError, Subscription},
};
use bytes::Bytes;
use log::{debug, trace};
use parking_lot::RwLock;

/// Owns the retained message and subscription tries plus the lock
/// discipline around them. The tries themselves are not synchronized;
/// every mutation here takes the relevant write lock and every query
/// runs under the read lock, so matches may proceed concurrently while
/// writers are exclusive.
///
/// Retained payloads are `Bytes` handles: cloning shares the underlying
/// message buffer, the router never copies or interprets its contents.
pub struct Router {
    retained: RwLock<RetainedMessageTree<Bytes>>,
    subscriptions: RwLock<SubscriptionTree<Subscription>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            retained: RwLock::new(RetainedMessageTree::new()),
            subscriptions: RwLock::new(SubscriptionTree::new()),
        }
    }

    /// Store a retained message for a concrete topic, replacing any
    /// previous one. Rejects wildcard-bearing topics: inserting a filter
    /// is a contract violation, not a request to create wildcard keys.
    pub fn insert_retained(&self, topic: &str, payload: Bytes) -> Result<(), RouteError> {
        let topic: Topic = topic.parse()?;
        let replaced = self.retained.write().insert(&topic, payload);

        trace!(
            "Stored retained message for topic \"{}\" (replaced previous: {})",
            topic,
            replaced.is_some()
        );

        Ok(())
    }

    /// Drop the retained message for `topic`. The removal is reported
    /// rather than silently succeeding when no message was retained.
    pub fn remove_retained(&self, topic: &str) -> Result<(), RouteError> {
        let topic: Topic = topic.parse()?;

        match self.retained.write().remove(&topic) {
            Some(_) => {
                trace!("Removed retained message for topic \"{}\"", topic);
                Ok(())
            },
            None => Err(RouteError::NotFound),
        }
    }

    /// The retained messages whose topics match `filter`, in no
    /// guaranteed order.
    pub fn retained_matches(&self, filter: &str) -> Result<Vec<Bytes>, RouteError> {
        let filter: TopicFilter = filter.parse()?;

        Ok(self.retained.read().matches(&filter).cloned().collect())
    }

    /// Apply the retained-publish rule: an empty payload clears any
    /// existing retained message instead of storing one. Clearing an
    /// absent entry is not an error.
    pub fn retain(&self, topic: &str, payload: Bytes) -> Result<(), RouteError> {
        if payload.is_empty() {
            match self.remove_retained(topic) {
                Err(RouteError::NotFound) => Ok(()),
                result => result,
            }
        } else {
            self.insert_retained(topic, payload)
        }
    }

    pub fn subscribe(
        &self,
        filter: &str,
        subscription: Subscription,
    ) -> Result<SubscriptionToken, RouteError> {
        let filter: TopicFilter = filter.parse()?;

        debug!("Client {} subscribing to \"{}\"", subscription.client_id, filter);

        Ok(self.subscriptions.write().insert(&filter, subscription))
    }

    pub fn unsubscribe(&self, filter: &str, token: SubscriptionToken) -> Result<(), RouteError> {
        let filter: TopicFilter = filter.parse()?;

        match self.subscriptions.write().remove(&filter, token) {
            Some(subscription) => {
                debug!("Client {} unsubscribed from \"{}\"", subscription.client_id, filter);
                Ok(())
            },
            None => Err(RouteError::NotFound),
        }
    }

    /// Call `sub_fn` for every subscription matching a published topic.
    pub fn matching_subscribers<F: FnMut(&Subscription)>(
        &self,
        topic: &str,
        sub_fn: F,
    ) -> Result<(), RouteError> {
        let topic: Topic = topic.parse()?;

        self.subscriptions.read().matching_subscribers(&topic, sub_fn);

        Ok(())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
