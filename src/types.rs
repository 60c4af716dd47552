use crate::topic::TopicParseError;
use num_enum::TryFromPrimitive;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum QoS {
    AtMostOnce = 0,  // QoS 0
    AtLeastOnce = 1, // QoS 1
    ExactlyOnce = 2, // QoS 2
}

/// One subscriber entry in the subscription trie: who to deliver to,
/// and the maximum QoS granted for this subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub client_id: String,
    pub maximum_qos: QoS,
}

/// Errors surfaced by the broker-facing routing API.
#[derive(Debug, PartialEq)]
pub enum RouteError {
    /// The topic or filter violates the level-separator or
    /// wildcard-placement grammar.
    MalformedTopic(TopicParseError),
    /// Remove or unsubscribe targeted an entry that does not exist.
    NotFound,
}

impl From<TopicParseError> for RouteError {
    fn from(err: TopicParseError) -> RouteError {
        RouteError::MalformedTopic(err)
    }
}
