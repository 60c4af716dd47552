use crate::topic::{Topic, TopicFilter, TopicLevel};
use std::collections::HashMap;

/// Identifies one subscription within a `SubscriptionTree`, handed out
/// by `insert` and required by `remove`.
pub type SubscriptionToken = u64;

#[derive(Debug)]
struct SubscriptionTreeNode<T> {
    subscribers: Vec<(SubscriptionToken, T)>,
    single_level_wildcards: Option<Box<SubscriptionTreeNode<T>>>,
    multi_level_wildcards: Vec<(SubscriptionToken, T)>,
    children: HashMap<String, SubscriptionTreeNode<T>>,
}

/// Trie keyed by subscription filters. Matching runs in the reverse
/// direction from the retained tree: a concrete published topic walks
/// the filter trie, visiting `+` and `#` branches during traversal.
#[derive(Debug)]
pub struct SubscriptionTree<T> {
    root: SubscriptionTreeNode<T>,
    counter: SubscriptionToken,
}

impl<T> SubscriptionTree<T> {
    pub fn new() -> Self {
        Self { root: SubscriptionTreeNode::new(), counter: 0 }
    }

    pub fn insert(&mut self, filter: &TopicFilter, value: T) -> SubscriptionToken {
        let token = self.counter;
        self.counter += 1;

        let levels: Vec<TopicLevel> = filter.levels().collect();
        self.root.insert(&levels, token, value);

        token
    }

    pub fn remove(&mut self, filter: &TopicFilter, token: SubscriptionToken) -> Option<T> {
        let levels: Vec<TopicLevel> = filter.levels().collect();
        self.root.remove(&levels, token)
    }

    /// Call `sub_fn` for every subscriber whose filter matches `topic`.
    pub fn matching_subscribers<F: FnMut(&T)>(&self, topic: &Topic, mut sub_fn: F) {
        let levels: Vec<TopicLevel> = topic.levels().collect();
        self.root.matching_subscribers(&levels, &mut sub_fn);
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl<T> Default for SubscriptionTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SubscriptionTreeNode<T> {
    fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            single_level_wildcards: None,
            multi_level_wildcards: Vec::new(),
            children: HashMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
            && self.single_level_wildcards.is_none()
            && self.multi_level_wildcards.is_empty()
            && self.children.is_empty()
    }

    fn insert(&mut self, levels: &[TopicLevel], token: SubscriptionToken, value: T) {
        match levels.split_first() {
            None => self.subscribers.push((token, value)),
            // Validation guarantees '#' is the final level.
            Some((TopicLevel::MultiLevelWildcard, _)) => {
                self.multi_level_wildcards.push((token, value))
            },
            Some((TopicLevel::SingleLevelWildcard, rest)) => self
                .single_level_wildcards
                .get_or_insert_with(|| Box::new(SubscriptionTreeNode::new()))
                .insert(rest, token, value),
            Some((TopicLevel::Concrete(level), rest)) => self
                .children
                .entry((*level).to_string())
                .or_insert_with(SubscriptionTreeNode::new)
                .insert(rest, token, value),
        }
    }

    fn remove(&mut self, levels: &[TopicLevel], token: SubscriptionToken) -> Option<T> {
        match levels.split_first() {
            None => Self::take_subscriber(&mut self.subscribers, token),
            Some((TopicLevel::MultiLevelWildcard, _)) => {
                Self::take_subscriber(&mut self.multi_level_wildcards, token)
            },
            Some((TopicLevel::SingleLevelWildcard, rest)) => {
                let child = self.single_level_wildcards.as_mut()?;
                let removed = child.remove(rest, token)?;

                if child.is_empty() {
                    self.single_level_wildcards = None;
                }

                Some(removed)
            },
            Some((TopicLevel::Concrete(level), rest)) => {
                let child = self.children.get_mut(*level)?;
                let removed = child.remove(rest, token)?;

                if child.is_empty() {
                    self.children.remove(*level);
                }

                Some(removed)
            },
        }
    }

    fn take_subscriber(
        subscribers: &mut Vec<(SubscriptionToken, T)>,
        token: SubscriptionToken,
    ) -> Option<T> {
        let position = subscribers.iter().position(|(t, _)| *t == token)?;

        Some(subscribers.remove(position).1)
    }

    fn matching_subscribers<F: FnMut(&T)>(&self, levels: &[TopicLevel], sub_fn: &mut F) {
        // '#' absorbs the current level and everything below it, so
        // these subscribers match at every depth along the path.
        for (_, subscriber) in &self.multi_level_wildcards {
            sub_fn(subscriber);
        }

        let (level, rest) = match levels.split_first() {
            Some((TopicLevel::Concrete(level), rest)) => (*level, rest),
            Some(_) => unreachable!("published topics contain no wildcard levels"),
            None => {
                for (_, subscriber) in &self.subscribers {
                    sub_fn(subscriber);
                }
                return;
            },
        };

        if let Some(child) = &self.single_level_wildcards {
            child.matching_subscribers(rest, sub_fn);
        }

        if let Some(child) = self.children.get(level) {
            child.matching_subscribers(rest, sub_fn);
        }
    }
}
