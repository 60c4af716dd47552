use crate::topic::{Topic, TopicFilter, TopicLevel};
use std::collections::HashMap;

/// One topic level boundary. A node with neither a retained value nor
/// children is pruned eagerly, so it never survives a remove.
#[derive(Debug)]
struct RetainedMessageTreeNode<T> {
    retained_value: Option<T>,
    children: HashMap<String, RetainedMessageTreeNode<T>>,
}

/// Trie of retained messages keyed by concrete topic. Wildcards never
/// appear in the stored keys; they only drive the `matches` traversal.
#[derive(Debug)]
pub struct RetainedMessageTree<T> {
    root: RetainedMessageTreeNode<T>,
}

impl<T> RetainedMessageTree<T> {
    pub fn new() -> Self {
        Self { root: RetainedMessageTreeNode::new() }
    }

    /// Store a retained value at `topic`, creating intermediate nodes as
    /// needed. Returns the previously retained value, if any.
    pub fn insert(&mut self, topic: &Topic, value: T) -> Option<T> {
        let mut current = &mut self.root;

        for level in topic.levels() {
            match level {
                TopicLevel::Concrete(level) => {
                    current = current
                        .children
                        .entry(level.to_string())
                        .or_insert_with(RetainedMessageTreeNode::new);
                },
                TopicLevel::SingleLevelWildcard | TopicLevel::MultiLevelWildcard => {
                    unreachable!("concrete topics contain no wildcard levels");
                },
            }
        }

        current.retained_value.replace(value)
    }

    /// Remove the retained value at `topic`, pruning ancestor nodes left
    /// with no value and no children. Returns `None` when no value was
    /// stored at the topic.
    pub fn remove(&mut self, topic: &Topic) -> Option<T> {
        let levels: Vec<TopicLevel> = topic.levels().collect();
        self.root.remove(&levels)
    }

    /// The retained values whose topics match `filter`. No ordering is
    /// guaranteed among the results.
    pub fn matches(&self, filter: &TopicFilter) -> impl Iterator<Item = &T> {
        let mut matches = Vec::new();
        let levels: Vec<TopicLevel> = filter.levels().collect();
        self.root.matches(&levels, &mut matches);

        matches.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl<T> Default for RetainedMessageTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RetainedMessageTreeNode<T> {
    fn new() -> Self {
        Self { retained_value: None, children: HashMap::new() }
    }

    fn is_empty(&self) -> bool {
        self.retained_value.is_none() && self.children.is_empty()
    }

    fn remove(&mut self, levels: &[TopicLevel]) -> Option<T> {
        let (level, rest) = match levels.split_first() {
            Some((TopicLevel::Concrete(level), rest)) => (*level, rest),
            Some(_) => unreachable!("concrete topics contain no wildcard levels"),
            None => return self.retained_value.take(),
        };

        let child = self.children.get_mut(level)?;
        let removed = child.remove(rest)?;

        if child.is_empty() {
            self.children.remove(level);
        }

        Some(removed)
    }

    fn matches<'a>(&'a self, levels: &[TopicLevel], matches: &mut Vec<&'a T>) {
        let mut node_stack = vec![(self, 0)];

        while let Some((node, level_index)) = node_stack.pop() {
            match &levels[level_index] {
                TopicLevel::MultiLevelWildcard => {
                    // '#' absorbs zero or more trailing levels, so the
                    // node it hangs off matches as well.
                    node.collect_retained(matches);
                },
                TopicLevel::SingleLevelWildcard => {
                    for child in node.children.values() {
                        if level_index + 1 < levels.len() {
                            node_stack.push((child, level_index + 1));
                        } else if let Some(value) = child.retained_value.as_ref() {
                            matches.push(value);
                        }
                    }
                },
                TopicLevel::Concrete(level) => {
                    if let Some(child) = node.children.get(*level) {
                        if level_index + 1 < levels.len() {
                            node_stack.push((child, level_index + 1));
                        } else if let Some(value) = child.retained_value.as_ref() {
                            matches.push(value);
                        }
                    }
                },
            }
        }
    }

    /// Append this node's retained value and those of all descendants.
    fn collect_retained<'a>(&'a self, matches: &mut Vec<&'a T>) {
        if let Some(value) = self.retained_value.as_ref() {
            matches.push(value);
        }

        for child in self.children.values() {
            child.collect_retained(matches);
        }
    }
}
