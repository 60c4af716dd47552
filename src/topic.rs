use crate::{
    MAX_TOPIC_LEN_BYTES, MAX_TOPIC_LEVELS, MULTI_LEVEL_WILDCARD, MULTI_LEVEL_WILDCARD_STR,
    SINGLE_LEVEL_WILDCARD, SINGLE_LEVEL_WILDCARD_STR, TOPIC_SEPARATOR,
};
use std::{fmt, str::FromStr};

#[derive(Debug, PartialEq)]
pub enum TopicParseError {
    EmptyTopic,
    TopicTooLong,
    TooManyLevels,
    MultilevelWildcardNotAtEnd,
    InvalidWildcardLevel,
    WildcardOrNullInTopic,
}

/// Split a topic string into its first level and the remainder after the
/// separator. `None` means the input held no further separator; `Some("")`
/// means the separator was the final byte, i.e. a trailing empty level
/// follows. Empty levels are legal and must not be collapsed.
///
/// Validates wildcard placement for the level it returns: `#` must be a
/// standalone final level, `+` must be a whole level, and neither may
/// appear inside a longer level.
pub fn next_level(topic: &str) -> Result<(&str, Option<&str>), TopicParseError> {
    let (level, remainder) = match topic.find(TOPIC_SEPARATOR) {
        Some(separator) => (&topic[..separator], Some(&topic[separator + 1..])),
        None => (topic, None),
    };

    match level {
        MULTI_LEVEL_WILDCARD_STR => {
            if remainder.is_some() {
                return Err(TopicParseError::MultilevelWildcardNotAtEnd);
            }
        },
        SINGLE_LEVEL_WILDCARD_STR => {},
        _ => {
            if level.contains(|x: char| x == SINGLE_LEVEL_WILDCARD || x == MULTI_LEVEL_WILDCARD) {
                return Err(TopicParseError::InvalidWildcardLevel);
            }
        },
    }

    Ok((level, remainder))
}

/// If Ok, returns (level_count, contains_wildcards).
fn process_filter(filter: &str) -> Result<(u32, bool), TopicParseError> {
    let mut level_count = 0;
    let mut contains_wildcards = false;
    let mut rest = filter;

    loop {
        let (level, remainder) = next_level(rest)?;

        level_count += 1;
        if level_count as usize > MAX_TOPIC_LEVELS {
            return Err(TopicParseError::TooManyLevels);
        }

        if level == SINGLE_LEVEL_WILDCARD_STR || level == MULTI_LEVEL_WILDCARD_STR {
            contains_wildcards = true;
        }

        match remainder {
            Some(remainder) => rest = remainder,
            None => break,
        }
    }

    Ok((level_count, contains_wildcards))
}

/// A filter for subscribers to indicate which topics they want
/// to receive messages from. Can contain wildcards.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicFilter {
    Concrete { filter: String, level_count: u32 },
    Wildcard { filter: String, level_count: u32 },
}

/// A topic name publishers use when sending MQTT messages.
/// Cannot contain wildcards.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    topic_name: String,
    level_count: u32,
}

#[derive(Debug, PartialEq)]
pub enum TopicLevel<'a> {
    Concrete(&'a str),
    SingleLevelWildcard,
    MultiLevelWildcard,
}

impl FromStr for TopicFilter {
    type Err = TopicParseError;

    fn from_str(filter: &str) -> Result<Self, Self::Err> {
        // Filters and topics cannot be empty
        if filter.is_empty() {
            return Err(TopicParseError::EmptyTopic);
        }

        if filter.contains('\0') {
            return Err(TopicParseError::WildcardOrNullInTopic);
        }

        // Filters cannot exceed the byte length in the MQTT spec
        if filter.len() > MAX_TOPIC_LEN_BYTES {
            return Err(TopicParseError::TopicTooLong);
        }

        let (level_count, contains_wildcards) = process_filter(filter)?;

        let topic_filter = if contains_wildcards {
            TopicFilter::Wildcard { filter: filter.to_string(), level_count }
        } else {
            TopicFilter::Concrete { filter: filter.to_string(), level_count }
        };

        Ok(topic_filter)
    }
}

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(topic: &str) -> Result<Self, Self::Err> {
        // Topics cannot be empty
        if topic.is_empty() {
            return Err(TopicParseError::EmptyTopic);
        }

        // Topics cannot exceed the byte length in the MQTT spec
        if topic.len() > MAX_TOPIC_LEN_BYTES {
            return Err(TopicParseError::TopicTooLong);
        }

        // Topics cannot contain wildcards or null characters
        if topic.contains(|x: char| {
            x == SINGLE_LEVEL_WILDCARD || x == MULTI_LEVEL_WILDCARD || x == '\0'
        }) {
            return Err(TopicParseError::WildcardOrNullInTopic);
        }

        let level_count = topic.split(TOPIC_SEPARATOR).count() as u32;

        if level_count as usize > MAX_TOPIC_LEVELS {
            return Err(TopicParseError::TooManyLevels);
        }

        Ok(Topic { topic_name: topic.to_string(), level_count })
    }
}

pub struct TopicLevels<'a> {
    levels_iter: std::str::Split<'a, char>,
}

impl<'a> TopicFilter {
    pub fn filter(&'a self) -> &'a str {
        match self {
            TopicFilter::Concrete { filter, .. } => filter,
            TopicFilter::Wildcard { filter, .. } => filter,
        }
    }

    pub fn levels(&'a self) -> TopicLevels<'a> {
        TopicLevels { levels_iter: self.filter().split(TOPIC_SEPARATOR) }
    }
}

impl<'a> Topic {
    pub fn topic_name(&'a self) -> &'a str {
        &self.topic_name
    }

    pub fn levels(&'a self) -> TopicLevels<'a> {
        TopicLevels { levels_iter: self.topic_name.split(TOPIC_SEPARATOR) }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.topic_name)
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filter())
    }
}

impl<'a> Iterator for TopicLevels<'a> {
    type Item = TopicLevel<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.levels_iter.next() {
            Some(MULTI_LEVEL_WILDCARD_STR) => Some(TopicLevel::MultiLevelWildcard),
            Some(SINGLE_LEVEL_WILDCARD_STR) => Some(TopicLevel::SingleLevelWildcard),
            Some(level) => Some(TopicLevel::Concrete(level)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        topic::{next_level, Topic, TopicFilter, TopicLevel, TopicParseError},
        MAX_TOPIC_LEN_BYTES, MAX_TOPIC_LEVELS,
    };

    #[test]
    fn test_next_level_splits_at_first_separator() {
        assert_eq!(next_level("home/kitchen/temperature"), Ok(("home", Some("kitchen/temperature"))));
        assert_eq!(next_level("kitchen/temperature"), Ok(("kitchen", Some("temperature"))));
        assert_eq!(next_level("temperature"), Ok(("temperature", None)));
    }

    #[test]
    fn test_next_level_preserves_empty_levels() {
        assert_eq!(next_level("/finance"), Ok(("", Some("finance"))));
        assert_eq!(next_level("finance/"), Ok(("finance", Some(""))));
        assert_eq!(next_level(""), Ok(("", None)));
        assert_eq!(next_level("/"), Ok(("", Some(""))));
    }

    #[test]
    fn test_next_level_wildcard_validation() {
        assert_eq!(next_level("+"), Ok(("+", None)));
        assert_eq!(next_level("+/tennis"), Ok(("+", Some("tennis"))));
        assert_eq!(next_level("#"), Ok(("#", None)));

        assert_eq!(next_level("#/tennis"), Err(TopicParseError::MultilevelWildcardNotAtEnd));
        assert_eq!(next_level("#/"), Err(TopicParseError::MultilevelWildcardNotAtEnd));
        assert_eq!(next_level("tennis+"), Err(TopicParseError::InvalidWildcardLevel));
        assert_eq!(next_level("tennis#"), Err(TopicParseError::InvalidWildcardLevel));
        assert_eq!(next_level("te+nnis/player1"), Err(TopicParseError::InvalidWildcardLevel));
    }

    #[test]
    fn test_topic_filter_parse_empty_topic() {
        assert_eq!("".parse::<TopicFilter>().unwrap_err(), TopicParseError::EmptyTopic);
    }

    #[test]
    fn test_topic_filter_parse_length() {
        let just_right_topic = "a".repeat(MAX_TOPIC_LEN_BYTES);
        assert!(just_right_topic.parse::<TopicFilter>().is_ok());

        let too_long_topic = "a".repeat(MAX_TOPIC_LEN_BYTES + 1);
        assert_eq!(
            too_long_topic.parse::<TopicFilter>().unwrap_err(),
            TopicParseError::TopicTooLong
        );
    }

    #[test]
    fn test_topic_filter_parse_depth() {
        let just_right_filter = vec!["a"; MAX_TOPIC_LEVELS].join("/");
        assert!(just_right_filter.parse::<TopicFilter>().is_ok());

        let too_deep_filter = vec!["a"; MAX_TOPIC_LEVELS + 1].join("/");
        assert_eq!(
            too_deep_filter.parse::<TopicFilter>().unwrap_err(),
            TopicParseError::TooManyLevels
        );
    }

    #[test]
    fn test_topic_parse_depth() {
        let too_deep_topic = vec!["a"; MAX_TOPIC_LEVELS + 1].join("/");
        assert_eq!(too_deep_topic.parse::<Topic>().unwrap_err(), TopicParseError::TooManyLevels);
    }

    #[test]
    fn test_topic_filter_parse_concrete() {
        assert_eq!(
            "/".parse::<TopicFilter>().unwrap(),
            TopicFilter::Concrete { filter: "/".to_string(), level_count: 2 }
        );

        assert_eq!(
            "a".parse::<TopicFilter>().unwrap(),
            TopicFilter::Concrete { filter: "a".to_string(), level_count: 1 }
        );

        assert_eq!(
            "home/kitchen".parse::<TopicFilter>().unwrap(),
            TopicFilter::Concrete { filter: "home/kitchen".to_string(), level_count: 2 }
        );

        assert_eq!(
            "home/kitchen/temperature".parse::<TopicFilter>().unwrap(),
            TopicFilter::Concrete {
                filter: "home/kitchen/temperature".to_string(),
                level_count: 3,
            }
        );
    }

    #[test]
    fn test_topic_filter_parse_single_level_wildcard() {
        assert_eq!(
            "+".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard { filter: "+".to_string(), level_count: 1 }
        );

        assert_eq!(
            "+/".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard { filter: "+/".to_string(), level_count: 2 }
        );

        assert_eq!(
            "sport/+".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard { filter: "sport/+".to_string(), level_count: 2 }
        );

        assert_eq!(
            "/+".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard { filter: "/+".to_string(), level_count: 2 }
        );
    }

    #[test]
    fn test_topic_filter_parse_multi_level_wildcard() {
        assert_eq!(
            "#".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard { filter: "#".to_string(), level_count: 1 }
        );

        assert_eq!(
            "#/".parse::<TopicFilter>().unwrap_err(),
            TopicParseError::MultilevelWildcardNotAtEnd
        );

        assert_eq!(
            "/#".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard { filter: "/#".to_string(), level_count: 2 }
        );

        assert_eq!(
            "sport/#".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard { filter: "sport/#".to_string(), level_count: 2 }
        );

        assert_eq!(
            "home/kitchen/temperature/#".parse::<TopicFilter>().unwrap(),
            TopicFilter::Wildcard {
                filter: "home/kitchen/temperature/#".to_string(),
                level_count: 4,
            }
        );
    }

    #[test]
    fn test_topic_filter_parse_invalid_filters() {
        assert_eq!(
            "sport/#/stats".parse::<TopicFilter>().unwrap_err(),
            TopicParseError::MultilevelWildcardNotAtEnd
        );
        assert_eq!(
            "#/stats".parse::<TopicFilter>().unwrap_err(),
            TopicParseError::MultilevelWildcardNotAtEnd
        );
        assert_eq!(
            "sport/tennis#".parse::<TopicFilter>().unwrap_err(),
            TopicParseError::InvalidWildcardLevel
        );
        assert_eq!(
            "sport/tennis+".parse::<TopicFilter>().unwrap_err(),
            TopicParseError::InvalidWildcardLevel
        );
        assert_eq!(
            "sport/++".parse::<TopicFilter>().unwrap_err(),
            TopicParseError::InvalidWildcardLevel
        );
    }

    #[test]
    fn test_topic_name_success() {
        assert_eq!(
            "/".parse::<Topic>().unwrap(),
            Topic { topic_name: "/".to_string(), level_count: 2 }
        );

        assert_eq!(
            "Accounts payable".parse::<Topic>().unwrap(),
            Topic { topic_name: "Accounts payable".to_string(), level_count: 1 }
        );

        assert_eq!(
            "home/kitchen".parse::<Topic>().unwrap(),
            Topic { topic_name: "home/kitchen".to_string(), level_count: 2 }
        );

        assert_eq!(
            "home/kitchen/temperature".parse::<Topic>().unwrap(),
            Topic { topic_name: "home/kitchen/temperature".to_string(), level_count: 3 }
        );
    }

    #[test]
    fn test_topic_name_failure() {
        assert_eq!("#".parse::<Topic>().unwrap_err(), TopicParseError::WildcardOrNullInTopic);

        assert_eq!("+".parse::<Topic>().unwrap_err(), TopicParseError::WildcardOrNullInTopic);

        assert_eq!("\0".parse::<Topic>().unwrap_err(), TopicParseError::WildcardOrNullInTopic);

        assert_eq!(
            "/multi/level/#".parse::<Topic>().unwrap_err(),
            TopicParseError::WildcardOrNullInTopic
        );

        assert_eq!(
            "/single/level/+".parse::<Topic>().unwrap_err(),
            TopicParseError::WildcardOrNullInTopic
        );

        assert_eq!(
            "/null/byte/\0".parse::<Topic>().unwrap_err(),
            TopicParseError::WildcardOrNullInTopic
        );
    }

    #[test]
    fn test_topic_filter_level_iterator_simple() {
        let filter: TopicFilter = "/".parse().unwrap();

        let mut levels = filter.levels();

        assert_eq!(levels.next(), Some(TopicLevel::Concrete("")));
        assert_eq!(levels.next(), Some(TopicLevel::Concrete("")));
        assert_eq!(levels.next(), None);
    }

    #[test]
    fn test_topic_filter_level_iterator_concrete() {
        let filter: TopicFilter = "home/kitchen/temperature".parse().unwrap();

        let mut levels = filter.levels();

        assert_eq!(levels.next(), Some(TopicLevel::Concrete("home")));
        assert_eq!(levels.next(), Some(TopicLevel::Concrete("kitchen")));
        assert_eq!(levels.next(), Some(TopicLevel::Concrete("temperature")));
        assert_eq!(levels.next(), None);
    }

    #[test]
    fn test_topic_filter_level_iterator_single_level_wildcard() {
        let filter: TopicFilter = "home/+/+/temperature/+".parse().unwrap();

        let mut levels = filter.levels();

        assert_eq!(levels.next(), Some(TopicLevel::Concrete("home")));
        assert_eq!(levels.next(), Some(TopicLevel::SingleLevelWildcard));
        assert_eq!(levels.next(), Some(TopicLevel::SingleLevelWildcard));
        assert_eq!(levels.next(), Some(TopicLevel::Concrete("temperature")));
        assert_eq!(levels.next(), Some(TopicLevel::SingleLevelWildcard));
        assert_eq!(levels.next(), None);
    }

    #[test]
    fn test_topic_filter_level_iterator_multi_level_wildcard() {
        let filter: TopicFilter = "home/kitchen/#".parse().unwrap();

        let mut levels = filter.levels();

        assert_eq!(levels.next(), Some(TopicLevel::Concrete("home")));
        assert_eq!(levels.next(), Some(TopicLevel::Concrete("kitchen")));
        assert_eq!(levels.next(), Some(TopicLevel::MultiLevelWildcard));
        assert_eq!(levels.next(), None);
    }
}
