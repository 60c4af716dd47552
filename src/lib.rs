pub const TOPIC_SEPARATOR: char = '/';

pub const MULTI_LEVEL_WILDCARD: char = '#';
pub const MULTI_LEVEL_WILDCARD_STR: &str = "#";

pub const SINGLE_LEVEL_WILDCARD: char = '+';
pub const SINGLE_LEVEL_WILDCARD_STR: &str = "+";

pub const MAX_TOPIC_LEN_BYTES: usize = 65_535;

/// Upper bound on the number of levels in a topic or filter. Tree walks
/// visit one node per level, so inputs with thousands of levels are
/// rejected during validation instead of walked.
pub const MAX_TOPIC_LEVELS: usize = 128;

pub mod retained;
pub mod router;
pub mod subscription;
pub mod topic;
pub mod types;
