//! Tags whose presence on a service follows a health check

use crate::check_type::{CheckType, CheckTypes};
use serde::{Deserialize, Serialize};

/// DynamicTag pairs a tag name with the check that decides whether the tag
/// is advertised. The check fields sit next to `name` in configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicTag {
    pub name: String,

    #[serde(flatten)]
    pub check: CheckType,
}

impl DynamicTag {
    pub fn new(name: impl Into<String>, check: CheckType) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }

    /// Whether the embedded check is complete enough to run
    pub fn is_valid(&self) -> bool {
        self.check.is_valid()
    }
}

/// Ordered collection of dynamic tags
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicTags(pub Vec<DynamicTag>);

impl DynamicTags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Tag names in order, valid or not
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|tag| tag.name.clone()).collect()
    }

    /// Embedded checks in order, valid or not; the check runner decides
    /// activation by running them
    pub fn check_types(&self) -> CheckTypes {
        self.0.iter().map(|tag| tag.check.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DynamicTag> {
        self.0.iter()
    }
}

impl From<Vec<DynamicTag>> for DynamicTags {
    fn from(tags: Vec<DynamicTag>) -> Self {
        Self(tags)
    }
}

impl FromIterator<DynamicTag> for DynamicTags {
    fn from_iter<I: IntoIterator<Item = DynamicTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DynamicTags {
    type Item = DynamicTag;
    type IntoIter = std::vec::IntoIter<DynamicTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DynamicTags {
    type Item = &'a DynamicTag;
    type IntoIter = std::slice::Iter<'a, DynamicTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ttl_tag(name: &str) -> DynamicTag {
        DynamicTag::new(
            name,
            CheckType {
                ttl: Duration::from_secs(15),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_accessors_do_not_filter() {
        let tags: DynamicTags = vec![
            ttl_tag("leader"),
            DynamicTag::new("broken", CheckType::default()),
            ttl_tag("replica"),
        ]
        .into();

        assert_eq!(tags.names(), vec!["leader", "broken", "replica"]);

        let checks = tags.check_types();
        assert_eq!(checks.len(), tags.len());
        assert!(checks[0].is_valid());
        assert!(!checks[1].is_valid());
        assert!(checks[2].is_valid());
    }

    #[test]
    fn test_empty_collection() {
        let tags = DynamicTags::new();
        assert!(tags.names().is_empty());
        assert!(tags.check_types().is_empty());
    }

    #[test]
    fn test_check_fields_are_inline_in_config() {
        let tags: DynamicTags = serde_json::from_str(
            r#"[{"name":"master","script":"/usr/local/bin/is_master","interval":"5s"}]"#,
        )
        .unwrap();

        let tag = tags.iter().next().unwrap();
        assert_eq!(tag.name, "master");
        assert_eq!(tag.check.script, "/usr/local/bin/is_master");
        assert_eq!(tag.check.interval, Duration::from_secs(5));
        assert!(tag.is_valid());
    }
}
