//! Subscription selectors
//!
//! A subscription names the Kit resource a customer is added to. Settings,
//! product meta and coupon meta all store it as `"<type>:<id>"`.

use super::ids::ResourceId;
use super::resource::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kit resource a subscriber can be added to
///
/// # Examples
///
/// ```
/// use kitsync::domain::subscription::Subscription;
/// use std::str::FromStr;
///
/// let sub = Subscription::from_str("course:42").unwrap();
/// assert_eq!(sub.to_string(), "sequence:42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Subscription {
    Sequence(ResourceId),
    Form(ResourceId),
    Tag(ResourceId),
}

impl Subscription {
    /// Id of the targeted resource
    pub fn resource_id(&self) -> ResourceId {
        match self {
            Subscription::Sequence(id) | Subscription::Form(id) | Subscription::Tag(id) => *id,
        }
    }

    /// Resource kind the selector points at
    pub fn kind(&self) -> ResourceKind {
        match self {
            Subscription::Sequence(_) => ResourceKind::Sequences,
            Subscription::Form(_) => ResourceKind::Forms,
            Subscription::Tag(_) => ResourceKind::Tags,
        }
    }

    /// Parses an optional setting value, treating blank strings as unset
    pub fn parse_optional(value: &str) -> Result<Option<Self>, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscription::Sequence(id) => write!(f, "sequence:{id}"),
            Subscription::Form(id) => write!(f, "form:{id}"),
            Subscription::Tag(id) => write!(f, "tag:{id}"),
        }
    }
}

impl FromStr for Subscription {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("Invalid subscription '{s}': expected '<type>:<id>'"))?;

        let id = ResourceId::from_str(id)?;
        match kind.trim().to_ascii_lowercase().as_str() {
            "sequence" | "course" => Ok(Subscription::Sequence(id)),
            "form" => Ok(Subscription::Form(id)),
            "tag" => Ok(Subscription::Tag(id)),
            other => Err(format!(
                "Invalid subscription type '{other}': expected sequence, form or tag"
            )),
        }
    }
}

impl TryFrom<String> for Subscription {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Subscription> for String {
    fn from(sub: Subscription) -> Self {
        sub.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("form:12", Subscription::Form(ResourceId::new(12).unwrap()) ; "form")]
    #[test_case("tag:7", Subscription::Tag(ResourceId::new(7).unwrap()) ; "tag")]
    #[test_case("sequence:3", Subscription::Sequence(ResourceId::new(3).unwrap()) ; "sequence")]
    #[test_case("course:3", Subscription::Sequence(ResourceId::new(3).unwrap()) ; "legacy course")]
    #[test_case(" Tag:7 ", Subscription::Tag(ResourceId::new(7).unwrap()) ; "case and whitespace")]
    fn test_parse(input: &str, expected: Subscription) {
        assert_eq!(Subscription::from_str(input).unwrap(), expected);
    }

    #[test_case("12" ; "missing type")]
    #[test_case("list:12" ; "unknown type")]
    #[test_case("form:" ; "missing id")]
    #[test_case("form:0" ; "zero id")]
    fn test_parse_rejects(input: &str) {
        assert!(Subscription::from_str(input).is_err());
    }

    #[test]
    fn test_parse_optional_blank() {
        assert_eq!(Subscription::parse_optional("  ").unwrap(), None);
        assert!(Subscription::parse_optional("form:1").unwrap().is_some());
    }

    #[test]
    fn test_serde_uses_selector_string() {
        let sub = Subscription::Tag(ResourceId::new(9).unwrap());
        assert_eq!(serde_json::to_string(&sub).unwrap(), "\"tag:9\"");
        let back: Subscription = serde_json::from_str("\"course:9\"").unwrap();
        assert_eq!(back, Subscription::Sequence(ResourceId::new(9).unwrap()));
    }
}
