use serde::{Deserialize, Serialize};
use std::fmt;

/// The chat-channel identifier, also the Campaign primary key (spec §3: "one
/// campaign per channel").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

impl CampaignId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CampaignId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Chat platform an interaction arrived on. `Display` matches the literal
/// strings used as the second half of the Host composite key and in the
/// dedup ledger's `source` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSource {
    Discord,
    Whatsapp,
}

impl fmt::Display for ChatSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatSource::Discord => write!(f, "discord"),
            ChatSource::Whatsapp => write!(f, "whatsapp"),
        }
    }
}

impl std::str::FromStr for ChatSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discord" => Ok(ChatSource::Discord),
            "whatsapp" => Ok(ChatSource::Whatsapp),
            other => Err(format!("unknown chat source: {other}")),
        }
    }
}

/// One of the five pipeline stages. Used as the dedup ledger's key prefix —
/// spec.md §9 requires the prefix on *every* write, no exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Configuring,
    Birthing,
    Blueprinting,
    Play,
    Imagegen,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Configuring => write!(f, "configuring"),
            Stage::Birthing => write!(f, "birthing"),
            Stage::Blueprinting => write!(f, "blueprinting"),
            Stage::Play => write!(f, "play"),
            Stage::Imagegen => write!(f, "imagegen"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignType {
    Short,
    Long,
    Epic,
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignType::Short => write!(f, "short"),
            CampaignType::Long => write!(f, "long"),
            CampaignType::Epic => write!(f, "epic"),
        }
    }
}

impl std::str::FromStr for CampaignType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(CampaignType::Short),
            "long" => Ok(CampaignType::Long),
            "epic" => Ok(CampaignType::Epic),
            other => Err(format!("unknown campaign type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionModel {
    Host,
    Flexible,
    Group,
}

impl std::str::FromStr for DecisionModel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(DecisionModel::Host),
            "flexible" => Ok(DecisionModel::Flexible),
            "group" => Ok(DecisionModel::Group),
            other => Err(format!("unknown decision model: {other}")),
        }
    }
}

/// Model-class tags referenced by `Campaign.modelPolicy` — mapped to
/// concrete vendor model ids + token budgets by `syrus-llm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelClass {
    Haiku,
    Sonnet,
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelClass::Haiku => write!(f, "haiku"),
            ModelClass::Sonnet => write!(f, "sonnet"),
        }
    }
}

// ── Dynamic command-option tree (Design Notes §9) ──────────────────────────

/// A chat-platform command option. Commands arrive as nested heterogeneous
/// maps; we model them as a tagged-variant tree rather than decoding into a
/// fixed struct per command, since the shape varies by sub-command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    pub value: OptionValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Scalar(serde_json::Value),
    Sequence(Vec<CommandOption>),
}

impl CommandOption {
    /// Path-based accessor: `opt.opt("start")?.opt("type")?.as_str()`.
    /// Only descends into `Sequence` options; returns `None` past a leaf.
    pub fn opt(&self, name: &str) -> Option<&CommandOption> {
        match &self.value {
            OptionValue::Sequence(children) => children.iter().find(|c| c.name == name),
            OptionValue::Scalar(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            OptionValue::Scalar(v) => v.as_str(),
            OptionValue::Sequence(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            OptionValue::Scalar(v) => v.as_bool(),
            OptionValue::Sequence(_) => None,
        }
    }

    /// Find an option by name within a top-level slice (the shape the
    /// gateway sees for a command's `options` array before any single
    /// `CommandOption` root exists).
    pub fn find<'a>(options: &'a [CommandOption], name: &str) -> Option<&'a CommandOption> {
        options.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_accessor_descends_sequences() {
        let root = CommandOption {
            name: "syrus".into(),
            value: OptionValue::Sequence(vec![CommandOption {
                name: "start".into(),
                value: OptionValue::Sequence(vec![CommandOption {
                    name: "type".into(),
                    value: OptionValue::Scalar(serde_json::json!("short")),
                }]),
            }]),
        };
        let v = root.opt("start").and_then(|o| o.opt("type")).and_then(|o| o.as_str());
        assert_eq!(v, Some("short"));
    }

    #[test]
    fn path_accessor_missing_segment_is_none() {
        let root = CommandOption {
            name: "syrus".into(),
            value: OptionValue::Sequence(vec![]),
        };
        assert!(root.opt("start").is_none());
    }

    #[test]
    fn chat_source_roundtrips_through_display_and_fromstr() {
        use std::str::FromStr;
        assert_eq!(ChatSource::from_str("discord").unwrap().to_string(), "discord");
        assert_eq!(ChatSource::from_str("whatsapp").unwrap().to_string(), "whatsapp");
        assert!(ChatSource::from_str("bogus").is_err());
    }
}
