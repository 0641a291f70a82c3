use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The closed set of agents the orchestrator can hand work to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize,
)]
pub enum AgentKind {
    /// Strong model.
    #[strum(serialize = "SONNETagent")]
    #[serde(rename = "SONNETagent")]
    Sonnet,
    /// Fast model.
    #[strum(serialize = "HAIKUagent")]
    #[serde(rename = "HAIKUagent")]
    Haiku,
    /// Repeats its input back.
    #[default]
    #[strum(serialize = "TEXTagent")]
    #[serde(rename = "TEXTagent")]
    Text,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Sonnet, AgentKind::Haiku, AgentKind::Text];

    /// Map an identifier to an agent, falling back to [`AgentKind::Text`].
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.trim().parse() {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(identifier, "unknown agent identifier; using TEXTagent");
                Self::Text
            }
        }
    }

    /// One-line description used in the orchestrator prompt.
    pub fn description(self) -> &'static str {
        match self {
            Self::Sonnet => "a strong LLM",
            Self::Haiku => "a fast LLM",
            Self::Text => "repeats back text",
        }
    }
}

/// Missing, `null` and unknown identifiers all resolve to the identity agent.
impl<'de> Deserialize<'de> for AgentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let identifier = Option::<String>::deserialize(deserializer)?;
        Ok(identifier
            .as_deref()
            .map(Self::from_identifier)
            .unwrap_or_default())
    }
}
