use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    #[default]
    #[serde(rename = "")]
    Idle,
    Loading,
    Success,
    Error,
}

/// Serializes as `{"type": "...", "message": "..."}`, idle being an empty type
/// with an empty message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStatus {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    #[serde(
        default,
        serialize_with = "empty_when_none",
        deserialize_with = "none_when_empty"
    )]
    pub message: Option<String>,
}

impl SubmissionStatus {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            message: Some(message.into()),
        }
    }

    pub fn success(message: Option<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.kind == StatusKind::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.kind == StatusKind::Loading
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StatusKind::Success | StatusKind::Error)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

fn empty_when_none<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

fn none_when_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|message| !message.is_empty()))
}
