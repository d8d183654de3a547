use serde::{Deserialize, Serialize};

/// Tone bucket the negotiator reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentCategory {
    Polite,
    Neutral,
    Negative,
}

impl SentimentCategory {
    pub const ALL: [Self; 3] = [Self::Polite, Self::Neutral, Self::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    /// Maps a raw three-class classifier label onto a domain bucket.
    ///
    /// Accepts both the positional labels emitted by the twitter-roberta
    /// sentiment checkpoints (`LABEL_0`..`LABEL_2`) and their named
    /// equivalents. Anything unrecognised lands in `Neutral`.
    pub fn from_model_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "label_2" | "positive" => Self::Polite,
            "label_0" | "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

impl std::fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
