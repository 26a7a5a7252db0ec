//! What the landowner intends to do with the parcel.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum UserIntent {
    Housing,
    Industry,
    Solar,
    Agriculture,
    Preserve,
    #[default]
    Mixed,
}

impl UserIntent {
    pub const ALL: [UserIntent; 6] = [
        UserIntent::Housing,
        UserIntent::Industry,
        UserIntent::Solar,
        UserIntent::Agriculture,
        UserIntent::Preserve,
        UserIntent::Mixed,
    ];

    /// Parses either a canonical key (`"housing"`) or a free-form plan title
    /// (`"Set up Solar Farm"`). Anything unrecognised is treated as mixed use.
    pub fn from_label(label: &str) -> UserIntent {
        let lower = label.trim().to_ascii_lowercase();
        if lower.contains("solar") {
            UserIntent::Solar
        } else if lower.contains("housing") || lower.contains("residential") {
            UserIntent::Housing
        } else if lower.contains("industr") {
            UserIntent::Industry
        } else if lower.contains("farm") || lower.contains("agri") {
            UserIntent::Agriculture
        } else if lower.contains("preserve")
            || lower.contains("conserv")
            || lower.contains("eco")
        {
            UserIntent::Preserve
        } else {
            UserIntent::Mixed
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UserIntent::Housing => "Build Housing",
            UserIntent::Industry => "Lease for Industry",
            UserIntent::Solar => "Set up Solar Farm",
            UserIntent::Agriculture => "Continue Farming",
            UserIntent::Preserve => "Eco-Tourism / Conservation",
            UserIntent::Mixed => "Mixed-Use Development",
        }
    }

    pub fn is_solar(self) -> bool {
        matches!(self, UserIntent::Solar)
    }
}

impl From<String> for UserIntent {
    fn from(label: String) -> Self {
        UserIntent::from_label(&label)
    }
}
