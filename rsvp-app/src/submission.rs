use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rsvp_shared::error::{Result, RsvpError};
use rsvp_shared::models::{now_str, Identity};

pub const MIN_GUESTS: u32 = 1;
pub const MAX_GUESTS: u32 = 5;

/// User-entered RSVP form data, validated before any write is attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsvpForm {
    pub name: String,
    pub email: String,
    pub guests: u32,
    #[serde(rename = "favoriteGames", default)]
    pub favorite_games: String,
    #[serde(default)]
    pub dietary: String,
}

impl Default for RsvpForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            guests: 1,
            favorite_games: String::new(),
            dietary: String::new(),
        }
    }
}

impl RsvpForm {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RsvpError::Validation("name is required".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(RsvpError::Validation("email is required".to_string()));
        }
        if !(MIN_GUESTS..=MAX_GUESTS).contains(&self.guests) {
            return Err(RsvpError::Validation(format!(
                "guests must be between {} and {}, got {}",
                MIN_GUESTS, MAX_GUESTS, self.guests
            )));
        }
        Ok(())
    }

    /// The wire document for this form: the entered values unioned with a
    /// client-set timestamp and the submitting identity's uid.
    pub fn to_document(&self, identity: &Identity) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("name".to_string(), Value::String(self.name.clone()));
        data.insert("email".to_string(), Value::String(self.email.clone()));
        data.insert("guests".to_string(), Value::from(self.guests));
        data.insert(
            "favoriteGames".to_string(),
            Value::String(self.favorite_games.clone()),
        );
        data.insert("dietary".to_string(), Value::String(self.dietary.clone()));
        data.insert("timestamp".to_string(), Value::String(now_str()));
        data.insert("userId".to_string(), Value::String(identity.uid.clone()));
        data
    }
}

/// Submission lifecycle. The tagged variants make the no-double-submit
/// invariant structural: `begin` is the only way into `Submitting`, and it
/// refuses while a call is in flight or after one has succeeded. A failed
/// submission may retry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Submitted,
    Failed {
        message: String,
    },
}

impl SubmissionPhase {
    pub fn begin(&mut self) -> Result<()> {
        match self {
            SubmissionPhase::Idle | SubmissionPhase::Failed { .. } => {
                *self = SubmissionPhase::Submitting;
                Ok(())
            }
            SubmissionPhase::Submitting => Err(RsvpError::SubmissionInFlight),
            SubmissionPhase::Submitted => Err(RsvpError::AlreadySubmitted),
        }
    }

    pub fn complete(&mut self) {
        *self = SubmissionPhase::Submitted;
    }

    pub fn fail(&mut self, message: String) {
        *self = SubmissionPhase::Failed { message };
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionPhase::Submitted)
    }
}
