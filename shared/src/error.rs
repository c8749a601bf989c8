use thiserror::Error;

/// Error taxonomy for the RSVP component. Each failure class is terminal at
/// the point of occurrence: logged, recorded in page state for the view, and
/// returned to the caller. Nothing is re-thrown past the page boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RsvpError {
    #[error("Anonymous sign-in failed: {0}")]
    Identity(String),

    #[error("RSVP feed subscription failed: {0}")]
    Subscription(String),

    #[error("Failed to append RSVP: {0}")]
    Submission(String),

    #[error("Invalid RSVP form: {0}")]
    Validation(String),

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("An RSVP has already been submitted from this page")]
    AlreadySubmitted,

    #[error("Identity has not been resolved; submission is blocked")]
    IdentityRequired,
}

pub type Result<T> = std::result::Result<T, RsvpError>;
