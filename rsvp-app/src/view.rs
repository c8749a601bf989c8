use std::fmt;

use crate::countdown::CountdownState;
use crate::submission::SubmissionPhase;
use rsvp_shared::error::RsvpError;

/// Immutable projection of page state for rendering: the countdown, the
/// guest total (or a loading placeholder), the submission phase, and any
/// recorded error so failures are visible instead of silently swallowed.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub countdown: CountdownState,
    pub total_guests: u32,
    pub loading: bool,
    pub phase: SubmissionPhase,
    pub error: Option<RsvpError>,
}

impl PageView {
    pub fn submitted(&self) -> bool {
        self.phase.is_submitted()
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "New Year's Eve Board-Game Night")?;

        // Display clamps at zero once midnight passes; the state itself
        // keeps ticking negative.
        writeln!(
            f,
            "{}d {:02}h {:02}m {:02}s until midnight",
            self.countdown.days.max(0),
            self.countdown.hours.max(0),
            self.countdown.minutes.max(0),
            self.countdown.seconds.max(0)
        )?;

        if self.loading {
            writeln!(f, "Counting guests...")?;
        } else {
            writeln!(f, "{} guests confirmed", self.total_guests)?;
        }

        if self.submitted() {
            writeln!(f, "Thanks for your RSVP. See you at midnight!")?;
        } else {
            writeln!(f, "RSVP below to join the table.")?;
        }

        if let Some(error) = &self.error {
            writeln!(f, "Something went wrong: {}", error)?;
        }

        Ok(())
    }
}
