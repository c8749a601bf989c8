//! Live RSVP page for the New Year's Eve board-game party.
//!
//! The page wires five pieces together: an anonymous identity bootstrap, a
//! realtime RSVP feed with full-snapshot replacement, a derived total guest
//! count, a validated exactly-once submission path, and a one-second
//! countdown to midnight. The identity and collection backends are injected
//! as traits so the whole page runs against in-memory fakes in tests.

pub mod aggregate;
pub mod config;
pub mod countdown;
pub mod feed;
pub mod page;
pub mod submission;
pub mod view;

pub use config::AppConfig;
pub use page::EventPage;
pub use submission::{RsvpForm, SubmissionPhase};
pub use view::PageView;
