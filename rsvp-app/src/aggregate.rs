use rsvp_shared::models::RsvpRecord;

/// Total confirmed attendee count over the currently materialized records.
///
/// A record with an absent or undecodable `guests` field counts as a single
/// guest rather than failing the aggregate. The sum saturates: documents
/// written out of band can carry any `u32`, and a broken count must not
/// take the page down.
pub fn aggregate(records: &[RsvpRecord]) -> u32 {
    records
        .iter()
        .fold(0u32, |total, r| total.saturating_add(r.guests.unwrap_or(1)))
}
