use log::warn;
use rsvp_shared::models::{RsvpRecord, Snapshot};

/// Decodes a snapshot into records, in provider order.
///
/// Each snapshot is authoritative and wholly replaces the previous list; no
/// diffing or merging across snapshots happens at this layer. A document
/// that fails to decode is logged and skipped so one bad write cannot blank
/// the whole list.
pub fn parse_snapshot(snapshot: &Snapshot) -> Vec<RsvpRecord> {
    snapshot
        .documents
        .iter()
        .filter_map(|doc| match RsvpRecord::from_document(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable RSVP document {}: {}", doc.id, e);
                None
            }
        })
        .collect()
}
