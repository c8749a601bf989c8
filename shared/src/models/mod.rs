use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Returns the current time as an RFC 3339 string, the format every
/// client-set timestamp in the collection uses.
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

/// An opaque anonymous principal, stable for the client session. Created
/// once per page load by the identity bootstrap and used solely to
/// attribute writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
}

/// One attendee/group's confirmation entry for the party.
///
/// Created exactly once by submission and never mutated or deleted by this
/// application. `guests` is tolerant on the read path: documents written by
/// older clients may carry it as a numeric string or omit it entirely, and
/// the aggregate treats those as 1 rather than failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsvpRecord {
    /// Assigned by the backing store; not present in the document body.
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_guests")]
    pub guests: Option<u32>,
    #[serde(default, rename = "favoriteGames")]
    pub favorite_games: String,
    #[serde(default)]
    pub dietary: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, rename = "userId")]
    pub user_id: String,
}

impl RsvpRecord {
    /// Decodes one wire document into a record. Unknown or missing fields
    /// fall back to their defaults; only a structurally broken document
    /// fails.
    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        let mut record: RsvpRecord = serde_json::from_value(Value::Object(doc.data.clone()))?;
        record.id = doc.id.clone();
        Ok(record)
    }
}

/// Accepts a JSON number or a numeric string; anything else (including a
/// missing field) becomes `None` and counts as a single guest downstream.
fn deserialize_guests<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as u32),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

/// One stored document as the realtime collaborator delivers it: a
/// store-assigned id plus a plain key/value body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

/// A complete point-in-time view of every document matching the subscribed
/// query. Each snapshot is authoritative and wholly replaces prior state;
/// the freshness metadata pair is delivered by the collaborator but unused
/// beyond existence.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<Document>,
    pub from_cache: bool,
    pub has_pending_writes: bool,
}

impl Snapshot {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            from_cache: false,
            has_pending_writes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, body: Value) -> Document {
        let data = match body {
            Value::Object(map) => map,
            _ => panic!("document body must be an object"),
        };
        Document {
            id: id.to_string(),
            data,
        }
    }

    #[test]
    fn test_record_from_full_document() {
        let document = doc(
            "rsvp-1",
            json!({
                "name": "Alex",
                "email": "a@b.com",
                "guests": 3,
                "favoriteGames": "Catan, Codenames",
                "dietary": "vegetarian",
                "timestamp": "2025-12-01T18:30:00+00:00",
                "userId": "anon-abc"
            }),
        );

        let record = RsvpRecord::from_document(&document).unwrap();
        assert_eq!(record.id, "rsvp-1");
        assert_eq!(record.name, "Alex");
        assert_eq!(record.email, "a@b.com");
        assert_eq!(record.guests, Some(3));
        assert_eq!(record.favorite_games, "Catan, Codenames");
        assert_eq!(record.dietary, "vegetarian");
        assert_eq!(record.user_id, "anon-abc");
    }

    #[test]
    fn test_guests_tolerates_numeric_string() {
        let document = doc("rsvp-2", json!({ "name": "Sam", "guests": "4" }));
        let record = RsvpRecord::from_document(&document).unwrap();
        assert_eq!(record.guests, Some(4));
    }

    #[test]
    fn test_guests_missing_or_junk_becomes_none() {
        let missing = doc("rsvp-3", json!({ "name": "Kit" }));
        assert_eq!(RsvpRecord::from_document(&missing).unwrap().guests, None);

        let junk = doc("rsvp-4", json!({ "name": "Kit", "guests": "a few" }));
        assert_eq!(RsvpRecord::from_document(&junk).unwrap().guests, None);

        let null = doc("rsvp-5", json!({ "name": "Kit", "guests": null }));
        assert_eq!(RsvpRecord::from_document(&null).unwrap().guests, None);
    }

    #[test]
    fn test_record_serializes_with_camel_case_wire_names() {
        let record = RsvpRecord {
            id: "ignored".to_string(),
            name: "Alex".to_string(),
            email: "a@b.com".to_string(),
            guests: Some(2),
            favorite_games: "Azul".to_string(),
            dietary: String::new(),
            timestamp: now_str(),
            user_id: "anon-abc".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["favoriteGames"], "Azul");
        assert_eq!(value["userId"], "anon-abc");
        assert_eq!(value["guests"], 2);
    }
}
