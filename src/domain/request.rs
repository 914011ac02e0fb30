use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ValidationError,
    soldier::{ParseLabelError, Soldier, SoldierId},
};

/// Opaque, never-reused identifier of a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequestId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Review status of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// ממתינה
    #[default]
    #[serde(alias = "ממתינה")]
    Pending,
    /// אושרה
    #[serde(alias = "אושרה")]
    Approved,
    /// נדחתה
    #[serde(alias = "נדחתה")]
    Rejected,
}

impl RequestStatus {
    /// All statuses, in workflow order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// The Hebrew label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "ממתינה",
            Self::Approved => "אושרה",
            Self::Rejected => "נדחתה",
        }
    }

    /// The identifier used in persisted data and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "ממתינה" => Ok(Self::Pending),
            "approved" | "אושרה" => Ok(Self::Approved),
            "rejected" | "נדחתה" => Ok(Self::Rejected),
            _ => Err(ParseLabelError::new("status", s)),
        }
    }
}

/// Identity fields copied from the soldier being replaced.
///
/// This is a snapshot taken when the request is drafted. Later changes to
/// that soldier's record do not affect requests that were already created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacedSoldier {
    /// Full name at the time of the request.
    pub full_name: String,
    /// Personal number at the time of the request.
    pub personal_number: String,
    /// Rank at the time of the request.
    pub rank: String,
    /// Position at the time of the request.
    pub position: String,
    /// When the replaced soldier leaves the base.
    pub departure_date: NaiveDate,
}

impl ReplacedSoldier {
    /// Copies the identity fields of `soldier`.
    #[must_use]
    pub fn snapshot(soldier: &Soldier, departure_date: NaiveDate) -> Self {
        Self {
            full_name: soldier.full_name.to_string(),
            personal_number: soldier.personal_number.to_string(),
            rank: soldier.rank.clone(),
            position: soldier.position.clone(),
            departure_date,
        }
    }
}

/// The variant-specific part of a request.
///
/// Serialized with a `type` discriminant, e.g. `"type": "single-day"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RequestKind {
    /// A one-day visit without an overnight stay.
    SingleDay {
        /// Day of arrival.
        arrival_date: NaiveDate,
        /// The base being visited.
        base_name: String,
        /// Whether the soldier has been on this base before.
        was_in_base_before: bool,
        /// Whether the visit needs explicit approval.
        requires_approval: bool,
    },
    /// A visit with overnight stays.
    MultiDay {
        /// Day of arrival.
        arrival_date: NaiveDate,
        /// Day of departure.
        departure_date: NaiveDate,
        /// The base being visited.
        base_name: String,
        /// Whether the soldier has been on this base before.
        was_in_base_before: bool,
        /// Whether the visit needs explicit approval.
        requires_approval: bool,
    },
    /// A multi-day visit in which the soldier replaces another soldier.
    Replacement {
        /// Day of arrival.
        arrival_date: NaiveDate,
        /// Day of departure.
        departure_date: NaiveDate,
        /// The base being visited.
        base_name: String,
        /// Whether the soldier has been on this base before.
        was_in_base_before: bool,
        /// Whether the visit needs explicit approval.
        requires_approval: bool,
        /// Snapshot of the outgoing soldier.
        replaced_soldier: ReplacedSoldier,
    },
    /// Leaving a base.
    Departure {
        /// The base being left.
        base_name: String,
    },
}

impl RequestKind {
    /// The Hebrew label for this kind of request.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SingleDay { .. } => "הצטרפות חד-יומית",
            Self::MultiDay { .. } => "הצטרפות עם לינה",
            Self::Replacement { .. } => "הצטרפות והחלפה",
            Self::Departure { .. } => "עזיבת בסיס",
        }
    }

    /// The discriminant as it appears in persisted data.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::SingleDay { .. } => "single-day",
            Self::MultiDay { .. } => "multi-day",
            Self::Replacement { .. } => "replacement",
            Self::Departure { .. } => "departure",
        }
    }

    /// The base this request is about.
    #[must_use]
    pub fn base_name(&self) -> &str {
        match self {
            Self::SingleDay { base_name, .. }
            | Self::MultiDay { base_name, .. }
            | Self::Replacement { base_name, .. }
            | Self::Departure { base_name } => base_name,
        }
    }
}

/// A request that has not been saved yet.
///
/// Drafts are rendered by the message templater and then committed to the
/// store together with the (possibly edited) message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    /// The soldier the request is about.
    pub soldier_id: SoldierId,
    /// Name of the commander making the request.
    pub commander_name: String,
    /// Variant-specific fields.
    pub kind: RequestKind,
}

impl RequestDraft {
    /// Checks the fields a message cannot be generated without.
    ///
    /// # Errors
    ///
    /// Returns an error if the commander name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.commander_name.trim().is_empty() {
            return Err(ValidationError::MissingCommander);
        }
        Ok(())
    }
}

/// A base-visit authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Identifier assigned when the request was saved.
    pub id: RequestId,
    /// The soldier this request is about.
    ///
    /// This is a reference by identity and may dangle.
    pub soldier_id: SoldierId,
    /// When the request was saved.
    pub created_date: DateTime<Utc>,
    /// Name of the commander making the request.
    pub commander_name: String,
    /// Current review status.
    pub status: RequestStatus,
    /// The rendered message text.
    pub message: String,
    /// Variant-specific fields.
    #[serde(flatten)]
    pub kind: RequestKind,
}

impl Request {
    /// Builds a new pending request from a draft.
    #[must_use]
    pub(crate) fn from_draft(id: RequestId, draft: RequestDraft, message: String) -> Self {
        let RequestDraft {
            soldier_id,
            commander_name,
            kind,
        } = draft;
        Self {
            id,
            soldier_id,
            created_date: Utc::now(),
            commander_name,
            status: RequestStatus::Pending,
            message,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::soldier::NewSoldier;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case("pending", RequestStatus::Pending; "english pending")]
    #[test_case("APPROVED", RequestStatus::Approved; "english approved upper")]
    #[test_case("נדחתה", RequestStatus::Rejected; "hebrew rejected")]
    #[test_case("ממתינה", RequestStatus::Pending; "hebrew pending")]
    fn status_parses(input: &str, expected: RequestStatus) {
        assert_eq!(input.parse::<RequestStatus>().unwrap(), expected);
    }

    #[test]
    fn unknown_status_fails() {
        assert!("all".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn blank_commander_is_rejected() {
        let draft = RequestDraft {
            soldier_id: SoldierId::new("1"),
            commander_name: " ".to_string(),
            kind: RequestKind::Departure {
                base_name: "בסיס צפון".to_string(),
            },
        };
        assert_eq!(draft.validate(), Err(ValidationError::MissingCommander));
    }

    #[test]
    fn request_json_flattens_type_discriminant() {
        let draft = RequestDraft {
            soldier_id: SoldierId::new("1"),
            commander_name: "דני".to_string(),
            kind: RequestKind::MultiDay {
                arrival_date: date(2026, 3, 1),
                departure_date: date(2026, 3, 4),
                base_name: "בסיס צפון".to_string(),
                was_in_base_before: true,
                requires_approval: false,
            },
        };
        let request = Request::from_draft(RequestId::new("r1"), draft, "text".to_string());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "multi-day");
        assert_eq!(value["soldierId"], "1");
        assert_eq!(value["arrivalDate"], "2026-03-01");
        assert_eq!(value["departureDate"], "2026-03-04");
        assert_eq!(value["wasInBaseBefore"], true);
        assert_eq!(value["status"], "pending");

        let back: Request = serde_json::from_value(value).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn departure_json_reads_hebrew_status() {
        let json = r#"{
            "id": "9",
            "type": "departure",
            "soldierId": "2",
            "createdDate": "2026-01-05T10:00:00Z",
            "commanderName": "רון",
            "status": "אושרה",
            "message": "hello",
            "baseName": "בסיס דרום"
        }"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.kind.base_name(), "בסיס דרום");
        assert_eq!(request.kind.type_name(), "departure");
    }

    #[test]
    fn snapshot_copies_identity_fields() {
        let soldier = NewSoldier {
            full_name: "שרה לוי".to_string(),
            personal_number: "2345678".to_string(),
            id_number: "234567890".to_string(),
            rank: "סמ\"ר".to_string(),
            position: "קצינת תקשורת".to_string(),
            ..NewSoldier::default()
        }
        .into_soldier(SoldierId::new("2"))
        .unwrap();

        let snapshot = ReplacedSoldier::snapshot(&soldier, date(2026, 2, 1));
        assert_eq!(snapshot.full_name, "שרה לוי");
        assert_eq!(snapshot.personal_number, "2345678");
        assert_eq!(snapshot.rank, "סמ\"ר");
        assert_eq!(snapshot.position, "קצינת תקשורת");
    }
}
