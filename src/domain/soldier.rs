use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

use crate::domain::ValidationError;

/// Opaque, never-reused identifier of a [`Soldier`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoldierId(String);

impl SoldierId {
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

impl fmt::Display for SoldierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SoldierId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Free text that must not be empty.
///
/// Used for the identity fields of a soldier (name, personal number, ID
/// number), which are mandatory when the soldier is added.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequiredText(NonEmptyString);

impl RequiredText {
    /// Creates a new `RequiredText`.
    ///
    /// # Errors
    ///
    /// Returns the original string back if it is empty or only whitespace.
    pub fn new(s: String) -> Result<Self, String> {
        if s.trim().is_empty() {
            return Err(s);
        }
        NonEmptyString::new(s).map(Self).map_err(Into::into)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RequiredText {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).map_err(|_| "value must not be empty".to_string())
    }
}

impl From<RequiredText> for String {
    fn from(value: RequiredText) -> Self {
        value.0.as_str().to_string()
    }
}

impl AsRef<str> for RequiredText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RequiredText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender of a soldier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// זכר
    #[default]
    #[serde(alias = "ז")]
    Male,
    /// נקבה
    #[serde(alias = "נ")]
    Female,
}

impl Gender {
    /// The short Hebrew label used on forms.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "ז",
            Self::Female => "נ",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "ז" => Ok(Self::Male),
            "female" | "f" | "נ" => Ok(Self::Female),
            _ => Err(ParseLabelError::new("gender", s)),
        }
    }
}

/// The kind of service a soldier is serving in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// סדיר
    #[default]
    #[serde(alias = "סדיר")]
    Regular,
    /// מיל
    #[serde(alias = "מיל")]
    Reserve,
    /// יועץ
    #[serde(alias = "יועץ")]
    Advisor,
}

impl ServiceType {
    /// The Hebrew label used on forms.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Regular => "סדיר",
            Self::Reserve => "מיל",
            Self::Advisor => "יועץ",
        }
    }
}

impl FromStr for ServiceType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" | "סדיר" => Ok(Self::Regular),
            "reserve" | "מיל" => Ok(Self::Reserve),
            "advisor" | "יועץ" => Ok(Self::Advisor),
            _ => Err(ParseLabelError::new("service type", s)),
        }
    }
}

/// A label could not be parsed into one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: '{value}'")]
pub struct ParseLabelError {
    what: &'static str,
    value: String,
}

impl ParseLabelError {
    pub(crate) fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

/// A tracked individual with identity and organisational attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Soldier {
    /// Identifier assigned when the soldier was added.
    pub id: SoldierId,
    /// Full name.
    pub full_name: RequiredText,
    /// Personal (service) number, "מ.א.".
    pub personal_number: RequiredText,
    /// National ID number.
    pub id_number: RequiredText,
    /// Mobile phone number.
    #[serde(default)]
    pub phone: String,
    /// Gender.
    #[serde(default)]
    pub gender: Gender,
    /// Rank.
    #[serde(default)]
    pub rank: String,
    /// Service type.
    #[serde(default)]
    pub service_type: ServiceType,
    /// Center.
    #[serde(default)]
    pub center: String,
    /// Branch.
    #[serde(default)]
    pub branch: String,
    /// Department ("מדור").
    #[serde(default)]
    pub department: String,
    /// Team, if the soldier belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Position.
    #[serde(default)]
    pub position: String,
    /// Whether visits by this soldier need explicit approval.
    #[serde(default)]
    pub requires_approval: bool,
    /// Whether the soldier is under an intelligence watch.
    #[serde(default)]
    pub has_intelligence_watch: bool,
    /// Security clearance level.
    #[serde(default)]
    pub security_clearance: String,
    /// Whether the soldier has a known allergy.
    #[serde(default)]
    pub has_allergy: bool,
}

impl Soldier {
    /// The identity line used in rendered messages:
    /// `<rank> <full name> (מ.א. <personal number>)`.
    ///
    /// An empty rank is omitted.
    #[must_use]
    pub fn identity(&self) -> String {
        identity_line(
            &self.rank,
            self.full_name.as_str(),
            self.personal_number.as_str(),
        )
    }

    /// The team, if set and not blank.
    #[must_use]
    pub fn team(&self) -> Option<&str> {
        self.team
            .as_deref()
            .map(str::trim)
            .filter(|team| !team.is_empty())
    }
}

pub(crate) fn identity_line(rank: &str, full_name: &str, personal_number: &str) -> String {
    let rank = rank.trim();
    if rank.is_empty() {
        format!("{full_name} (מ.א. {personal_number})")
    } else {
        format!("{rank} {full_name} (מ.א. {personal_number})")
    }
}

/// The data needed to add a soldier, before an identifier is assigned.
///
/// This mirrors the "add soldier" form: every field is free text and the
/// required ones are only checked by [`NewSoldier::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSoldier {
    /// Full name (required).
    pub full_name: String,
    /// Personal number (required).
    pub personal_number: String,
    /// National ID number (required).
    pub id_number: String,
    /// Mobile phone number.
    pub phone: String,
    /// Gender.
    pub gender: Gender,
    /// Rank.
    pub rank: String,
    /// Service type.
    pub service_type: ServiceType,
    /// Center.
    pub center: String,
    /// Branch.
    pub branch: String,
    /// Department.
    pub department: String,
    /// Team.
    pub team: Option<String>,
    /// Position.
    pub position: String,
    /// Whether visits need explicit approval.
    pub requires_approval: bool,
    /// Whether the soldier is under an intelligence watch.
    pub has_intelligence_watch: bool,
    /// Security clearance level.
    pub security_clearance: String,
    /// Whether the soldier has a known allergy.
    pub has_allergy: bool,
}

impl NewSoldier {
    /// Checks the required fields without consuming the draft.
    ///
    /// # Errors
    ///
    /// Returns the first missing required field, in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::MissingFullName);
        }
        if self.personal_number.trim().is_empty() {
            return Err(ValidationError::MissingPersonalNumber);
        }
        if self.id_number.trim().is_empty() {
            return Err(ValidationError::MissingIdNumber);
        }
        Ok(())
    }

    /// Turns the draft into a [`Soldier`] with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is empty.
    pub fn into_soldier(self, id: SoldierId) -> Result<Soldier, ValidationError> {
        self.validate()?;

        let full_name =
            RequiredText::new(self.full_name).map_err(|_| ValidationError::MissingFullName)?;
        let personal_number = RequiredText::new(self.personal_number)
            .map_err(|_| ValidationError::MissingPersonalNumber)?;
        let id_number =
            RequiredText::new(self.id_number).map_err(|_| ValidationError::MissingIdNumber)?;

        Ok(Soldier {
            id,
            full_name,
            personal_number,
            id_number,
            phone: self.phone,
            gender: self.gender,
            rank: self.rank,
            service_type: self.service_type,
            center: self.center,
            branch: self.branch,
            department: self.department,
            team: self.team.filter(|team| !team.trim().is_empty()),
            position: self.position,
            requires_approval: self.requires_approval,
            has_intelligence_watch: self.has_intelligence_watch,
            security_clearance: self.security_clearance,
            has_allergy: self.has_allergy,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn draft() -> NewSoldier {
        NewSoldier {
            full_name: "יוסי כהן".to_string(),
            personal_number: "1234567".to_string(),
            id_number: "123456789".to_string(),
            rank: "רס\"ר".to_string(),
            ..NewSoldier::default()
        }
    }

    #[test]
    fn valid_draft_becomes_soldier() {
        let soldier = draft().into_soldier(SoldierId::new("42")).unwrap();
        assert_eq!(soldier.id.as_str(), "42");
        assert_eq!(soldier.full_name.as_str(), "יוסי כהן");
    }

    #[test]
    fn missing_full_name_is_rejected() {
        let mut draft = draft();
        draft.full_name = "  ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::MissingFullName));
    }

    #[test]
    fn missing_personal_number_is_rejected() {
        let mut draft = draft();
        draft.personal_number.clear();
        assert_eq!(
            draft.into_soldier(SoldierId::new("1")),
            Err(ValidationError::MissingPersonalNumber)
        );
    }

    #[test]
    fn missing_id_number_is_rejected() {
        let mut draft = draft();
        draft.id_number.clear();
        assert_eq!(draft.validate(), Err(ValidationError::MissingIdNumber));
    }

    #[test]
    fn blank_team_is_dropped() {
        let mut draft = draft();
        draft.team = Some(String::new());
        let soldier = draft.into_soldier(SoldierId::new("1")).unwrap();
        assert_eq!(soldier.team, None);
        assert_eq!(soldier.team(), None);
    }

    #[test]
    fn identity_includes_rank_when_present() {
        let soldier = draft().into_soldier(SoldierId::new("1")).unwrap();
        assert_eq!(soldier.identity(), "רס\"ר יוסי כהן (מ.א. 1234567)");
    }

    #[test]
    fn identity_omits_empty_rank() {
        assert_eq!(identity_line("", "שרה לוי", "2345678"), "שרה לוי (מ.א. 2345678)");
    }

    #[test]
    fn required_text_hands_back_blank_input() {
        assert_eq!(RequiredText::new(" \t".to_string()), Err(" \t".to_string()));
        assert_eq!(RequiredText::new("x".to_string()).unwrap().as_str(), "x");
    }

    #[test]
    fn required_text_rejects_empty_on_deserialize() {
        let result: Result<RequiredText, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test_case("male", Gender::Male; "english male")]
    #[test_case("ז", Gender::Male; "hebrew male")]
    #[test_case("Female", Gender::Female; "english female mixed case")]
    #[test_case("נ", Gender::Female; "hebrew female")]
    fn gender_parses(input: &str, expected: Gender) {
        assert_eq!(input.parse::<Gender>().unwrap(), expected);
    }

    #[test_case("regular", ServiceType::Regular; "english regular")]
    #[test_case("מיל", ServiceType::Reserve; "hebrew reserve")]
    #[test_case("advisor", ServiceType::Advisor; "english advisor")]
    fn service_type_parses(input: &str, expected: ServiceType) {
        assert_eq!(input.parse::<ServiceType>().unwrap(), expected);
    }

    #[test]
    fn unknown_service_type_fails() {
        assert!("conscript".parse::<ServiceType>().is_err());
    }

    #[test]
    fn soldier_json_uses_camel_case_and_reads_hebrew_enums() {
        let json = r#"{
            "id": "2",
            "fullName": "שרה לוי",
            "personalNumber": "2345678",
            "idNumber": "234567890",
            "gender": "נ",
            "serviceType": "מיל",
            "department": "תקשורת",
            "hasAllergy": true
        }"#;
        let soldier: Soldier = serde_json::from_str(json).unwrap();
        assert_eq!(soldier.gender, Gender::Female);
        assert_eq!(soldier.service_type, ServiceType::Reserve);
        assert!(soldier.has_allergy);
        assert_eq!(soldier.team, None);

        let value = serde_json::to_value(&soldier).unwrap();
        assert_eq!(value["personalNumber"], "2345678");
        assert_eq!(value["serviceType"], "reserve");
        assert!(value.get("team").is_none());
    }
}
