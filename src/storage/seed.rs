// Built-in soldiers written to an empty data directory.

use crate::domain::{Gender, NewSoldier, ServiceType, Soldier, SoldierId, ValidationError};

/// The default soldier collection: exactly two records.
pub(crate) fn default_soldiers() -> Result<Vec<Soldier>, ValidationError> {
    let yossi = NewSoldier {
        full_name: "יוסי כהן".to_string(),
        personal_number: "1234567".to_string(),
        id_number: "123456789".to_string(),
        phone: "050-1234567".to_string(),
        gender: Gender::Male,
        rank: "רס\"ר".to_string(),
        service_type: ServiceType::Regular,
        center: "מרכז צפון".to_string(),
        branch: "חיל האוויר".to_string(),
        department: "מודיעין".to_string(),
        team: Some("צוות א".to_string()),
        position: "מפעיל מערכות".to_string(),
        requires_approval: true,
        has_intelligence_watch: false,
        security_clearance: "סודי".to_string(),
        has_allergy: false,
    };

    let sara = NewSoldier {
        full_name: "שרה לוי".to_string(),
        personal_number: "2345678".to_string(),
        id_number: "234567890".to_string(),
        phone: "052-2345678".to_string(),
        gender: Gender::Female,
        rank: "סמ\"ר".to_string(),
        service_type: ServiceType::Reserve,
        center: "מרכז דרום".to_string(),
        branch: "חיל הים".to_string(),
        department: "תקשורת".to_string(),
        team: None,
        position: "קצינת תקשורת".to_string(),
        requires_approval: false,
        has_intelligence_watch: true,
        security_clearance: "חסוי".to_string(),
        has_allergy: true,
    };

    Ok(vec![
        yossi.into_soldier(SoldierId::new("1"))?,
        sara.into_soldier(SoldierId::new("2"))?,
    ])
}
