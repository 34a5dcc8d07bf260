//! Land record data model.
//!
//! Records serialize with camelCase field names so snapshots written by
//! earlier versions (which had no `tdr` or legal-document fields) still load:
//! every field added later is optional and defaults when absent.
//!
//! # Invariants
//! - `surveyNumber`, `village` and `currentOwner` are non-empty.
//! - Ownership `from` years never decrease along the history.
//! - At most one ownership entry is open-ended (`"Present"`), and it is last.
//! - TDR units transferred never exceed the units issued.
//!
//! These are checked by [`LandRecord::validate`], which the record store runs
//! on every insertion.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::units::{self, UnitKey};

/// Marker used for the open end of the current ownership period.
const PRESENT: &str = "Present";

/// End of an ownership period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOwnershipEnd", into = "RawOwnershipEnd")]
pub enum OwnershipEnd {
    /// The period ended in this year.
    Year(i32),
    /// The period is still running.
    Present,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawOwnershipEnd {
    Year(i32),
    Label(String),
}

impl TryFrom<RawOwnershipEnd> for OwnershipEnd {
    type Error = String;

    fn try_from(raw: RawOwnershipEnd) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawOwnershipEnd::Year(year) => Ok(Self::Year(year)),
            RawOwnershipEnd::Label(label) if label.eq_ignore_ascii_case(PRESENT) => {
                Ok(Self::Present)
            }
            RawOwnershipEnd::Label(label) => {
                Err(format!("expected a year or \"{PRESENT}\", got \"{label}\""))
            }
        }
    }
}

impl From<OwnershipEnd> for RawOwnershipEnd {
    fn from(end: OwnershipEnd) -> Self {
        match end {
            OwnershipEnd::Year(year) => Self::Year(year),
            OwnershipEnd::Present => Self::Label(PRESENT.to_string()),
        }
    }
}

impl fmt::Display for OwnershipEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Present => f.write_str(PRESENT),
        }
    }
}

/// One period of ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipEntry {
    /// Owner's name.
    pub owner: String,
    /// First year of ownership.
    pub from: i32,
    /// Last year of ownership, or `Present`.
    pub to: OwnershipEnd,
    /// How the parcel changed hands (inheritance, purchase, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_reason: Option<String>,
}

/// Status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// Still open.
    Pending,
    /// Settled.
    Resolved,
    /// Recorded without a status.
    None,
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Resolved => write!(f, "Resolved"),
            Self::None => write!(f, "None"),
        }
    }
}

/// A dispute raised against the parcel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Year the dispute was raised.
    pub year: i32,
    /// Kind of dispute (boundary, ownership, encroachment, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Current status.
    pub status: DisputeStatus,
    /// Free-form details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A document attached to the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Display name.
    pub name: String,
    /// Where the document lives.
    pub link: String,
    /// Upload date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Whether both components are finite and within their ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Lifecycle status of a TDR certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TdrStatus {
    /// Issued and unused.
    Active,
    /// Past its expiry date.
    Expired,
    /// Every unit has been transferred.
    #[serde(rename = "Fully Transferred")]
    FullyTransferred,
    /// Some units have been transferred.
    #[serde(rename = "Partially Transferred")]
    PartiallyTransferred,
}

impl fmt::Display for TdrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Expired => write!(f, "Expired"),
            Self::FullyTransferred => write!(f, "Fully Transferred"),
            Self::PartiallyTransferred => write!(f, "Partially Transferred"),
        }
    }
}

/// A transfer of TDR units to another parcel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdrTransfer {
    /// Receiving parcel.
    pub to_land_id: String,
    /// Owner of the receiving parcel.
    pub to_owner: String,
    /// Units moved in this transfer.
    pub units_transferred: u32,
    /// Year of transfer.
    pub year: i32,
    /// Date of transfer.
    #[serde(default)]
    pub date: String,
    /// Transfer certificate number.
    #[serde(default)]
    pub certificate_number: String,
    /// Free-form remarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Transfer-of-development-rights sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tdr {
    /// Whether a TDR certificate was issued.
    pub issued: bool,
    /// Units granted by the certificate.
    pub units: u32,
    /// Certificate identifier.
    pub certificate_id: String,
    /// Issue date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    /// Expiry date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    /// Units still available; recomputed from the history on insertion.
    #[serde(default)]
    pub available_units: u32,
    /// Certificate status.
    pub status: TdrStatus,
    /// Transfers out of this parcel, oldest first.
    #[serde(default)]
    pub transfer_history: Vec<TdrTransfer>,
}

impl Tdr {
    /// Total units moved out across the transfer history.
    #[must_use]
    pub fn transferred_units(&self) -> u64 {
        self.transfer_history
            .iter()
            .map(|t| u64::from(t.units_transferred))
            .sum()
    }

    /// Units not yet transferred, or `None` when the history over-spends.
    #[must_use]
    pub fn remaining_units(&self) -> Option<u32> {
        let remaining = u64::from(self.units).checked_sub(self.transferred_units())?;
        u32::try_from(remaining).ok()
    }
}

/// Kind of legal document backing an allotment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegalDocumentType {
    /// A will.
    Will,
    /// A sworn affidavit.
    Affidavit,
    /// A death certificate.
    #[serde(rename = "Death Certificate")]
    DeathCertificate,
}

impl fmt::Display for LegalDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Will => write!(f, "Will"),
            Self::Affidavit => write!(f, "Affidavit"),
            Self::DeathCertificate => write!(f, "Death Certificate"),
        }
    }
}

/// Verification state of an allotment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllotmentStatus {
    /// Verified by an officer.
    Verified,
    /// Awaiting verification.
    #[serde(rename = "Pending Verification")]
    PendingVerification,
    /// Verification refused.
    Rejected,
}

impl fmt::Display for AllotmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => write!(f, "Verified"),
            Self::PendingVerification => write!(f, "Pending Verification"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A land parcel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandRecord {
    /// ULPIN-style primary identifier.
    pub land_id: String,
    /// Jurisdiction survey number.
    pub survey_number: String,
    /// Village or area name.
    pub village: String,
    /// Current owner's name.
    pub current_owner: String,
    /// Ownership periods, oldest first.
    #[serde(default)]
    pub ownership_history: Vec<OwnershipEntry>,
    /// Disputes, in recorded order.
    #[serde(default)]
    pub disputes: Vec<Dispute>,
    /// Attached documents.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Parcel location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Photo links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    /// Area magnitude, as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Area unit label, as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Date the record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Recording official.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officer_name: Option<String>,
    /// Transfer-of-development-rights details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tdr: Option<Tdr>,
    /// Legal document backing the allotment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_document_type: Option<LegalDocumentType>,
    /// Link to that legal document.
    #[serde(
        default,
        rename = "legalDocumentURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub legal_document_url: Option<String>,
    /// Allotment verification state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allotment_status: Option<AllotmentStatus>,
}

impl LandRecord {
    /// Create a record with the required fields and empty histories.
    #[must_use]
    pub fn new(
        land_id: impl Into<String>,
        survey_number: impl Into<String>,
        village: impl Into<String>,
        current_owner: impl Into<String>,
    ) -> Self {
        Self {
            land_id: land_id.into(),
            survey_number: survey_number.into(),
            village: village.into(),
            current_owner: current_owner.into(),
            ownership_history: Vec::new(),
            disputes: Vec::new(),
            documents: Vec::new(),
            coordinates: None,
            photos: None,
            area: None,
            unit: None,
            created_at: None,
            officer_name: None,
            tdr: None,
            legal_document_type: None,
            legal_document_url: None,
            allotment_status: None,
        }
    }

    /// Check the data model invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] naming the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(Error::invalid_record(&self.land_id, reason));

        for (name, value) in [
            ("landId", &self.land_id),
            ("surveyNumber", &self.survey_number),
            ("village", &self.village),
            ("currentOwner", &self.current_owner),
        ] {
            if value.trim().is_empty() {
                return fail(format!("{name} must not be empty"));
            }
        }

        let last = self.ownership_history.len().saturating_sub(1);
        let mut previous_from: Option<i32> = None;
        for (index, entry) in self.ownership_history.iter().enumerate() {
            if previous_from.is_some_and(|prev| entry.from < prev) {
                return fail(format!(
                    "ownership history is out of order at '{}' ({})",
                    entry.owner, entry.from
                ));
            }
            previous_from = Some(entry.from);

            match entry.to {
                OwnershipEnd::Present if index != last => {
                    return fail(format!(
                        "only the last ownership entry may run to {PRESENT} ('{}' does)",
                        entry.owner
                    ));
                }
                OwnershipEnd::Year(to) if to < entry.from => {
                    return fail(format!(
                        "ownership of '{}' ends ({to}) before it starts ({})",
                        entry.owner, entry.from
                    ));
                }
                _ => {}
            }
        }

        if let Some(coordinates) = &self.coordinates {
            if !coordinates.is_valid() {
                return fail(format!(
                    "coordinates out of range ({}, {})",
                    coordinates.latitude, coordinates.longitude
                ));
            }
        }

        if let Some(tdr) = &self.tdr {
            if tdr.remaining_units().is_none() {
                return fail(format!(
                    "TDR transfers ({}) exceed issued units ({})",
                    tdr.transferred_units(),
                    tdr.units
                ));
            }
        }

        if let Some(present) = self.present_owner() {
            if present != self.current_owner {
                warn!(
                    land_id = %self.land_id,
                    present_owner = %present,
                    current_owner = %self.current_owner,
                    "Open ownership entry does not match current owner"
                );
            }
        }

        Ok(())
    }

    /// Validate the record and recompute derived fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if [`LandRecord::validate`] fails.
    pub fn normalize(mut self) -> Result<Self> {
        self.validate()?;
        if let Some(tdr) = &mut self.tdr {
            // validate() guarantees the history does not over-spend.
            tdr.available_units = tdr.remaining_units().unwrap_or(0);
        }
        Ok(self)
    }

    /// Owner named by the open-ended ownership entry, if any.
    #[must_use]
    pub fn present_owner(&self) -> Option<&str> {
        self.ownership_history
            .last()
            .filter(|entry| entry.to == OwnershipEnd::Present)
            .map(|entry| entry.owner.as_str())
    }

    /// Whether `query` (already lower-cased and trimmed) occurs in any of the
    /// searchable identity fields.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        [
            &self.land_id,
            &self.survey_number,
            &self.current_owner,
            &self.village,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(query))
    }

    /// Number of disputes with the given status.
    #[must_use]
    pub fn disputes_with_status(&self, status: DisputeStatus) -> usize {
        self.disputes.iter().filter(|d| d.status == status).count()
    }

    /// Stated area as a number, if present and parseable.
    #[must_use]
    pub fn area_value(&self) -> Option<f64> {
        self.area.as_deref()?.trim().parse().ok()
    }

    /// Stated unit resolved against the conversion table.
    #[must_use]
    pub fn unit_key(&self) -> Option<UnitKey> {
        UnitKey::from_label(self.unit.as_deref()?)
    }

    /// Stated area expressed in `target`.
    ///
    /// Returns `None` when the area or unit is missing or unrecognized.
    #[must_use]
    pub fn area_in(&self, target: UnitKey) -> Option<f64> {
        units::convert_to(self.area_value()?, self.unit_key()?, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LandRecord {
        let mut record = LandRecord::new(
            "ULP000000000001",
            "GN-1/1",
            "Sector-2 Gandhinagar",
            "Asha Joshi",
        );
        record.ownership_history = vec![
            OwnershipEntry {
                owner: "Dev Joshi".to_string(),
                from: 1990,
                to: OwnershipEnd::Year(2010),
                transfer_reason: Some("Purchase".to_string()),
            },
            OwnershipEntry {
                owner: "Asha Joshi".to_string(),
                from: 2010,
                to: OwnershipEnd::Present,
                transfer_reason: Some("Inheritance".to_string()),
            },
        ];
        record
    }

    fn sample_tdr(units: u32, transfers: &[u32]) -> Tdr {
        Tdr {
            issued: true,
            units,
            certificate_id: "TDR-2021-0042".to_string(),
            issue_date: Some("2021-01-05".to_string()),
            expiry_date: None,
            available_units: 0,
            status: TdrStatus::PartiallyTransferred,
            transfer_history: transfers
                .iter()
                .map(|units| TdrTransfer {
                    to_land_id: "ULP000000000002".to_string(),
                    to_owner: "Nikhil Rao".to_string(),
                    units_transferred: *units,
                    year: 2022,
                    date: "2022-03-01".to_string(),
                    certificate_number: "TC-1".to_string(),
                    remarks: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_record_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_required_field_rejected() {
        let mut record = sample();
        record.village = "   ".to_string();
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("village must not be empty"));
    }

    #[test]
    fn test_out_of_order_history_rejected() {
        let mut record = sample();
        record.ownership_history[1].from = 1980;
        assert!(record.validate().unwrap_err().is_invalid_record());
    }

    #[test]
    fn test_present_must_be_last() {
        let mut record = sample();
        record.ownership_history[0].to = OwnershipEnd::Present;
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("only the last ownership entry"));
    }

    #[test]
    fn test_period_cannot_end_before_start() {
        let mut record = sample();
        record.ownership_history[0].to = OwnershipEnd::Year(1985);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_equal_from_years_allowed() {
        let mut record = sample();
        record.ownership_history[1].from = 1990;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_present_owner_mismatch_is_not_an_error() {
        let mut record = sample();
        record.current_owner = "Someone Else".to_string();
        assert!(record.validate().is_ok());
        assert_eq!(record.present_owner(), Some("Asha Joshi"));
    }

    #[test]
    fn test_coordinates_range_checked() {
        let mut record = sample();
        record.coordinates = Some(Coordinates {
            latitude: 91.0,
            longitude: 72.0,
        });
        assert!(record.validate().is_err());

        record.coordinates = Some(Coordinates {
            latitude: 23.2,
            longitude: f64::NAN,
        });
        assert!(record.validate().is_err());

        record.coordinates = Some(Coordinates {
            latitude: 23.2,
            longitude: 72.6,
        });
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_tdr_overspend_rejected() {
        let mut record = sample();
        record.tdr = Some(sample_tdr(100, &[60, 50]));
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("exceed issued units"));
    }

    #[test]
    fn test_normalize_derives_available_units() {
        let mut record = sample();
        let mut tdr = sample_tdr(100, &[30, 20]);
        tdr.available_units = 999;
        record.tdr = Some(tdr);

        let record = record.normalize().unwrap();
        assert_eq!(record.tdr.unwrap().available_units, 50);
    }

    #[test]
    fn test_matches_is_field_scoped() {
        let record = sample();
        assert!(record.matches("gn-1"));
        assert!(record.matches("asha"));
        assert!(record.matches("sector-2"));
        assert!(record.matches("ulp000"));
        // Previous owners are not searched.
        assert!(!record.matches("dev joshi"));
    }

    #[test]
    fn test_area_in() {
        let mut record = sample();
        record.area = Some("1".to_string());
        record.unit = Some("acres".to_string());
        let sq_m = record.area_in(UnitKey::SqMeters).unwrap();
        assert!((sq_m - 4046.86).abs() < 1e-9);

        record.unit = Some("bigha".to_string());
        assert!(record.area_in(UnitKey::SqMeters).is_none());

        record.unit = Some("sq meters".to_string());
        record.area = Some("not a number".to_string());
        assert!(record.area_in(UnitKey::Acres).is_none());
    }

    #[test]
    fn test_ownership_end_serde() {
        assert_eq!(
            serde_json::to_string(&OwnershipEnd::Present).unwrap(),
            "\"Present\""
        );
        assert_eq!(
            serde_json::to_string(&OwnershipEnd::Year(2005)).unwrap(),
            "2005"
        );
        let end: OwnershipEnd = serde_json::from_str("\"Present\"").unwrap();
        assert_eq!(end, OwnershipEnd::Present);
        assert!(serde_json::from_str::<OwnershipEnd>("\"Later\"").is_err());
    }

    #[test]
    fn test_deserialize_stored_shape() {
        let json = r#"{
            "landId": "ULP123",
            "surveyNumber": "GN-9/1",
            "village": "Sector-4",
            "currentOwner": "Ravi",
            "ownershipHistory": [{"owner": "Ravi", "from": 2001, "to": "Present"}],
            "disputes": [{"year": 2019, "type": "Boundary", "status": "None"}],
            "documents": [],
            "allotmentStatus": "Pending Verification",
            "legalDocumentType": "Death Certificate",
            "legalDocumentURL": "/docs/dc.pdf",
            "tdr": {
                "issued": true,
                "units": 10,
                "certificateId": "C-1",
                "status": "Fully Transferred"
            }
        }"#;
        let record: LandRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.disputes[0].kind, "Boundary");
        assert_eq!(record.disputes[0].status, DisputeStatus::None);
        assert_eq!(
            record.allotment_status,
            Some(AllotmentStatus::PendingVerification)
        );
        assert_eq!(
            record.legal_document_type,
            Some(LegalDocumentType::DeathCertificate)
        );
        assert_eq!(record.legal_document_url.as_deref(), Some("/docs/dc.pdf"));
        assert_eq!(
            record.tdr.as_ref().map(|t| t.status),
            Some(TdrStatus::FullyTransferred)
        );
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"landId\""));
        assert!(json.contains("\"ownershipHistory\""));
        assert!(json.contains("\"transferReason\""));
        assert!(!json.contains("\"tdr\""));
    }
}
