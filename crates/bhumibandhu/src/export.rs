//! Single-record export.
//!
//! Writes the public fields of one record to `<landId>-record.json`. Photo
//! links, the recording officer, TDR details and allotment classification are
//! housekeeping and stay out of the export.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::documents::safe_file_stem;
use crate::error::{Error, Result};
use crate::record::{Coordinates, Dispute, Document, LandRecord, OwnershipEntry};

/// Read-only projection of a record's public fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordExport<'a> {
    /// Land id.
    pub land_id: &'a str,
    /// Survey number.
    pub survey_number: &'a str,
    /// Village.
    pub village: &'a str,
    /// Current owner.
    pub current_owner: &'a str,
    /// Area magnitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<&'a str>,
    /// Area unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'a str>,
    /// Creation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<&'a str>,
    /// Location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Ownership history.
    pub ownership_history: &'a [OwnershipEntry],
    /// Disputes.
    pub disputes: &'a [Dispute],
    /// Documents.
    pub documents: &'a [Document],
}

impl<'a> From<&'a LandRecord> for RecordExport<'a> {
    fn from(record: &'a LandRecord) -> Self {
        Self {
            land_id: &record.land_id,
            survey_number: &record.survey_number,
            village: &record.village,
            current_owner: &record.current_owner,
            area: record.area.as_deref(),
            unit: record.unit.as_deref(),
            created_at: record.created_at.as_deref(),
            coordinates: record.coordinates,
            ownership_history: &record.ownership_history,
            disputes: &record.disputes,
            documents: &record.documents,
        }
    }
}

/// File name used for a record's export.
///
/// The land id is reduced to a single path component, so the export always
/// lands directly inside the target directory.
#[must_use]
pub fn export_filename(record: &LandRecord) -> String {
    format!("{}-record.json", safe_file_stem(&record.land_id, "land"))
}

/// Pretty-printed export JSON for `record`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(record: &LandRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(&RecordExport::from(record))?)
}

/// Write the export for `record` into `dir`, creating it if needed.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn write_export(record: &LandRecord, dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let path = dir.join(export_filename(record));
    std::fs::write(&path, to_json(record)?)?;
    info!(land_id = %record.land_id, path = %path.display(), "Exported land record");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seed_records;
    use crate::record::{AllotmentStatus, Tdr, TdrStatus};

    fn record_with_housekeeping() -> LandRecord {
        let mut record = seed_records().unwrap().remove(0);
        record.officer_name = Some("R. K. Mehta".to_string());
        record.photos = Some(vec!["/photos/plot.jpg".to_string()]);
        record.allotment_status = Some(AllotmentStatus::Verified);
        record.tdr = Some(Tdr {
            issued: true,
            units: 40,
            certificate_id: "TDR-9".to_string(),
            issue_date: None,
            expiry_date: None,
            available_units: 40,
            status: TdrStatus::Active,
            transfer_history: Vec::new(),
        });
        record
    }

    #[test]
    fn test_export_filename() {
        let record = seed_records().unwrap().remove(0);
        assert_eq!(export_filename(&record), "ULP123456789012-record.json");
    }

    #[test]
    fn test_export_filename_cannot_leave_directory() {
        let record = LandRecord::new("../escaped", "S-1", "V", "O");
        assert_eq!(export_filename(&record), "_escaped-record.json");

        let record = LandRecord::new("a/b\\c", "S-1", "V", "O");
        assert_eq!(export_filename(&record), "a_b_c-record.json");
    }

    #[test]
    fn test_write_export_stays_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("downloads");
        let record = LandRecord::new("../escaped", "S-1", "V", "O");

        let path = write_export(&record, &out).unwrap();
        assert_eq!(path.parent(), Some(out.as_path()));
        assert!(path.exists());
        assert!(!dir.path().join("escaped-record.json").exists());
    }

    #[test]
    fn test_export_omits_missing_optional_fields() {
        let record = LandRecord::new("ULP7", "S-1", "V", "O");
        let json = to_json(&record).unwrap();
        assert!(!json.contains("null"));
        assert!(!json.contains("area"));
        assert!(!json.contains("createdAt"));
        assert!(!json.contains("coordinates"));
        assert!(json.contains("\"ownershipHistory\": []"));
    }

    #[test]
    fn test_export_excludes_housekeeping() {
        let json = to_json(&record_with_housekeeping()).unwrap();
        assert!(json.contains("\"landId\": \"ULP123456789012\""));
        assert!(json.contains("\"ownershipHistory\""));
        assert!(!json.contains("officerName"));
        assert!(!json.contains("photos"));
        assert!(!json.contains("tdr"));
        assert!(!json.contains("allotmentStatus"));
    }

    #[test]
    fn test_export_is_readable_as_record() {
        let record = record_with_housekeeping();
        let json = to_json(&record).unwrap();
        let back: LandRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.land_id, record.land_id);
        assert_eq!(back.ownership_history, record.ownership_history);
        assert!(back.tdr.is_none());
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let record = seed_records().unwrap().remove(2);

        let path = write_export(&record, &out).unwrap();
        assert_eq!(path, out.join("ULP123456789014-record.json"));

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("Priya Desai"));
    }
}
