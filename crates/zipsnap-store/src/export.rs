//! Rendering a record as a downloadable file.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use zipsnap_core::LocationError;
use zipsnap_geocode::LocationRecord;

const CSV_HEADERS: [&str; 6] = [
    "Postal Code",
    "Country",
    "Place Name",
    "State",
    "Latitude",
    "Longitude",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Text => "text/plain",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported export format: {0} (expected json, csv or text)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// A rendered export, ready to be written or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub content: String,
    pub mime_type: &'static str,
    pub file_extension: &'static str,
    /// `location-{postal_code}-{YYYY-MM-DD}.{ext}`, dated at export time
    pub file_name: String,
}

/// Render `record` in `format`.
///
/// Fails with `NoActiveRecord` when there is nothing to export.
pub fn export_record(
    record: Option<&LocationRecord>,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<Export, LocationError> {
    let record = record.ok_or(LocationError::NoActiveRecord)?;

    let content = match format {
        ExportFormat::Json => serde_json::to_string_pretty(record)
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))?,
        ExportFormat::Csv => render_csv(record)?,
        ExportFormat::Text => render_text(record)?,
    };

    Ok(Export {
        content,
        mime_type: format.mime_type(),
        file_extension: format.extension(),
        file_name: format!(
            "location-{}-{}.{}",
            record.postal_code,
            exported_at.format("%Y-%m-%d"),
            format.extension()
        ),
    })
}

fn render_csv(record: &LocationRecord) -> Result<String, LocationError> {
    let place = record.primary_place().ok_or(LocationError::NoPlaces)?;

    let values = [
        record.postal_code.as_str(),
        record.country.as_str(),
        place.place_name.as_str(),
        place.state.as_str(),
        place.latitude.as_deref().unwrap_or_default(),
        place.longitude.as_deref().unwrap_or_default(),
    ];

    let row = values.iter().map(|v| csv_field(v)).collect::<Vec<_>>();
    Ok(format!("{}\n{}", CSV_HEADERS.join(","), row.join(",")))
}

/// Quote a field only when it would otherwise break the row.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_text(record: &LocationRecord) -> Result<String, LocationError> {
    let place = record.primary_place().ok_or(LocationError::NoPlaces)?;

    let mut lines = vec![
        "Location Information:".to_string(),
        format!("Postal Code: {}", record.postal_code),
        format!("Country: {} ({})", record.country, record.country_abbreviation),
        format!("Place Name: {}", place.place_name),
        format!("State: {} ({})", place.state, place.state_abbreviation),
    ];

    // Gated on latitude alone; a lone latitude is printed without a separator.
    if let Some(latitude) = &place.latitude {
        lines.push(match &place.longitude {
            Some(longitude) => format!("Coordinates: {}, {}", latitude, longitude),
            None => format!("Coordinates: {}", latitude),
        });
    }

    Ok(lines.join("\n"))
}
