//! Output formatting for result records

use clap::ValueEnum;
use mrtd_card::ResultRecord;

/// Bytes of each raw file shown in human mode
const PREVIEW_BYTES: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatMode {
    /// Human-readable formatted output
    Human,
    /// JSON as handed to a host bridge
    Json,
}

/// Render a result record for stdout
pub fn format_record(record: &ResultRecord, mode: FormatMode) -> Result<String, serde_json::Error> {
    match mode {
        FormatMode::Json => serde_json::to_string_pretty(record),
        FormatMode::Human => Ok(format_human(record)),
    }
}

fn format_human(record: &ResultRecord) -> String {
    let mut out = String::new();

    let fields = [
        ("Document No", &record.document_no),
        ("Last Name", &record.last_name),
        ("First Name", &record.first_name),
        ("Nationality", &record.nationality),
        ("Gender", &record.gender),
        ("Birth Date", &record.birth_date),
        ("Place of Birth", &record.place_of_birth),
        ("Expiry Date", &record.expiry_date),
        ("Identity No", &record.identity_no),
    ];
    for (label, value) in fields {
        let value = if value.is_empty() { "-" } else { value.as_str() };
        out.push_str(&format!("{:<15} {}\n", format!("{label}:"), value));
    }

    out.push_str(&format!("\nMRZ:\n  {}\n", record.mrz));

    out.push_str(&format!("\nRaw files ({}):\n", record.raw_files.len()));
    for (name, bytes) in &record.raw_files {
        out.push_str(&format!(
            "  {:<8} {:>6} bytes  {}{}\n",
            name,
            bytes.len(),
            hex::encode_upper(&bytes[..PREVIEW_BYTES.min(bytes.len())]),
            if bytes.len() > PREVIEW_BYTES { "..." } else { "" }
        ));
    }

    match &record.photo {
        Some(photo) => out.push_str(&format!("\nPhoto: {} base64 chars (JPEG)\n", photo.len())),
        None => out.push_str("\nPhoto: none\n"),
    }

    out
}
