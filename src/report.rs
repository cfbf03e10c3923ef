use crate::pki::ClassifiedCertificate;
use std::io::Write;

const HEADER: [&str; 7] = [
    "serial",
    "common_name",
    "not_before",
    "not_after",
    "status",
    "revocation_date",
    "fingerprint",
];

/// Writes a classified listing as CSV, one row per certificate.
pub fn write_csv<W: Write>(
    writer: W,
    listing: &[ClassifiedCertificate],
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for entry in listing {
        let record = &entry.record;
        wtr.write_record([
            record.serial().to_string(),
            record.common_name().to_string(),
            record.not_before().to_rfc3339(),
            record.not_after().to_rfc3339(),
            entry.status.to_string(),
            entry
                .revocation_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            record.fingerprint().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(
    listing: &[ClassifiedCertificate],
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, listing)?;
    Ok(String::from_utf8(buf)?)
}
