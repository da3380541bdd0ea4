//! JSON and CSV export of scraped data

use crate::config::OutputConfig;
use crate::extract::CompanyRecord;
use crate::Result;
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Builds `{dir}/{prefix}_{YYYYmmdd_HHMMSS}.{ext}` from the local time
pub fn timestamped_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.{}", prefix, stamp, ext))
}

/// Creates the data, logs and exports directories
pub fn setup_directories(config: &OutputConfig) -> std::io::Result<()> {
    for dir in [&config.data_dir, &config.logs_dir, &config.exports_dir] {
        std::fs::create_dir_all(dir)?;
    }
    tracing::info!("Directories setup complete");
    Ok(())
}

/// Writes any serializable value as pretty-printed JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Exports records as a pretty-printed JSON array
pub fn export_json(records: &[CompanyRecord], path: &Path) -> Result<()> {
    write_json(path, records)?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

/// Exports records as CSV with a header row
pub fn export_csv(records: &[CompanyRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

/// Loads a JSON array of records without assuming their shape
pub fn load_json_records(path: &Path) -> Result<Vec<Value>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
