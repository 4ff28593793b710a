use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use super::export_projector::ExportReport;
use crate::error::AppError;

/// `{token}_{DD-MM-YYYY}_{HH-MM-SS}`, without extension.
pub fn export_file_name<Tz>(token: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}_{}", token, at.format("%d-%m-%Y_%H-%M-%S"))
}

/// Writes the report as pretty JSON into `dir`, named after the local time.
pub fn write_export(dir: &Path, token: &str, report: &ExportReport) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("{}.json", export_file_name(token, &Local::now())));
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, report.to_json_pretty()?)?;
    info!("Wrote export to {}", path.display());
    Ok(path)
}
