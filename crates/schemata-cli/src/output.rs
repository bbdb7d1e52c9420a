use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::CliError;

/// Replace the report at `path` with `value` rendered as pretty JSON.
///
/// The bytes land in `<name>.tmp` next to the target and are renamed over it
/// once synced, so readers never see a half-written report. The temporary file
/// is removed when any step before the rename fails.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let data = serde_json::to_vec_pretty(value)?;
    let dir = report_dir(path);
    fs::create_dir_all(&dir)?;

    let tmp_path = temp_path(path)?;
    if let Err(err) = write_synced(&tmp_path, &data) {
        fs::remove_file(&tmp_path).ok();
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        fs::remove_file(&tmp_path).ok();
        return Err(err.into());
    }

    sync_dir(&dir)?;
    tracing::debug!(event = "report_synced", path = %path.display(), bytes = data.len());
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Directory holding `path`; the working directory for bare file names.
fn report_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn temp_path(path: &Path) -> Result<PathBuf, CliError> {
    let file_name = path.file_name().ok_or_else(|| {
        CliError::InvalidConfig(format!("invalid output path: {}", path.display()))
    })?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("schemata-output-{}-{name}", std::process::id()));
        fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn writes_report_into_missing_directory() {
        let dir = scratch_dir("nested");
        let path = dir.join("reports").join("report.json");

        write_json_atomic(&path, &serde_json::json!({ "schema": "shop" })).expect("write report");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read report")).expect("parse");
        assert_eq!(written["schema"], "shop");
        assert!(!path.with_file_name("report.json.tmp").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_rename_leaves_no_temporary_file() {
        let dir = scratch_dir("rename");
        let path = dir.join("report.json");
        // a non-empty directory at the target makes the rename fail
        fs::create_dir_all(path.join("occupied")).expect("create blocking dir");

        let result = write_json_atomic(&path, &serde_json::json!({}));
        assert!(matches!(result, Err(CliError::Io(_))));
        assert!(!dir.join("report.json.tmp").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_paths_without_file_name() {
        let result = write_json_atomic(Path::new("/"), &serde_json::json!({}));
        assert!(result.is_err());
    }
}
