use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn save_to_file<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, data)?;
    Ok(())
}

pub fn load_from_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// All `*.csv` files directly inside `dir`, sorted by file name.
pub fn csv_files_in(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_save_and_load_json_creates_missing_folders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/catalog.json");
        let mut data = BTreeMap::new();
        data.insert("RA02".to_string(), "https://example.com".to_string());

        save_to_file(&path, &data).unwrap();
        let loaded: BTreeMap<String, String> = load_from_json_file(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_csv_files_in_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.CSV"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub.csv")).unwrap();

        let names: Vec<String> = csv_files_in(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }
}
