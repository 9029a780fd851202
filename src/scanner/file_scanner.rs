//! ads.txt and sellers.json file collection

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect all ads.txt-style files (`*.txt`) from a directory
///
/// # Arguments
/// * `dir` - Directory to scan
/// * `recursive` - Whether to scan subdirectories recursively
///
/// # Returns
/// Sorted vector of file paths
pub fn collect_ads_txt_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), "txt") {
                files.push(entry.path().to_path_buf());
            }
        }
    } else {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() && has_extension(&entry.path(), "txt") {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Collect sellers.json files keyed by advertising-system domain
///
/// Two layouts are recognized, and may be mixed:
/// * `<dir>/openx.com.json`
/// * `<dir>/openx.com/sellers.json`
///
/// # Returns
/// `(domain, path)` pairs with lowercased domains, sorted by domain
pub fn collect_sellers_json_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), "json") {
            continue;
        }

        if let Some(domain) = sellers_domain_for(entry.path()) {
            files.push((domain, entry.path().to_path_buf()));
        }
    }

    files.sort();
    Ok(files)
}

fn sellers_domain_for(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy().to_lowercase();
    if stem == "sellers" {
        let parent = path.parent()?.file_name()?;
        Some(parent.to_string_lossy().to_lowercase())
    } else {
        Some(stem)
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase() == wanted)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_collect_ads_txt_files_non_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let ads_path = temp_dir.path().join("ads.txt");
        File::create(&ads_path).unwrap();
        File::create(temp_dir.path().join("notes.md")).unwrap();

        let files = collect_ads_txt_files(temp_dir.path(), false).unwrap();
        assert_eq!(files, vec![ads_path]);
    }

    #[test]
    fn test_collect_ads_txt_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("example.com");
        fs::create_dir(&subdir).unwrap();

        File::create(temp_dir.path().join("ads.txt")).unwrap();
        File::create(subdir.join("app-ads.txt")).unwrap();

        assert_eq!(collect_ads_txt_files(temp_dir.path(), false).unwrap().len(), 1);
        assert_eq!(collect_ads_txt_files(temp_dir.path(), true).unwrap().len(), 2);
    }

    #[test]
    fn test_collect_sellers_json_layouts() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("Google.com");
        fs::create_dir(&nested).unwrap();

        File::create(temp_dir.path().join("openx.com.json")).unwrap();
        File::create(nested.join("sellers.json")).unwrap();

        let files = collect_sellers_json_files(temp_dir.path()).unwrap();
        let domains: Vec<&str> = files.iter().map(|(domain, _)| domain.as_str()).collect();
        assert_eq!(domains, vec!["google.com", "openx.com"]);
    }
}
