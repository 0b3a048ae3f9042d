use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// A chart text dump discovered for batch interpretation.
#[derive(Debug)]
pub struct ChartFile {
    /// Output name: the path below the scanned root, directories joined
    /// with '_', extension dropped ("family/bob.txt" → "family_bob")
    pub name: String,
    pub path: PathBuf,
}

fn output_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        "chart".to_string()
    } else {
        parts.join("_")
    }
}

/// Find every `.txt` chart dump under `root`, sorted by path.
///
/// Hidden files and directories (leading '.') are skipped, as is
/// anything under an `output` directory so a previous batch run's
/// results are never re-read. Names are unique: a name already taken
/// gets a "-2", "-3", ... suffix.
pub fn scan_charts(root: &Path) -> Vec<ChartFile> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // The root itself may be hidden (e.g. a temp dir)
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !name.starts_with('.') && !(e.file_type().is_dir() && name == "output")
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("txt"))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    let mut taken: HashSet<String> = HashSet::new();
    paths
        .into_iter()
        .map(|path| {
            let base = output_name(root, &path);
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}-{n}");
                n += 1;
            }
            if name != base {
                warn!(path = %path.display(), name = %name, "output name collision; renamed");
            }
            ChartFile { name, path }
        })
        .collect()
}
