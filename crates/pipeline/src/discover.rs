use crate::config::SyncConfig;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Scanner for finding documentable files in a project
///
/// `.gitignore`-aware; excludes the tool's own output tree, binary
/// extensions, noisy artifacts, and oversized files. Results come back in
/// a stable sort order so two sweeps over an unchanged tree visit files
/// identically.
pub struct FileScanner {
    root: PathBuf,
    output_dir_name: String,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            root: config.project_root.clone(),
            output_dir_name: config.output_dir_name.clone(),
            max_file_size: config.max_source_bytes,
        }
    }

    /// Scan the project for eligible files
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let output_dir_name = self.output_dir_name.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true) // never document hidden files
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);
        builder
            .filter_entry(move |entry| !is_ignored_scope(entry.path(), &root, &output_dir_name));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > self.max_file_size {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                self.max_file_size
                            );
                            continue;
                        }
                    }

                    if is_binary_path(path) || is_noise_file(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!("Found {} documentable files", files.len());
        files
    }
}

/// Check for a binary file extension
pub(crate) fn is_binary_path(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_lowercase();
        return BINARY_EXTENSIONS.iter().any(|candidate| candidate == &ext);
    }
    false
}

pub(crate) fn is_ignored_scope(path: &Path, root: &Path, output_dir_name: &str) -> bool {
    if let Ok(relative) = path.strip_prefix(root) {
        for component in relative.components() {
            if let std::path::Component::Normal(name) = component {
                let lowered = name.to_string_lossy().to_lowercase();
                if lowered == output_dir_name.to_lowercase()
                    || IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered)
                {
                    return true;
                }
            }
        }
    }
    false
}

fn is_noise_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        return NOISE_FILE_NAMES
            .iter()
            .any(|candidate| name.eq_ignore_ascii_case(candidate));
    }
    false
}

const IGNORED_SCOPES: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    // caches / builds
    ".cache",
    "node_modules",
    "build",
    "dist",
    "coverage",
    "target",
    "tmp",
    ".venv",
    "venv",
    "__pycache__",
    // data / vendor
    "vendor",
    "third_party",
    "third-party",
];

const NOISE_FILE_NAMES: &[&str] = &[
    ".gitignore",
    ".gitmodules",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "Cargo.lock",
    "poetry.lock",
];

const BINARY_EXTENSIONS: &[&str] = &[
    // images / media
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "svgz", "mp3", "mp4", "avi", "mov", "webm", "webp",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // archives
    "zip", "tar", "gz", "bz2", "xz", "7z", "jar",
    // compiled artifacts
    "exe", "dll", "so", "dylib", "a", "o", "class", "pyc", "pyo", "wasm",
    // data stores
    "sqlite", "db", "bin", "dat", "pdf",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_for(root: &Path) -> SyncConfig {
        SyncConfig::new(root)
    }

    #[test]
    fn scan_is_sorted_and_skips_output_tree() {
        let temp = tempdir().unwrap();
        let scribe_dir = temp.path().join(".scribe").join("src");
        fs::create_dir_all(&scribe_dir).unwrap();
        fs::write(scribe_dir.join("main.py.md"), b"doc").unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/b.py"), b"x = 1").unwrap();
        fs::write(temp.path().join("src/a.py"), b"y = 2").unwrap();
        fs::write(temp.path().join("README.md"), b"# readme").unwrap();

        let scanner = FileScanner::new(&config_for(temp.path()));
        let files = scanner.scan();

        assert!(files.iter().all(|p| !p.to_string_lossy().contains(".scribe")));
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["README.md", "src/a.py", "src/b.py"]);
    }

    #[test]
    fn scan_skips_binary_and_oversized_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("logo.png"), b"\x89PNG").unwrap();
        fs::write(temp.path().join("keep.py"), b"x = 1").unwrap();
        fs::write(temp.path().join("huge.py"), vec![b'#'; 64]).unwrap();

        let mut config = config_for(temp.path());
        config.max_source_bytes = 32;
        let scanner = FileScanner::new(&config);
        let files = scanner.scan();

        assert!(files.iter().any(|p| p.ends_with("keep.py")));
        assert!(files.iter().all(|p| !p.ends_with("logo.png")));
        assert!(files.iter().all(|p| !p.ends_with("huge.py")));
    }

    #[test]
    fn scan_skips_ignored_scopes() {
        let temp = tempdir().unwrap();
        let modules = temp.path().join("node_modules").join("pkg");
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("index.js"), b"x").unwrap();
        fs::write(temp.path().join("app.js"), b"x").unwrap();

        let scanner = FileScanner::new(&config_for(temp.path()));
        let files = scanner.scan();

        assert!(files.iter().all(|p| !p.to_string_lossy().contains("node_modules")));
        assert!(files.iter().any(|p| p.ends_with("app.js")));
    }
}
