use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::KeeperError;
use crate::fingerprint::Fingerprint;

/// Durable mapping from tracked path to the fingerprint of its last
/// recorded diff.
///
/// On disk this is one `path fingerprint` line per entry. Fingerprints never
/// contain spaces, so lines are split on the last space and paths may contain
/// spaces. Entries are written in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintStore {
    path: PathBuf,
    entries: BTreeMap<String, Fingerprint>,
}

impl FingerprintStore {
    /// Create the output directory and an empty store file if either is
    /// missing. Safe to call before every scan.
    pub fn ensure_exists(output_dir: &Path, store_path: &Path) -> Result<(), KeeperError> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|e| KeeperError::io(output_dir, e))?;
            debug!(dir = %output_dir.display(), "Created output directory");
        }

        if !store_path.exists() {
            fs::File::create(store_path).map_err(|e| KeeperError::io(store_path, e))?;
            debug!(path = %store_path.display(), "Created empty fingerprint store");
        }

        Ok(())
    }

    /// An empty store that will be saved to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Read the store from disk. A missing file is an empty store; a line
    /// without a separating space is an error.
    pub fn load(path: &Path) -> Result<Self, KeeperError> {
        if !path.exists() {
            return Ok(Self::empty(path));
        }

        let content = fs::read_to_string(path).map_err(|e| KeeperError::io(path, e))?;
        let store = Self::parse(path, &content)?;

        debug!(path = %path.display(), entries = store.len(), "Loaded fingerprint store");

        Ok(store)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, KeeperError> {
        let mut entries = BTreeMap::new();

        for (idx, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            let (file, fingerprint) =
                line.rsplit_once(' ')
                    .ok_or_else(|| KeeperError::StoreParse {
                        path: path.to_path_buf(),
                        line_number: idx + 1,
                        line: line.to_string(),
                    })?;

            entries.insert(file.to_string(), Fingerprint::from(fingerprint));
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Rewrite the whole store file. The new content goes to a temporary file
    /// in the same directory which then replaces the store, so a crash leaves
    /// either the old or the new store behind.
    pub fn save(&self) -> Result<(), KeeperError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| KeeperError::io(dir, e))?;
        tmp.write_all(self.render().as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| KeeperError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| KeeperError::io(&self.path, e.error))?;

        debug!(path = %self.path.display(), entries = self.len(), "Saved fingerprint store");

        Ok(())
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (file, fingerprint) in &self.entries {
            out.push_str(file);
            out.push(' ');
            out.push_str(fingerprint.as_str());
            out.push('\n');
        }
        out
    }

    pub fn lookup(&self, file: &str) -> Option<&Fingerprint> {
        self.entries.get(file)
    }

    /// Merge newly recorded fingerprints, replacing older values for the
    /// same path
    pub fn merge(&mut self, updates: impl IntoIterator<Item = (String, Fingerprint)>) {
        self.entries.extend(updates);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_exists_creates_dir_and_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("Keeper_Of_Changes");
        let store_path = output.join("hashes.txt");

        FingerprintStore::ensure_exists(&output, &store_path).unwrap();
        assert!(output.is_dir());
        assert_eq!(fs::read_to_string(&store_path).unwrap(), "");

        // Second call leaves existing content alone
        fs::write(&store_path, "a.txt abc\n").unwrap();
        FingerprintStore::ensure_exists(&output, &store_path).unwrap();
        assert_eq!(fs::read_to_string(&store_path).unwrap(), "a.txt abc\n");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FingerprintStore::load(&dir.path().join("hashes.txt")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_path_with_spaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashes.txt");
        fs::write(&path, "docs/my notes.txt abc123\nsrc/lib.rs def456\n").unwrap();

        let store = FingerprintStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.lookup("docs/my notes.txt").map(Fingerprint::as_str),
            Some("abc123")
        );
        assert_eq!(
            store.lookup("src/lib.rs").map(Fingerprint::as_str),
            Some("def456")
        );
    }

    #[test]
    fn test_load_rejects_line_without_space() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashes.txt");
        fs::write(&path, "a.txt abc\ngarbage\n").unwrap();

        match FingerprintStore::load(&path).unwrap_err() {
            KeeperError::StoreParse {
                line_number, line, ..
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "garbage");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_tolerates_blank_lines_and_crlf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashes.txt");
        fs::write(&path, "a.txt abc\r\n\r\n\nb.txt def\n").unwrap();

        let store = FingerprintStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup("a.txt").map(Fingerprint::as_str), Some("abc"));
    }

    #[test]
    fn test_duplicate_path_keeps_last() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashes.txt");
        fs::write(&path, "a.txt old\na.txt new\n").unwrap();

        let store = FingerprintStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("a.txt").map(Fingerprint::as_str), Some("new"));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashes.txt");

        let mut store = FingerprintStore::empty(&path);
        store.merge([
            ("a.txt".to_string(), Fingerprint::of("+foo")),
            ("dir with space/b c.txt".to_string(), Fingerprint::of("+bar")),
        ]);
        store.save().unwrap();

        let loaded = FingerprintStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(
            loaded.lookup("dir with space/b c.txt"),
            Some(&Fingerprint::of("+bar"))
        );
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashes.txt");
        fs::write(&path, "stale.txt 000\nother.txt 111\n").unwrap();

        let mut store = FingerprintStore::empty(&path);
        store.merge([("a.txt".to_string(), Fingerprint::from("abc"))]);
        store.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a.txt abc\n");
        // No temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_merge_replaces_existing_entry() {
        let mut store = FingerprintStore::empty("hashes.txt");
        store.merge([("a.txt".to_string(), Fingerprint::from("one"))]);
        store.merge([
            ("a.txt".to_string(), Fingerprint::from("two")),
            ("b.txt".to_string(), Fingerprint::from("three")),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup("a.txt").map(Fingerprint::as_str), Some("two"));
        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a.txt", "b.txt"]);
    }
}
