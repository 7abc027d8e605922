use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("video directory {} does not exist", .0.display())]
    DirectoryMissing(PathBuf),
    #[error("failed to read video directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no videos with extension {extensions:?} found in {}", .path.display())]
    Empty {
        path: PathBuf,
        extensions: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    /// File name, also the key into the location table.
    pub name: String,
    pub path: PathBuf,
}

/// Sorted, non-empty list of video files.
#[derive(Debug, Clone)]
pub struct Playlist {
    entries: Vec<VideoEntry>,
}

impl Playlist {
    pub fn scan(directory: &Path, extensions: &[String]) -> Result<Self, PlaylistError> {
        if !directory.is_dir() {
            return Err(PlaylistError::DirectoryMissing(directory.to_path_buf()));
        }

        let io_error = |source: std::io::Error| PlaylistError::Io {
            path: directory.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir(directory).map_err(io_error)? {
            let dir_entry = dir_entry.map_err(io_error)?;
            let path = dir_entry.path();
            if !path.is_file() || !has_extension(&path, extensions) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            entries.push(VideoEntry {
                name: name.to_string(),
                path: path.clone(),
            });
        }

        Self::from_entries(entries).ok_or_else(|| PlaylistError::Empty {
            path: directory.to_path_buf(),
            extensions: extensions.to_vec(),
        })
    }

    /// Sorts by name. Returns `None` for an empty list.
    pub fn from_entries(mut entries: Vec<VideoEntry>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Some(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> &VideoEntry {
        &self.entries[index % self.entries.len()]
    }

    pub fn entries(&self) -> &[VideoEntry] {
        &self.entries
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}
