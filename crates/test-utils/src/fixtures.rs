#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use pollwatch::watch::WatchedDirectory;
use tempfile::TempDir;

/// How far in the past fixture files are stamped when created.
pub const BACKDATE: Duration = Duration::from_secs(3600);

/// A temporary directory tree whose files start out "old", so that only
/// files a test explicitly touches look modified.
pub struct FixtureTree {
    dir: TempDir,
}

impl FixtureTree {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// The classic layout:
    ///
    /// ```text
    /// .dotfile
    /// folder1/file1.txt
    /// folder1/deletedfile1.txt
    /// folder1/movedfile1.txt
    /// folder1/folder2/file2.txt
    /// ```
    pub fn standard() -> io::Result<Self> {
        Self::new()?
            .with_old_file(".dotfile")?
            .with_old_file("folder1/file1.txt")?
            .with_old_file("folder1/deletedfile1.txt")?
            .with_old_file("folder1/movedfile1.txt")?
            .with_old_file("folder1/folder2/file2.txt")
    }

    pub fn with_old_file(self, rel: &str) -> io::Result<Self> {
        self.write(rel, "")?;
        self.backdate(rel)?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Shallow watch entry for `rel`.
    pub fn dir(&self, rel: &str) -> WatchedDirectory {
        WatchedDirectory::new(self.path(rel))
    }

    pub fn write(&self, rel: &str, contents: &str) -> io::Result<()> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    pub fn set_mtime(&self, rel: &str, time: SystemTime) -> io::Result<()> {
        fs::File::options()
            .write(true)
            .open(self.path(rel))?
            .set_modified(time)
    }

    /// Stamp `rel` with the current time.
    pub fn touch(&self, rel: &str) -> io::Result<()> {
        self.set_mtime(rel, SystemTime::now())
    }

    pub fn touch_all(&self, rels: &[&str]) -> io::Result<()> {
        for rel in rels {
            self.touch(rel)?;
        }
        Ok(())
    }

    pub fn backdate(&self, rel: &str) -> io::Result<()> {
        self.set_mtime(rel, SystemTime::now() - BACKDATE)
    }

    pub fn remove(&self, rel: &str) -> io::Result<()> {
        fs::remove_file(self.path(rel))
    }

    /// Rename within the tree; like `mv`, this keeps the file's mtime.
    pub fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        fs::rename(self.path(from), self.path(to))
    }

    /// Every regular file in the tree, found with a plain `std::fs` walk.
    pub fn walk_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut stack = vec![self.root().to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }
        Ok(files)
    }
}
