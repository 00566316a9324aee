//! Capability-based file access for weight tables, prompts, site scripts and
//! the screenshot audit trail.
#![forbid(unsafe_code)]

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Write};

/// Read a UTF-8 file into a string.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = containing_dir(path)?;
    dir.read_to_string(name)
}

/// Return whether a path exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = containing_dir(path)?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// Write `contents` to `path`, creating missing parent directories first.
pub fn write_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    create_parents(path)?;
    let (dir, name) = containing_dir(path)?;
    dir.write(name, contents)
}

/// Append a single line to `path`, creating the file and its parents when missing.
///
/// The line and its terminator go out in one write on a file opened for
/// appending, so concurrent writers never split each other's lines.
pub fn append_line(path: &Utf8Path, line: &str) -> io::Result<()> {
    let mut entry = String::with_capacity(line.len().saturating_add(1));
    entry.push_str(line);
    entry.push('\n');
    create_parents(path)?;
    let (dir, name) = containing_dir(path)?;
    let mut file = dir.open_with(name, OpenOptions::new().create(true).append(true))?;
    file.write_all(entry.as_bytes())
}

fn containing_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &str)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

fn create_parents(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    // cap-std refuses absolute paths, so anchor at the root or drive and
    // create the remainder relative to it.
    let mut anchor = Utf8PathBuf::new();
    let mut below = Utf8PathBuf::new();
    for component in parent.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir if below.as_str().is_empty() => {
                anchor.push(component);
            }
            other => below.push(other),
        }
    }
    if below.as_str().is_empty() {
        return Ok(());
    }
    if anchor.as_str().is_empty() {
        anchor.push(".");
    }
    fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?.create_dir_all(&below)
}
