// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.


static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Maps an id or blob-key segment to a file name. Unsafe bytes are percent-encoded, so record
/// files stay readable for ordinary UUID ids and never start with a dot.
fn encode_file_segment(segment: &str) -> String {
    let last = segment.len().saturating_sub(1);
    let mut out = String::with_capacity(segment.len());
    for (i, b) in segment.bytes().enumerate() {
        let keep = b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_')
            || (b == b'.' && i != 0 && i != last);
        if keep {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02x}"));
        }
    }
    out
}

/// `Some(len)` for a regular file, `None` when missing or not a file. Symlinks are refused.
fn regular_file_len(path: &Path) -> Result<Option<u64>, StoreError> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => Err(StoreError::SymlinkRefused {
            path: path.to_path_buf(),
        }),
        Ok(md) => Ok(md.is_file().then_some(md.len())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(io_at(path)(source)),
    }
}

fn read_regular_file(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match regular_file_len(path)? {
        Some(_) => fs::read(path).map(Some).map_err(io_at(path)),
        None => Ok(None),
    }
}

/// Creates `root/relative` one directory at a time, refusing symlinked or non-directory
/// components along the way.
fn ensure_dirs(root: &Path, relative: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(root).map_err(io_at(root))?;
    let mut current = root.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            return Err(StoreError::InvalidKey {
                key: relative.display().to_string(),
                reason: "path must only contain normal components",
            });
        };
        current.push(part);
        match fs::symlink_metadata(&current) {
            Ok(md) if md.file_type().is_symlink() => {
                return Err(StoreError::SymlinkRefused { path: current });
            }
            Ok(md) if md.is_dir() => {}
            Ok(_) => {
                let source = io::Error::new(io::ErrorKind::AlreadyExists, "expected directory");
                return Err(StoreError::Io {
                    path: current,
                    source,
                });
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(io_at(&current))?;
            }
            Err(source) => return Err(StoreError::Io { path: current, source }),
        }
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    let file_name = path.file_name()?.to_string_lossy();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    Some(parent.join(format!(
        "{TEMP_FILE_PREFIX}{file_name}.{}.{seq}",
        std::process::id()
    )))
}

/// Writes `contents` to `root/relative` through a sibling temp file and a rename, so readers
/// see either the old or the new bytes.
fn write_atomic(
    root: &Path,
    relative: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    ensure_dirs(root, relative.parent().unwrap_or_else(|| Path::new("")))?;

    let path = root.join(relative);
    if let Ok(md) = fs::symlink_metadata(&path) {
        if md.file_type().is_symlink() {
            return Err(StoreError::SymlinkRefused { path });
        }
    }
    let Some(tmp_path) = temp_path_for(&path) else {
        return Err(StoreError::InvalidKey {
            key: relative.display().to_string(),
            reason: "path must name a file",
        });
    };

    let written = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            if durability == WriteDurability::Durable {
                file.sync_all()?;
            }
            Ok(())
        })
        .and_then(|()| fs::rename(&tmp_path, &path));
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io { path, source });
    }

    if durability == WriteDurability::Durable {
        sync_parent(&path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    fs::File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(io_at(parent))
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}
