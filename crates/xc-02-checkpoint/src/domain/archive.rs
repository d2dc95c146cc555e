//! # Archive Codec
//!
//! Directory tree <-> zstd-compressed tar stream.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Pack every file under `src` into `out`, with paths relative to `src`.
pub fn pack(src: &Path, out: File, level: i32) -> io::Result<()> {
    let encoder = zstd::Encoder::new(out, level)?;
    let mut builder = tar::Builder::new(encoder);

    let mut pending: Vec<PathBuf> = vec![PathBuf::new()];
    while let Some(rel) = pending.pop() {
        let dir = src.join(&rel);
        let mut entries: Vec<_> = fs::read_dir(&dir)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let rel_path = rel.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                builder.append_dir(&rel_path, entry.path())?;
                pending.push(rel_path);
            } else {
                builder.append_path_with_name(entry.path(), &rel_path)?;
            }
        }
    }

    let encoder = builder.into_inner()?;
    let file = encoder.finish()?;
    file.sync_all()
}

pub fn unpack(archive: &Path, dest: &Path) -> io::Result<()> {
    let decoder = zstd::Decoder::new(File::open(archive)?)?;
    tar::Archive::new(decoder).unpack(dest)
}

/// Stream the archive until the top-level entry `name` and return its text.
pub fn read_entry(archive: &Path, name: &str) -> io::Result<Option<String>> {
    let decoder = zstd::Decoder::new(File::open(archive)?)?;
    let mut tar = tar::Archive::new(decoder);
    for entry in tar.entries()? {
        let mut entry = entry?;
        if entry.path()?.as_ref() == Path::new(name) {
            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            return Ok(Some(text));
        }
    }
    Ok(None)
}

/// Recursive copy of a directory tree into `dest` (created).
pub fn copy_dir(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_tree() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), "alpha").unwrap();
        fs::write(src.join("sub").join("b.txt"), "beta").unwrap();

        let archive = root.path().join("out.tar.zst");
        pack(&src, File::create(&archive).unwrap(), 1).unwrap();

        let dest = root.path().join("dest");
        unpack(&archive, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(dest.join("sub").join("b.txt")).unwrap(), "beta");

        assert_eq!(read_entry(&archive, "a.txt").unwrap().as_deref(), Some("alpha"));
        assert_eq!(read_entry(&archive, "missing").unwrap(), None);
    }

    #[test]
    fn test_read_entry_on_non_archive_fails() {
        let root = tempfile::tempdir().unwrap();
        let bogus = root.path().join("bogus");
        fs::write(&bogus, "definitely not zstd").unwrap();
        assert!(read_entry(&bogus, "x").is_err());
    }
}
