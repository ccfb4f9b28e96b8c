//! Payload selection inside a staged zip archive.
//!
//! A candidate entry's base name is `<digits>.<ext>`. The entry named exactly
//! `<id>.<ext>` wins; otherwise the first candidate in archive order is used.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::AcquireError;
use crate::jobs::AppId;

/// Largest payload accepted. Declared entry sizes come from the mirror and are
/// never trusted for allocation.
pub const MAX_PAYLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Decoded payload chosen from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Full entry path inside the archive.
    pub entry_name: String,
    pub text: String,
    /// True when invalid UTF-8 was replaced with U+FFFD.
    pub lossy: bool,
}

/// Final path component of a zip entry name (either separator).
pub fn base_name(entry_name: &str) -> &str {
    entry_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry_name)
}

/// True if `base` is `<one or more ASCII digits>.<ext>`.
pub fn is_payload_name(base: &str, ext: &str) -> bool {
    match base.rsplit_once('.') {
        Some((stem, e)) => {
            e == ext && !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Pick the entry to install from `names` (archive enumeration order).
/// Returns the index into `names`.
pub fn choose_entry<S: AsRef<str>>(names: &[S], id: AppId, ext: &str) -> Option<usize> {
    let preferred = format!("{}.{}", id, ext);
    let mut first = None;
    for (i, name) in names.iter().enumerate() {
        let base = base_name(name.as_ref());
        if !is_payload_name(base, ext) {
            continue;
        }
        if base == preferred {
            return Some(i);
        }
        first.get_or_insert(i);
    }
    first
}

/// Strict UTF-8 first; lossy replacement only if that fails.
pub fn decode_text(data: Vec<u8>) -> (String, bool) {
    match String::from_utf8(data) {
        Ok(text) => (text, false),
        Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
    }
}

/// Read at most `limit` bytes; anything longer is a malformed archive.
pub fn read_bounded<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>, AcquireError> {
    let mut data = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut data)
        .map_err(AcquireError::malformed)?;
    if data.len() as u64 > limit {
        return Err(AcquireError::malformed(format!(
            "payload entry exceeds {} bytes",
            limit
        )));
    }
    Ok(data)
}

/// Open the staged archive at `path` and return the payload for `id`.
pub fn select_payload(path: &Path, id: AppId, ext: &str) -> Result<Payload, AcquireError> {
    let file = File::open(path).map_err(AcquireError::malformed)?;
    let mut archive = zip::ZipArchive::new(file).map_err(AcquireError::malformed)?;

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(AcquireError::malformed)?;
        // Directories never match; keep the slot so indices stay aligned.
        if entry.is_dir() {
            names.push(String::new());
        } else {
            names.push(entry.name().to_string());
        }
    }

    let index = choose_entry(&names, id, ext).ok_or_else(|| AcquireError::NoMatchingPayload {
        ext: ext.to_string(),
    })?;

    let entry = archive.by_index(index).map_err(AcquireError::malformed)?;
    let data = read_bounded(entry, MAX_PAYLOAD_BYTES)?;
    let (text, lossy) = decode_text(data);
    if lossy {
        tracing::warn!(appid = %id, entry = %names[index], "payload is not valid UTF-8; replaced invalid bytes");
    }

    Ok(Payload {
        entry_name: names[index].clone(),
        text,
        lossy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn id(n: u32) -> AppId {
        AppId::new(n).unwrap()
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(body).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn payload_name_pattern() {
        assert!(is_payload_name("70.lua", "lua"));
        assert!(is_payload_name("0012.lua", "lua"));
        assert!(!is_payload_name(".lua", "lua"));
        assert!(!is_payload_name("70a.lua", "lua"));
        assert!(!is_payload_name("70.lua.bak", "lua"));
        assert!(!is_payload_name("70.LUA", "lua"));
        assert!(!is_payload_name("Steamtools.lua", "lua"));
        assert!(!is_payload_name("70", "lua"));
    }

    #[test]
    fn base_name_handles_nested_paths() {
        assert_eq!(base_name("GameLibrary-70/70.lua"), "70.lua");
        assert_eq!(base_name("a\\b\\12.lua"), "12.lua");
        assert_eq!(base_name("12.lua"), "12.lua");
    }

    #[test]
    fn exact_match_preferred_over_order() {
        let names = ["7.lua", "12.lua", "99.lua"];
        assert_eq!(choose_entry(&names, id(12), "lua"), Some(1));
    }

    #[test]
    fn first_candidate_when_no_exact_match() {
        let names = ["readme.txt", "7.lua", "99.lua"];
        assert_eq!(choose_entry(&names, id(12), "lua"), Some(1));
    }

    #[test]
    fn no_candidates() {
        let names = ["readme.txt", "Steamtools.lua", "x/1.manifest"];
        assert_eq!(choose_entry(&names, id(12), "lua"), None);
    }

    #[test]
    fn decode_falls_back_to_lossy() {
        let (text, lossy) = decode_text(b"ok\n".to_vec());
        assert_eq!(text, "ok\n");
        assert!(!lossy);
        let (text, lossy) = decode_text(vec![b'a', 0xff, b'b']);
        assert_eq!(text, "a\u{FFFD}b");
        assert!(lossy);
    }

    #[test]
    fn select_from_zip_prefers_exact_nested_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("12.zip");
        write_zip(
            &path,
            &[
                ("repo-12/", b""),
                ("repo-12/7.lua", b"seven"),
                ("repo-12/12.lua", b"twelve"),
                ("repo-12/99.lua", b"ninety-nine"),
            ],
        );
        let p = select_payload(&path, id(12), "lua").unwrap();
        assert_eq!(p.entry_name, "repo-12/12.lua");
        assert_eq!(p.text, "twelve");
        assert!(!p.lossy);
    }

    #[test]
    fn select_from_zip_uses_first_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("12.zip");
        write_zip(&path, &[("7.lua", b"seven"), ("99.lua", b"ninety-nine")]);
        let p = select_payload(&path, id(12), "lua").unwrap();
        assert_eq!(p.entry_name, "7.lua");
        assert_eq!(p.text, "seven");
    }

    #[test]
    fn select_reports_no_matching_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.zip");
        write_zip(&path, &[("notes.txt", b"hi")]);
        let err = select_payload(&path, id(1), "lua").unwrap_err();
        assert!(matches!(err, AcquireError::NoMatchingPayload { .. }));
        assert_eq!(err.to_string(), "No numeric .lua file found in zip");
    }

    #[test]
    fn select_reports_malformed_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.zip");
        std::fs::write(&path, b"<html>not a zip</html>").unwrap();
        let err = select_payload(&path, id(1), "lua").unwrap_err();
        assert!(matches!(err, AcquireError::MalformedArchive { .. }));
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = !0u32;
        for &b in data {
            crc ^= b as u32;
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    /// Stored single-entry zip whose central directory declares `declared`
    /// uncompressed bytes through a zip64 extra field.
    fn zip64_with_declared_size(name: &str, body: &[u8], declared: u64) -> Vec<u8> {
        let crc = crc32(body);
        let mut out = Vec::new();
        // local file header
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // flags
        out.extend_from_slice(&0u16.to_le_bytes()); // stored
        out.extend_from_slice(&0u16.to_le_bytes()); // time
        out.extend_from_slice(&0x21u16.to_le_bytes()); // date
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(body);

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes()); // made by
        out.extend_from_slice(&45u16.to_le_bytes()); // needed
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x21u16.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&u32::MAX.to_le_bytes()); // size in zip64 extra
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&12u16.to_le_bytes()); // extra len
        out.extend_from_slice(&0u16.to_le_bytes()); // comment len
        out.extend_from_slice(&0u16.to_le_bytes()); // disk
        out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&declared.to_le_bytes());
        let cd_size = out.len() as u32 - cd_offset;

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn huge_declared_size_does_not_drive_allocation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("12.zip");
        std::fs::write(&path, zip64_with_declared_size("12.lua", b"twelve", 1 << 46)).unwrap();
        // Reaching either arm means no allocation was sized from the header.
        match select_payload(&path, id(12), "lua") {
            Ok(p) => assert_eq!(p.text, "twelve"),
            Err(e) => assert!(matches!(e, AcquireError::MalformedArchive { .. }), "{e}"),
        }
    }

    #[test]
    fn bounded_read_rejects_oversized_entry() {
        assert_eq!(read_bounded(&b"abcd"[..], 4).unwrap(), b"abcd");
        let err = read_bounded(&b"abcde"[..], 4).unwrap_err();
        assert!(matches!(err, AcquireError::MalformedArchive { .. }));
        assert!(err.to_string().contains("exceeds 4 bytes"));
    }

    #[test]
    fn select_decodes_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("5.zip");
        write_zip(&path, &[("5.lua", &[b'x', 0xfe, b'\n'])]);
        let p = select_payload(&path, id(5), "lua").unwrap();
        assert!(p.lossy);
        assert_eq!(p.text, "x\u{FFFD}\n");
    }
}
