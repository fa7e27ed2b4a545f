//! Tab-delimited text storage.
//!
//! On-disk format, UTF-8, one contact per line:
//! ```text
//! id<TAB>name<TAB>phone<TAB>comment
//! ```
//! There is no header. The file ends with a newline iff it holds at least one
//! contact. Line breaks inside a field are written as a single space; tabs
//! inside a field are not escaped.
//!
//! When reading, any Unicode line boundary ends a line: `\n`, `\r\n`, a
//! lone `\r`, and the rarer vertical tab, form feed, file/group/record
//! separators, NEL, and the line and paragraph separators. Blank lines are
//! skipped, lines with fewer than four fields get empty trailing fields,
//! fields past the fourth are ignored, and fields are trimmed. A line whose
//! id is not an integer in `1..u64::MAX` fails the whole load; the largest
//! `u64` is kept free so a loaded directory always has one id left to hand
//! out.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use phonebook_types::{Contact, ContactId};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::traits::ContactStorage;

const FIELD_SEPARATOR: char = '\t';

/// Characters that end a line on load, in addition to `\r\n`.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Text-file storage bound to a single path.
#[derive(Clone, Debug)]
pub struct TxtStorage {
    path: PathBuf,
}

impl TxtStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(&self, text: &str) -> Result<Vec<Contact>, StorageError> {
        let mut contacts = Vec::new();
        for (index, line) in split_lines(text).enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let contact = parse_line(line).map_err(|reason| StorageError::Parse {
                path: self.path.clone(),
                line: index + 1,
                reason,
            })?;
            contacts.push(contact);
        }
        Ok(contacts)
    }
}

impl ContactStorage for TxtStorage {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Contact>, StorageError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no directory file; starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };
        if !metadata.is_file() {
            return Err(StorageError::NotAFile {
                path: self.path.clone(),
            });
        }

        let text = fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let contacts = self.parse(&text)?;
        debug!(path = %self.path.display(), count = contacts.len(), "directory loaded");
        Ok(contacts)
    }

    fn save(&self, contacts: &[Contact]) -> Result<(), StorageError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;

        let text = render(contacts);

        // Write a sibling temp file, then rename it over the target.
        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| StorageError::io(parent, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::io(&self.path, e.error))?;

        debug!(path = %self.path.display(), count = contacts.len(), "directory saved");
        Ok(())
    }
}

fn parse_line(line: &str) -> Result<Contact, String> {
    let mut fields = line.split(FIELD_SEPARATOR).map(str::trim);
    let mut next = || fields.next().unwrap_or("");
    let raw_id = next();
    let name = next();
    let phone = next();
    let comment = next();

    let id: ContactId = raw_id
        .parse()
        .map_err(|e| format!("invalid id {raw_id:?}: {e}"))?;
    if id.get() == 0 {
        return Err("id must be positive".into());
    }
    if id.next().is_none() {
        return Err(format!("id {id} is too large"));
    }
    Ok(Contact::new(id, name, phone, comment))
}

/// Split on every line boundary, treating `\r\n` as one break.
///
/// A trailing break does not produce an extra empty line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(LINE_BREAKS) {
            Some(at) => {
                let line = &rest[..at];
                let tail = &rest[at..];
                let width = if tail.starts_with("\r\n") {
                    2
                } else {
                    tail.chars().next().map_or(1, char::len_utf8)
                };
                rest = &tail[width..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

fn render(contacts: &[Contact]) -> String {
    let mut out = String::new();
    for c in contacts {
        out.push_str(&c.id.to_string());
        for field in [&c.name, &c.phone, &c.comment] {
            out.push(FIELD_SEPARATOR);
            out.push_str(&flatten(field));
        }
        out.push('\n');
    }
    out
}

/// Replace embedded line breaks so a field stays on one line.
fn flatten(field: &str) -> String {
    field.replace("\r\n", " ").replace(LINE_BREAKS, " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Contact> {
        vec![
            Contact::new(ContactId::new(1), "Иван", "+7 (999) 123-45-67", "A"),
            Contact::new(ContactId::new(2), "Пётр", "8 800 555-35-35", "B"),
        ]
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TxtStorage::new(dir.path().join("book.txt"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TxtStorage::new(dir.path().join("book.txt"));
        storage.save(&sample()).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded, sample());
        assert_eq!(loaded[0].name, "Иван");
        assert!(loaded[1].phone.starts_with("8 800"));
    }

    #[test]
    fn saved_text_matches_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        TxtStorage::new(&path).save(&sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "1\tИван\t+7 (999) 123-45-67\tA\n2\tПётр\t8 800 555-35-35\tB\n"
        );
    }

    #[test]
    fn empty_directory_saves_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        TxtStorage::new(&path).save(&[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn save_keeps_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TxtStorage::new(dir.path().join("book.txt"));
        let mut contacts = sample();
        contacts.reverse();
        storage.save(&contacts).unwrap();
        let ids: Vec<u64> = storage.load().unwrap().iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, [2, 1]);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("book.txt");
        let storage = TxtStorage::new(&path);
        storage.save(&sample()).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn save_replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "99\tOld\t123456\t\n").unwrap();

        TxtStorage::new(&path).save(&sample()).unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        assert_eq!(loaded, sample());
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1, "temp file must not be left behind");
    }

    #[test]
    fn newlines_in_fields_become_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        let contact = Contact::new(ContactId::new(1), "Multi\nLine", "123456", "a\r\nb");
        TxtStorage::new(&path).save(&[contact]).unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        assert_eq!(loaded[0].name, "Multi Line");
        assert_eq!(loaded[0].comment, "a b");
    }

    #[test]
    fn unicode_line_separators_in_fields_become_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        let contact = Contact::new(ContactId::new(1), "Para\u{2029}graph", "123456", "x\u{85}y");
        TxtStorage::new(&path).save(&[contact]).unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Para graph");
        assert_eq!(loaded[0].comment, "x y");
    }

    #[test]
    fn short_lines_are_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "3\tOnly Name\n4\tName\t123456\n").unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        assert_eq!(loaded[0], Contact::new(ContactId::new(3), "Only Name", "", ""));
        assert_eq!(loaded[1], Contact::new(ContactId::new(4), "Name", "123456", ""));
    }

    #[test]
    fn fields_past_the_fourth_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "6\tAlex\t123456\tnote\tstray\n").unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        assert_eq!(loaded[0].comment, "note");
    }

    #[test]
    fn blank_lines_are_skipped_and_fields_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "\n  \n 5 \t Alex \t 123456 \t note \n\n").unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        assert_eq!(loaded, vec![Contact::new(ContactId::new(5), "Alex", "123456", "note")]);
    }

    #[test]
    fn non_numeric_id_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "1\tOk\t123456\t\nabc\tName\t+7 999\tComment\n").unwrap();

        let err = TxtStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn zero_id_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "0\tName\t123456\t\n").unwrap();
        assert!(matches!(
            TxtStorage::new(&path).load(),
            Err(StorageError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn largest_id_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "18446744073709551615\tMax\t123456\t\n").unwrap();

        let err = TxtStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Parse { line: 1, .. }), "{err}");
        assert!(err.to_string().contains("too large"), "{err}");
    }

    #[test]
    fn id_just_below_the_largest_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "18446744073709551614\tAlmost\t123456\t\n").unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        assert_eq!(loaded[0].id, ContactId::new(u64::MAX - 1));
    }

    #[test]
    fn every_line_boundary_ends_a_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(
            &path,
            "1\tA\t111111\r2\tB\t222222\u{2028}3\tC\t333333\x0c4\tD\t444444\u{85}5\tE\t555555\r\n",
        )
        .unwrap();

        let loaded = TxtStorage::new(&path).load().unwrap();
        let names: Vec<&str> = loaded.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);
        assert_eq!(loaded[0].phone, "111111");
    }

    #[test]
    fn line_numbers_count_lone_carriage_returns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, "1\tA\t111111\rbad\tB\t222222\n").unwrap();

        let err = TxtStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn split_lines_handles_crlf_and_trailing_break() {
        assert_eq!(split_lines("a\r\nb\n").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(split_lines("a\n\nb").collect::<Vec<_>>(), ["a", "", "b"]);
        assert_eq!(split_lines("\u{2029}x").collect::<Vec<_>>(), ["", "x"]);
        assert_eq!(split_lines("").count(), 0);
    }

    #[test]
    fn loading_a_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TxtStorage::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, StorageError::NotAFile { .. }));
    }

    #[test]
    fn invalid_utf8_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        fs::write(&path, [0xff, 0xfe, b'\t', b'x']).unwrap();
        assert!(matches!(
            TxtStorage::new(&path).load(),
            Err(StorageError::Io { .. })
        ));
    }
}
