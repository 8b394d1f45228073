//! Lookups over Valve KeyValues files (`.vdf`, `.acf`), parsed by `keyvalues-parser`.

use std::fs;
use std::path::Path;

use keyvalues_parser::{Obj, Value, Vdf};

use crate::error::{Error, Result};

/// Parse the file at `path` and run `lookup` on the document.
///
/// The parsed tree borrows the file contents, so lookups happen inside the
/// closure and return owned values.
pub fn read_with<T, F>(path: &Path, lookup: F) -> Result<T>
where
    F: FnOnce(&Vdf<'_>) -> Result<T>,
{
    let content = fs::read_to_string(path)?;
    let vdf = Vdf::parse(&content).map_err(|e| malformed(path, e.to_string()))?;
    lookup(&vdf)
}

/// Root object of `vdf` if its key is `name`.
pub fn root<'a>(vdf: &'a Vdf<'_>, name: &str) -> Option<&'a Obj<'a>> {
    if vdf.key.eq_ignore_ascii_case(name) {
        vdf.value.get_obj()
    } else {
        None
    }
}

/// First value under `key`. Steam writes canonical casing, but lookups
/// fall back to a case-insensitive match as Steam itself does.
pub fn first<'a>(obj: &'a Obj<'_>, key: &str) -> Option<&'a Value<'a>> {
    obj.get(key)
        .or_else(|| {
            obj.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, values)| values)
        })
        .and_then(|values| values.first())
}

pub fn str_value<'a>(obj: &'a Obj<'_>, key: &str) -> Option<&'a str> {
    first(obj, key).and_then(Value::get_str)
}

pub fn obj_value<'a>(obj: &'a Obj<'_>, key: &str) -> Option<&'a Obj<'a>> {
    first(obj, key).and_then(Value::get_obj)
}

pub(crate) fn malformed(path: &Path, message: impl Into<String>) -> Error {
    Error::KeyValues {
        file: path.display().to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY_FOLDERS: &str = r#"
"libraryfolders"
{
	"0"
	{
		"path"		"C:\\Program Files (x86)\\Steam"
		"label"		""
		"apps"
		{
			"228980"		"1021025597"
		}
	}
	"1"
	{
		"path"		"D:\\SteamLibrary"
		"apps"
		{
			"570"		"41230014217"
		}
	}
}
"#;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_library_folders_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "libraryfolders.vdf", LIBRARY_FOLDERS);

        let library = read_with(&path, |vdf| {
            let folders = root(vdf, "libraryfolders").unwrap();
            let second = obj_value(folders, "1").unwrap();
            assert!(obj_value(second, "apps").unwrap().contains_key("570"));
            assert_eq!(str_value(obj_value(folders, "0").unwrap(), "label"), Some(""));
            Ok(str_value(second, "path").map(str::to_string))
        })
        .unwrap();
        assert_eq!(library.as_deref(), Some(r"D:\SteamLibrary"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "app.acf", "\"AppState\"\n{\n\t\"StateFlags\"\t\t\"4\"\n}\n");

        let flags = read_with(&path, |vdf| {
            let state = root(vdf, "appstate").unwrap();
            Ok(str_value(state, "stateflags").map(str::to_string))
        })
        .unwrap();
        assert_eq!(flags.as_deref(), Some("4"));
    }

    #[test]
    fn test_wrong_root_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "app.acf", "\"AppState\"\n{\n}\n");
        let found = read_with(&path, |vdf| Ok(root(vdf, "libraryfolders").is_some())).unwrap();
        assert!(!found);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "broken.vdf", "\"a\" {");
        let err = read_with(&path, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::KeyValues { .. }));
        assert!(err.to_string().contains("broken.vdf"));
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_with(&dir.path().join("missing.vdf"), |_| Ok(())).unwrap_err();
        assert!(err.is_not_found());
    }
}
