use crate::error::{IndexError, IndexResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the index file
pub const INDEX_ENV: &str = "CSEARCHINDEX";

/// File name of the index under the home directory
const DEFAULT_INDEX_NAME: &str = ".csearchindex";

/// Location of the index: `$CSEARCHINDEX`, else `~/.csearchindex`
pub fn index_file() -> IndexResult<PathBuf> {
    resolve_index_path(std::env::var_os(INDEX_ENV), dirs::home_dir().as_deref())
}

/// Pure form of [`index_file`], taking the environment as arguments
pub fn resolve_index_path(env: Option<OsString>, home: Option<&Path>) -> IndexResult<PathBuf> {
    match env {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => home
            .map(|h| h.join(DEFAULT_INDEX_NAME))
            .ok_or(IndexError::NoLocation),
    }
}

/// Turn an indexed name back into the exact path it was recorded from
#[cfg(unix)]
pub fn path_from_bytes(name: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(name))
}

/// Turn an indexed name back into a path. Names are UTF-8 off unix.
#[cfg(not(unix))]
pub fn path_from_bytes(name: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(name).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_wins() {
        let path = resolve_index_path(Some("/tmp/idx".into()), Some(Path::new("/home/u"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/idx"));
    }

    #[test]
    fn test_empty_env_falls_back_to_home() {
        let path = resolve_index_path(Some(OsString::new()), Some(Path::new("/home/u"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.csearchindex"));

        let path = resolve_index_path(None, Some(Path::new("/home/u"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.csearchindex"));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_from_bytes_keeps_invalid_utf8() {
        use std::os::unix::ffi::OsStrExt;
        let path = path_from_bytes(b"/src/f\xff.txt");
        assert_eq!(path.as_os_str().as_bytes(), b"/src/f\xff.txt");
    }

    #[test]
    fn test_no_location() {
        assert!(matches!(resolve_index_path(None, None), Err(IndexError::NoLocation)));
    }
}
