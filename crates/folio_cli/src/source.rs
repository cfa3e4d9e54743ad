use std::path::{Component, Path, PathBuf};

use folio_core::loader::{FetchError, PostSource};

/// Serves post bytes straight from a content directory. Resource paths are
/// site-absolute ("/data/blog-posts/x.json") and resolve under `root`.
pub struct FsPostSource {
    root: PathBuf,
}

impl FsPostSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsPostSource { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = Path::new(path.trim_start_matches('/'));
        let mut clean = PathBuf::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if clean.as_os_str().is_empty() {
            None
        } else {
            Some(self.root.join(clean))
        }
    }
}

impl PostSource for FsPostSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full_path = match self.resolve(path) {
            Some(path) => path,
            None => return Err(FetchError::NotFound),
        };
        if !full_path.is_file() {
            return Err(FetchError::NotFound);
        }
        std::fs::read(&full_path).map_err(|err| FetchError::Failed(err.to_string()))
    }
}
