//! Filesystem image bucket
//!
//! Objects live under a root directory and are served by the binary as
//! static files; the public URL is `{public_base_url}/{object_name}`.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::domain::repository::ImageBucket;
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone)]
pub struct FsImageBucket {
    root: PathBuf,
    public_base_url: String,
}

impl FsImageBucket {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Object names are relative paths without `..` segments
    fn path_for(&self, object_name: &str) -> CatalogResult<PathBuf> {
        let relative = Path::new(object_name);
        let safe = !object_name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(CatalogError::Bucket(format!(
                "Invalid object name: {}",
                object_name
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ImageBucket for FsImageBucket {
    async fn upload(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> CatalogResult<String> {
        let path = self.path_for(object_name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(object_name, content_type, size = bytes.len(), "Image stored");
        Ok(format!("{}/{}", self.public_base_url, object_name))
    }

    async fn delete(&self, object_name: &str) -> CatalogResult<()> {
        let path = self.path_for(object_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
