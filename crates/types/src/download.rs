//! Single asset transfer description

use std::path::{Component, Path, PathBuf};

use lwdump_errors::{DownloadError, Error};
use serde::{Deserialize, Serialize};

/// Ceiling on simultaneous asset transfers
pub const MAX_CONCURRENT_DOWNLOADS: usize = 16;

/// What a batch does when one asset fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and keep downloading the other assets
    #[default]
    Isolate,
    /// Cancel the whole batch on the first failure
    Abort,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "isolate" => Ok(Self::Isolate),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown failure policy: {other}")),
        }
    }
}

/// One asset to fetch: `{remote_base}{asset_name}` into
/// `{root}/{category}/{asset_name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub category: String,
    pub remote_base: String,
    pub asset_name: String,
}

impl DownloadTask {
    /// Build a task, rejecting names that would escape the category directory
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::InvalidAssetName` for empty names, absolute
    /// paths, and names with `..` or other non-normal components.
    pub fn new(
        category: impl Into<String>,
        remote_base: impl Into<String>,
        asset_name: impl Into<String>,
    ) -> Result<Self, Error> {
        let asset_name = asset_name.into();
        validate_asset_name(&asset_name)?;

        Ok(Self {
            category: category.into(),
            remote_base: remote_base.into(),
            asset_name,
        })
    }

    /// Remote URL of the asset
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.remote_base, self.asset_name)
    }

    /// Local destination below `root`
    #[must_use]
    pub fn destination(&self, root: &Path) -> PathBuf {
        root.join(&self.category).join(&self.asset_name)
    }
}

fn validate_asset_name(name: &str) -> Result<(), Error> {
    let invalid = |reason: &str| DownloadError::InvalidAssetName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("empty name").into());
    }

    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => return Err(invalid("contains '.' component").into()),
            Component::ParentDir => return Err(invalid("contains '..' component").into()),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("absolute path").into())
            }
        }
    }

    Ok(())
}
