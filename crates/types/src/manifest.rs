#![allow(clippy::module_name_repetitions)]

//! Category manifest records
//!
//! A manifest is the gzip-compressed JSON index a content server publishes
//! for one category. Keys are PascalCase on the wire. Lists that are missing
//! or `null` decode as empty.

use serde::{Deserialize, Deserializer, Serialize};

/// Download group an asset belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum DownloadKey {
    AssetBundleManifest,
    Initial,
    Expansion,
    Other(i64),
}

impl From<i64> for DownloadKey {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::AssetBundleManifest,
            1 => Self::Initial,
            2 => Self::Expansion,
            other => Self::Other(other),
        }
    }
}

impl From<DownloadKey> for i64 {
    fn from(key: DownloadKey) -> Self {
        match key {
            DownloadKey::AssetBundleManifest => 0,
            DownloadKey::Initial => 1,
            DownloadKey::Expansion => 2,
            DownloadKey::Other(other) => other,
        }
    }
}

/// Kind of content an asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum AssetKind {
    AssetBundle,
    Master,
    Resource,
    Other(i64),
}

impl From<i64> for AssetKind {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::AssetBundle,
            1 => Self::Master,
            2 => Self::Resource,
            other => Self::Other(other),
        }
    }
}

impl From<AssetKind> for i64 {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::AssetBundle => 0,
            AssetKind::Master => 1,
            AssetKind::Resource => 2,
            AssetKind::Other(other) => other,
        }
    }
}

/// One downloadable file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetEntry {
    #[serde(rename = "Key")]
    pub category_key: DownloadKey,
    #[serde(rename = "Type")]
    pub asset_type: AssetKind,
    pub name: String,
    #[serde(rename = "Hash", default)]
    pub content_hash: String,
    #[serde(rename = "Crc", default)]
    pub checksum: u32,
    #[serde(default)]
    pub size: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub asset_paths: Vec<String>,
    #[serde(rename = "DownloadBundle", default, deserialize_with = "null_as_default")]
    pub bundle_dependencies: Vec<String>,
    #[serde(rename = "DevelopParam", default)]
    pub debug_parameter: Option<String>,
}

/// Time-limited resource listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceEntry {
    #[serde(default)]
    pub end_at: i64,
    pub name: String,
}

/// Time-limited master data listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MasterEntry {
    #[serde(default)]
    pub end_at: i64,
    pub id: i32,
}

/// Category manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "AssetInfos", default, deserialize_with = "null_as_default")]
    pub asset_entries: Vec<AssetEntry>,
    #[serde(rename = "ResourceInfos", default, deserialize_with = "null_as_default")]
    pub resource_entries: Vec<ResourceEntry>,
    #[serde(rename = "Unit", default, deserialize_with = "null_as_default")]
    pub unit_masters: Vec<MasterEntry>,
    #[serde(rename = "Picture", default, deserialize_with = "null_as_default")]
    pub picture_masters: Vec<MasterEntry>,
}

impl Manifest {
    /// Total declared size of all asset entries
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.asset_entries
            .iter()
            .map(|entry| u64::try_from(entry.size).unwrap_or(0))
            .sum()
    }

    /// All master entries in declaration order
    pub fn master_entries(&self) -> impl Iterator<Item = &MasterEntry> {
        self.unit_masters.iter().chain(self.picture_masters.iter())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
