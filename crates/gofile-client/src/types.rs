//! Wire types for the Gofile API

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Generic `{status, data}` wrapper present on every API response
#[derive(Clone, Debug, Deserialize)]
pub struct Envelope<T> {
    /// "ok" on success, an opaque error string otherwise
    pub status: String,
    /// Payload, absent on most errors
    pub data: Option<T>,
}

/// Status value marking a successful envelope
pub const STATUS_OK: &str = "ok";

/// Result of `getServer`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerResult {
    /// Upload server name (e.g. "store3")
    pub server: String,
}

/// Account quota: either a numeric ceiling or no limit at all.
///
/// The service sends `false` for tiers without a limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Limit {
    /// No limit applies
    #[default]
    Unlimited,
    /// Numeric ceiling
    Max(u64),
}

impl Limit {
    /// The numeric ceiling, if any
    pub fn max(&self) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Max(n) => Some(*n),
        }
    }

    /// Check whether `used` stays within this limit
    pub fn allows(&self, used: u64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Max(n) => used <= *n,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Max(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unlimited => serializer.serialize_bool(false),
            Self::Max(n) => serializer.serialize_u64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LimitVisitor)
    }
}

struct LimitVisitor;

impl<'de> Visitor<'de> for LimitVisitor {
    type Value = Limit;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a numeric limit or false")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Limit, E> {
        Ok(Limit::Max(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Limit, E> {
        Ok(u64::try_from(v).map(Limit::Max).unwrap_or(Limit::Unlimited))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Limit, E> {
        if v.is_finite() && v >= 0.0 {
            Ok(Limit::Max(v as u64))
        } else {
            Ok(Limit::Unlimited)
        }
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Limit, E> {
        Ok(Limit::Unlimited)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Limit, E> {
        v.parse()
            .map(Limit::Max)
            .map_err(|_| E::invalid_type(de::Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Limit, E> {
        Ok(Limit::Unlimited)
    }

    fn visit_none<E: de::Error>(self) -> Result<Limit, E> {
        Ok(Limit::Unlimited)
    }
}

/// Result of `getAccountDetails`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountDetails {
    pub token: String,
    pub email: String,
    /// Account tier (e.g. "standard", "premium")
    pub tier: String,
    /// ID of the account's root folder
    pub root_folder: String,
    pub files_count: u64,
    pub files_count_limit: Limit,
    /// Total stored size in bytes
    pub total_size: u64,
    pub total_size_limit: Limit,
    /// Direct-download traffic over the last 30 days, in bytes
    #[serde(rename = "total30DDLTraffic")]
    pub total_30ddl_traffic: u64,
    #[serde(rename = "total30DDLTrafficLimit")]
    pub total_30ddl_traffic_limit: Limit,
}

/// Result of `createFolder`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderCreated {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub parent_folder: String,
    pub create_time: i64,
    pub childs: Vec<String>,
    pub code: String,
}

/// Result of `uploadFile`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileUpload {
    /// Public page where the file can be downloaded
    pub download_page: String,
    pub code: String,
    /// Folder the file landed in (created on the fly for guest uploads)
    pub parent_folder: String,
    pub file_id: String,
    pub file_name: String,
    pub md5: String,
}

/// Result of `getContent`: a folder and its direct children
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentResult {
    pub is_owner: bool,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub parent_folder: String,
    pub code: String,
    pub create_time: i64,
    pub public: bool,
    /// IDs of direct children, in service order
    pub childs: Vec<String>,
    pub total_download_count: u64,
    pub total_size: u64,
    /// Child metadata keyed by content ID
    pub contents: HashMap<String, ContentInfo>,
}

impl ContentResult {
    /// Children in the order listed by `childs`, skipping unknown IDs
    pub fn children(&self) -> impl Iterator<Item = &ContentInfo> {
        self.childs.iter().filter_map(|id| self.contents.get(id))
    }
}

/// Metadata of one content entry (file or folder)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentInfo {
    pub id: String,
    /// "file" or "folder"
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub parent_folder: String,
    pub create_time: i64,
    pub size: u64,
    pub download_count: u64,
    pub md5: String,
    pub mimetype: String,
    pub server_choosen: String,
    pub direct_link: String,
    pub link: String,
}

impl ContentInfo {
    /// Check if this entry is a folder
    pub fn is_folder(&self) -> bool {
        self.kind == "folder"
    }
}

/// An option settable on a folder with `setFolderOption`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FolderOption {
    /// Whether the folder is publicly listed
    Public(bool),
    Password(String),
    Description(String),
    /// Expiration date as a unix timestamp
    Expire(i64),
    Tags(Vec<String>),
}

impl FolderOption {
    /// Wire name of the option
    pub fn name(&self) -> &'static str {
        match self {
            Self::Public(_) => "public",
            Self::Password(_) => "password",
            Self::Description(_) => "description",
            Self::Expire(_) => "expire",
            Self::Tags(_) => "tags",
        }
    }

    /// Wire value of the option
    pub fn value(&self) -> String {
        match self {
            Self::Public(public) => public.to_string(),
            Self::Password(v) | Self::Description(v) => v.clone(),
            Self::Expire(ts) => ts.to_string(),
            Self::Tags(tags) => tags.join(","),
        }
    }

    /// Build an option from its wire name and a string value
    pub fn parse(option: &str, value: &str) -> crate::Result<Self> {
        let invalid = |msg: String| crate::ClientError::InvalidArgument(msg);
        match option {
            "public" => value
                .parse()
                .map(Self::Public)
                .map_err(|_| invalid(format!("public must be true or false, got {:?}", value))),
            "password" => Ok(Self::Password(value.to_string())),
            "description" => Ok(Self::Description(value.to_string())),
            "expire" => value
                .parse()
                .map(Self::Expire)
                .map_err(|_| invalid(format!("expire must be a unix timestamp, got {:?}", value))),
            "tags" => Ok(Self::Tags(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            other => Err(invalid(format!("unknown folder option: {}", other))),
        }
    }
}
