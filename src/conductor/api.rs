//! Elemental Conductor request and response documents.
//!
//! Requests serialize to the XML the `/api/jobs` endpoint accepts; responses
//! deserialize from the job, node list and cloud config documents.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeStruct};

/// Node product that runs transcodes (as opposed to the Conductor itself).
pub const PRODUCT_SERVER: &str = "Elemental Server";

/// Node status that counts toward capacity. Compared case-sensitively.
pub const NODE_STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename = "job")]
pub struct Job {
    pub input: Input,
    pub priority: u32,
    pub output_group: OutputGroup,
    pub stream_assembly: Vec<StreamAssembly>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Input {
    pub file_input: Location,
}

/// A source or destination address plus the credentials to reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub uri: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamAssembly {
    pub name: String,
    pub preset: String,
}

/// Output container identifier.
///
/// Any extension the caller supplies is accepted as-is; the backend decides
/// whether it supports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Container(Cow<'static, str>);

impl Container {
    pub const APPLE_HTTP_LIVE_STREAMING: Container = Container(Cow::Borrowed("m3u8"));
    pub const MPEG4: Container = Container(Cow::Borrowed("mp4"));

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub stream_assembly_name: String,
    pub name_modifier: String,
    pub order: usize,
    pub container: Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputGroupType {
    /// Adaptive streaming (HLS) group: one manifest over every output.
    AppleLive,
    /// Discrete files.
    File,
}

impl OutputGroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppleLive => "apple_live_group_settings",
            Self::File => "file_group_settings",
        }
    }
}

impl Serialize for OutputGroupType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputGroup {
    pub order: u32,
    pub kind: OutputGroupType,
    pub destination: Location,
    pub outputs: Vec<Output>,
}

#[derive(Serialize)]
struct GroupSettings<'a> {
    destination: &'a Location,
}

// The backend expects the destination nested under a settings element whose
// name matches the group type.
impl Serialize for OutputGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("output_group", 4)?;
        state.serialize_field("order", &self.order)?;
        state.serialize_field(
            self.kind.as_str(),
            &GroupSettings {
                destination: &self.destination,
            },
        )?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("output", &self.outputs)?;
        state.end()
    }
}

impl Job {
    pub fn to_xml(&self) -> Result<String, quick_xml::DeError> {
        quick_xml::se::to_string_with_root("job", self)
    }
}

/// Job document returned by submit and query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobResponse {
    #[serde(rename = "@href", default)]
    pub href: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub pct_complete: u32,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub submitted: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub complete_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub errored_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub error_messages: ErrorMessages,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorMessages {
    #[serde(rename = "error", default)]
    pub errors: Vec<JobError>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl JobResponse {
    /// The job id is the last path segment of `href` (`/jobs/42` -> `42`).
    pub fn id(&self) -> Option<&str> {
        self.href
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
    }

    pub fn from_xml(xml: &str) -> Result<Self, quick_xml::DeError> {
        quick_xml::de::from_str(xml)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeList {
    #[serde(rename = "node", default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub status: String,
}

impl Node {
    pub fn new(product: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            product: product.into(),
            status: status.into(),
        }
    }

    pub fn is_active_server(&self) -> bool {
        self.product == PRODUCT_SERVER && self.status == NODE_STATUS_ACTIVE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloudConfig {
    #[serde(default)]
    pub authorize_scaling: bool,
    #[serde(default)]
    pub max_nodes: usize,
    #[serde(default)]
    pub min_nodes: usize,
}

/// Treat absent and empty timestamp elements as "never happened".
fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// An empty progress element reads as 0.
fn lenient_percent<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value.parse().map_err(serde::de::Error::custom),
    }
}
