//! Clusters management models.
//!
//! Every field is optional: the service omits what it does not know, and
//! update requests send only what is set.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{Envelope, Resource};

/// Lifecycle state of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterState {
    Error,
    Hibernating,
    Installing,
    Pending,
    PoweringDown,
    Ready,
    Resuming,
    Uninstalling,
    Validating,
    Waiting,
    #[serde(other)]
    Unknown,
}

impl ClusterState {
    pub const ALL: [Self; 11] = [
        Self::Error,
        Self::Hibernating,
        Self::Installing,
        Self::Pending,
        Self::PoweringDown,
        Self::Ready,
        Self::Resuming,
        Self::Uninstalling,
        Self::Validating,
        Self::Waiting,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Hibernating => "hibernating",
            Self::Installing => "installing",
            Self::Pending => "pending",
            Self::PoweringDown => "powering_down",
            Self::Ready => "ready",
            Self::Resuming => "resuming",
            Self::Uninstalling => "uninstalling",
            Self::Validating => "validating",
            Self::Waiting => "waiting",
            Self::Unknown => "unknown",
        }
    }

    /// States a cluster does not leave without user action.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error | Self::Hibernating)
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown cluster state '{s}'"))
    }
}

/// API server endpoint of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `external` or `internal`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listening: Option<String>,
}

/// Node counts per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterNodes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infra: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ClusterState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ClusterApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Envelope<CloudRegion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Envelope<Version>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_az: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<ClusterNodes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<DateTime<Utc>>,
}

impl Resource for Cluster {
    const KIND: &'static str = "Cluster";
}

/// Detailed provisioning status of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ClusterState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_ready: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision_error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision_error_message: Option<String>,
}

impl Resource for ClusterStatus {
    const KIND: &'static str = "ClusterStatus";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudRegion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Resource for CloudRegion {
    const KIND: &'static str = "CloudRegion";
}

/// Installable software version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_group: Option<String>,
}

impl Resource for Version {
    const KIND: &'static str = "Version";
}
