//! ZFSVolume CRD
//!
//! Read-only view of the volume resource owned by the ZFS LocalPV CSI
//! driver. Field names follow the upstream `zfs.openebs.io/v1` schema.

use super::VolumeError;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// =============================================================================
// ZFSVolume CRD
// =============================================================================

/// ZFSVolume describes a dataset or zvol carved out of a node-local zpool.
#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "zfs.openebs.io",
    version = "v1",
    kind = "ZFSVolume",
    plural = "zfsvolumes",
    shortname = "zfsvol",
    status = "ZFSVolumeStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ZFSVolumeSpec {
    /// Node where the zpool holding this volume lives
    #[serde(rename = "ownerNodeID", default)]
    pub owner_node_id: String,

    /// Name of the zpool
    #[serde(default)]
    pub pool_name: String,

    /// Size of the volume in bytes
    #[serde(default)]
    pub capacity: String,

    /// Record size for DATASET volumes
    #[serde(default)]
    pub recordsize: Option<String>,

    /// Block size for ZVOL volumes
    #[serde(default)]
    pub volblocksize: Option<String>,

    /// Compression algorithm, `on`/`off` or a named algorithm
    #[serde(default)]
    pub compression: Option<String>,

    /// Deduplication, `on` or `off`
    #[serde(default)]
    pub dedup: Option<String>,

    #[serde(default)]
    pub encryption: Option<String>,

    /// `yes` when the volume is thin provisioned
    #[serde(default)]
    pub thin_provision: Option<String>,

    /// `DATASET` or `ZVOL`
    #[serde(default)]
    pub volume_type: String,

    /// Filesystem created on the volume
    #[serde(default)]
    pub fs_type: Option<String>,

    /// Set when the volume was cloned from a snapshot
    #[serde(default)]
    pub snapname: Option<String>,

    /// `yes` when the volume can be mounted by several pods
    #[serde(default)]
    pub shared: Option<String>,
}

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZFSVolumeStatus {
    /// `Pending`, `Ready` or `Failed`
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub error: Option<VolumeError>,
}

impl ZFSVolume {
    /// Current state, empty when the driver has not reported one yet
    pub fn state(&self) -> &str {
        self.status.as_ref().map(|s| s.state.as_str()).unwrap_or_default()
    }
}
