//! LVMVolume CRD
//!
//! Read-only view of the logical volume resource owned by the LVM LocalPV
//! CSI driver (`local.openebs.io/v1alpha1`).

use super::VolumeError;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// LVMVolume describes a logical volume created in a node-local volume group.
#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "local.openebs.io",
    version = "v1alpha1",
    kind = "LVMVolume",
    plural = "lvmvolumes",
    shortname = "lvmvol",
    status = "LVMVolumeStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct LVMVolumeSpec {
    /// Node where the volume group lives
    #[serde(rename = "ownerNodeID", default)]
    pub owner_node_id: String,

    /// Volume group the volume was finally placed in
    #[serde(default)]
    pub vol_group: String,

    /// Regex used to pick a volume group
    #[serde(default)]
    pub vg_pattern: String,

    /// Size of the volume in bytes
    #[serde(default)]
    pub capacity: String,

    /// `yes` when the volume can be mounted by several pods
    #[serde(default)]
    pub shared: Option<String>,

    /// `yes` when the volume is thin provisioned
    #[serde(default)]
    pub thin_provision: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LVMVolumeStatus {
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub error: Option<VolumeError>,
}

impl LVMVolume {
    pub fn state(&self) -> &str {
        self.status.as_ref().map(|s| s.state.as_str()).unwrap_or_default()
    }
}
