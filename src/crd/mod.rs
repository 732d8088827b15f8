//! Custom Resource Definitions of the volume plugins
//!
//! These are read-only mirrors of the resources each CSI driver owns:
//! - ZFSVolume: ZFS LocalPV datasets and zvols
//! - LVMVolume: LVM LocalPV logical volumes
//! - JivaVolume: Jiva replicated block volumes

pub mod jiva_volume;
pub mod lvm_volume;
pub mod zfs_volume;

pub use jiva_volume::*;
pub use lvm_volume::*;
pub use zfs_volume::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Error reported by a node agent while provisioning a local volume
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
