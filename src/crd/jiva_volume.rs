//! JivaVolume CRD
//!
//! Read-only view of the replicated block volume resource owned by the
//! Jiva operator (`openebs.io/v1alpha1`). Unlike the local engines, each
//! JivaVolume records its own version in a top-level `versionDetails`
//! field, so the resource is declared by hand rather than derived.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::NamespaceResourceScope;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// =============================================================================
// JivaVolume
// =============================================================================

/// JivaVolume describes an iSCSI target with its synchronously replicated backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JivaVolume {
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: JivaVolumeSpec,

    #[serde(default)]
    pub status: Option<JivaVolumeStatus>,

    /// Version reconciliation details
    #[serde(default)]
    pub version_details: VersionDetails,
}

impl kube::Resource for JivaVolume {
    type DynamicType = ();
    type Scope = NamespaceResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        "JivaVolume".into()
    }

    fn group(_: &()) -> Cow<'_, str> {
        "openebs.io".into()
    }

    fn version(_: &()) -> Cow<'_, str> {
        "v1alpha1".into()
    }

    fn plural(_: &()) -> Cow<'_, str> {
        "jivavolumes".into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JivaVolumeSpec {
    /// Name of the PersistentVolume backed by this volume
    #[serde(default)]
    pub pv: String,

    #[serde(default)]
    pub capacity: String,

    #[serde(default)]
    pub access_type: String,

    #[serde(default)]
    pub iscsi_spec: IscsiSpec,

    #[serde(default)]
    pub desired_replication_factor: i32,
}

/// iSCSI target the volume is exported through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IscsiSpec {
    /// Cluster IP of the controller service
    #[serde(rename = "targetIP", default)]
    pub target_ip: String,

    #[serde(default)]
    pub target_port: i32,

    #[serde(default)]
    pub iqn: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDetails {
    #[serde(default)]
    pub auto_upgrade: bool,

    #[serde(default)]
    pub desired: String,

    #[serde(default)]
    pub status: VersionStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStatus {
    /// Version the volume components are running
    #[serde(default)]
    pub current: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub reason: String,
}

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JivaVolumeStatus {
    /// `RW`, `RO`, `Degraded`, `Offline` ...
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub replica_count: i32,

    #[serde(default)]
    pub replica_status: Vec<ReplicaStatus>,

    #[serde(default)]
    pub phase: String,
}

/// Mode of a single replica as seen by the controller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaStatus {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub mode: String,
}

impl JivaVolume {
    pub fn new(name: &str, spec: JivaVolumeSpec) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec,
            ..Default::default()
        }
    }

    pub fn status_text(&self) -> &str {
        self.status.as_ref().map(|s| s.status.as_str()).unwrap_or_default()
    }

    /// Running version, `None` until the operator has reported it
    pub fn current_version(&self) -> Option<&str> {
        let current = self.version_details.status.current.as_str();
        (!current.is_empty()).then_some(current)
    }
}
