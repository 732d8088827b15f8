//! Domain Ports - Core trait definitions for volscope
//!
//! Every call volscope makes against the control plane goes through
//! [`ClusterReader`], so the listing and describing logic can run against
//! a real API server or an in-memory cluster.

use crate::crd::{JivaVolume, LVMVolume, ZFSVolume};
use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

// =============================================================================
// Volume Plugins
// =============================================================================

/// CSI driver of the ZFS LocalPV plugin
pub const ZFS_CSI_DRIVER: &str = "zfs.csi.openebs.io";
/// CSI driver of the LVM LocalPV plugin
pub const LVM_CSI_DRIVER: &str = "local.csi.openebs.io";
/// CSI driver of the Jiva plugin
pub const JIVA_CSI_DRIVER: &str = "jiva.csi.openebs.io";

/// Label carrying the component version on controller workloads
pub const VERSION_LABEL: &str = "openebs.io/version";
/// Label selecting controller workloads by component
pub const COMPONENT_LABEL: &str = "openebs.io/component-name";

/// Placeholder shown when a version cannot be determined
pub const VERSION_UNKNOWN: &str = "N/A";

/// Volume plugins (container attached storage engines) volscope understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasType {
    Jiva,
    Lvm,
    Zfs,
}

impl CasType {
    /// All plugins in listing order
    pub const ALL: [CasType; 3] = [CasType::Jiva, CasType::Lvm, CasType::Zfs];

    /// CSI driver name that provisions this plugin's volumes
    pub fn csi_driver(self) -> &'static str {
        match self {
            CasType::Jiva => JIVA_CSI_DRIVER,
            CasType::Lvm => LVM_CSI_DRIVER,
            CasType::Zfs => ZFS_CSI_DRIVER,
        }
    }

    /// Kind of the plugin's volume custom resource
    pub fn volume_kind(self) -> &'static str {
        match self {
            CasType::Jiva => "JivaVolume",
            CasType::Lvm => "LVMVolume",
            CasType::Zfs => "ZFSVolume",
        }
    }

    /// Component name of the CSI controller workload, if the plugin has one
    /// that carries the version label
    pub fn controller_component(self) -> Option<&'static str> {
        match self {
            CasType::Jiva => None,
            CasType::Lvm => Some("openebs-lvm-controller"),
            CasType::Zfs => Some("openebs-zfs-controller"),
        }
    }

    /// Find the plugin that owns a CSI driver
    pub fn from_csi_driver(driver: &str) -> Option<CasType> {
        Self::ALL.into_iter().find(|cas| cas.csi_driver() == driver)
    }

    /// Find the plugin that provisioned a PersistentVolume
    pub fn of_volume(pv: &PersistentVolume) -> Option<CasType> {
        csi_driver_of(pv).and_then(Self::from_csi_driver)
    }
}

impl std::fmt::Display for CasType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CasType::Jiva => write!(f, "jiva"),
            CasType::Lvm => write!(f, "lvm"),
            CasType::Zfs => write!(f, "zfs"),
        }
    }
}

impl std::str::FromStr for CasType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jiva" => Ok(CasType::Jiva),
            "lvm" | "lvmlocalpv" | "lvm-localpv" => Ok(CasType::Lvm),
            "zfs" | "zfslocalpv" | "zfs-localpv" => Ok(CasType::Zfs),
            other => Err(Error::Configuration(format!(
                "unknown cas-type {other}, expected one of jiva, lvm, zfs"
            ))),
        }
    }
}

/// CSI driver name of a PersistentVolume, `None` for non-CSI volumes
pub fn csi_driver_of(pv: &PersistentVolume) -> Option<&str> {
    pv.spec
        .as_ref()
        .and_then(|spec| spec.csi.as_ref())
        .map(|csi| csi.driver.as_str())
}

// =============================================================================
// Cluster Port
// =============================================================================

/// Port for every read volscope performs against the control plane
#[async_trait]
pub trait ClusterReader: Send + Sync {
    /// List all PersistentVolumes
    async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>>;

    /// Get a PersistentVolume by name
    async fn get_persistent_volume(&self, name: &str) -> Result<Option<PersistentVolume>>;

    /// List ZFSVolumes across all namespaces
    async fn list_zfs_volumes(&self) -> Result<Vec<ZFSVolume>>;

    /// List LVMVolumes across all namespaces
    async fn list_lvm_volumes(&self) -> Result<Vec<LVMVolume>>;

    /// List JivaVolumes across all namespaces
    async fn list_jiva_volumes(&self) -> Result<Vec<JivaVolume>>;

    /// Get the ZFSVolume with exactly this name, in any namespace
    async fn get_zfs_volume(&self, name: &str) -> Result<Option<ZFSVolume>>;

    /// Get the LVMVolume with exactly this name, in any namespace
    async fn get_lvm_volume(&self, name: &str) -> Result<Option<LVMVolume>>;

    /// Get the JivaVolume with exactly this name, in any namespace
    async fn get_jiva_volume(&self, name: &str) -> Result<Option<JivaVolume>>;

    /// Labels of the controller workload for a component, `None` if no
    /// such workload runs in the cluster
    async fn controller_labels(
        &self,
        component: &str,
    ) -> Result<Option<BTreeMap<String, String>>>;

    /// List batch Jobs in a namespace matching a label selector
    async fn list_jobs(&self, namespace: &str, selector: &str) -> Result<Vec<Job>>;

    /// List Pods in a namespace matching a label selector
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>>;

    /// Fetch the current log body of a pod
    async fn pod_logs(&self, namespace: &str, pod: &str) -> Result<String>;

    /// Follow a pod's log, writing each line to `out` until the stream closes
    async fn stream_pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        out: &mut (dyn Write + Send),
    ) -> Result<()>;
}
