//! Volume listing and description
//!
//! Joins generic PersistentVolumes with the volume resource of the plugin
//! that provisioned them:
//! - listing walks the PVs in order, keeps those whose CSI driver belongs
//!   to the plugin and whose plugin volume sits in the requested namespace,
//!   and skips (with a warning) PVs whose plugin volume is missing, as
//!   well as plugin volumes no PV refers to
//! - describing resolves one PV and fails if its plugin volume is missing

pub mod jiva;
pub mod lvm;
pub mod zfs;

use crate::domain::ports::{csi_driver_of, CasType, ClusterReader, VERSION_LABEL, VERSION_UNKNOWN};
use crate::error::{Error, Result};
use crate::output::{self, convert_to_ibytes, OutputFormat};
use k8s_openapi::api::core::v1::PersistentVolume;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use tracing::{debug, warn};

// =============================================================================
// Rows
// =============================================================================

/// Column headers of the volume table
pub const VOLUME_HEADERS: [&str; 9] = [
    "NAMESPACE",
    "NAME",
    "STATUS",
    "VERSION",
    "CAPACITY",
    "STORAGE CLASS",
    "ATTACHED",
    "ACCESS MODE",
    "ATTACHED NODE",
];

/// One line of `get volumes` output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRow {
    pub namespace: String,
    pub name: String,
    pub status: String,
    pub version: String,
    pub capacity: String,
    pub storage_class: String,
    pub attached: String,
    pub access_mode: String,
    pub attached_node: String,
}

impl VolumeRow {
    /// Cells in [`VOLUME_HEADERS`] order
    pub fn cells(&self) -> [&str; 9] {
        [
            &self.namespace,
            &self.name,
            &self.status,
            &self.version,
            &self.capacity,
            &self.storage_class,
            &self.attached,
            &self.access_mode,
            &self.attached_node,
        ]
    }
}

// =============================================================================
// Plugin Volumes
// =============================================================================

/// Accessors shared by every plugin's volume resource
pub trait PluginVolume {
    fn volume_name(&self) -> &str;
    fn volume_namespace(&self) -> &str;
    fn volume_status(&self) -> &str;
    fn attached_node(&self) -> &str;
}

/// Join `pvs` with the plugin volumes of `cas`, preserving PV order
pub fn join_rows<V, F>(
    cas: CasType,
    pvs: &[PersistentVolume],
    volumes: Vec<V>,
    namespace: &str,
    version_of: F,
) -> Vec<VolumeRow>
where
    V: PluginVolume,
    F: Fn(&V) -> String,
{
    let by_name: BTreeMap<String, V> = volumes
        .into_iter()
        .map(|vol| (vol.volume_name().to_string(), vol))
        .collect();

    let mut matched = BTreeSet::new();
    let mut rows = Vec::new();
    for pv in pvs {
        if csi_driver_of(pv) != Some(cas.csi_driver()) {
            continue;
        }

        let name = pv_name(pv);
        let Some(vol) = by_name.get(name) else {
            warn!("couldn't find {} {}", cas.volume_kind(), name);
            continue;
        };
        matched.insert(name);

        if !in_namespace(vol, namespace) {
            continue;
        }

        rows.push(VolumeRow {
            namespace: vol.volume_namespace().to_string(),
            name: name.to_string(),
            status: vol.volume_status().to_string(),
            version: version_of(vol),
            capacity: convert_to_ibytes(&pv_capacity(pv)),
            storage_class: pv_storage_class(pv).to_string(),
            attached: pv_phase(pv).to_string(),
            access_mode: pv_first_access_mode(pv).to_string(),
            attached_node: vol.attached_node().to_string(),
        });
    }

    for (name, vol) in &by_name {
        if !matched.contains(name.as_str()) && in_namespace(vol, namespace) {
            warn!(
                "couldn't find PersistentVolume for {} {}/{}",
                cas.volume_kind(),
                vol.volume_namespace(),
                name
            );
        }
    }
    rows
}

fn in_namespace(vol: &impl PluginVolume, namespace: &str) -> bool {
    namespace.is_empty() || namespace == vol.volume_namespace()
}

/// Version label of a plugin's controller workload, `N/A` when there is none
pub async fn controller_version(cluster: &dyn ClusterReader, cas: CasType) -> String {
    let Some(component) = cas.controller_component() else {
        return VERSION_UNKNOWN.to_string();
    };

    match cluster.controller_labels(component).await {
        Ok(Some(labels)) => labels
            .get(VERSION_LABEL)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| VERSION_UNKNOWN.to_string()),
        Ok(None) => VERSION_UNKNOWN.to_string(),
        Err(e) => {
            debug!("Could not look up {} controller: {}", component, e);
            VERSION_UNKNOWN.to_string()
        }
    }
}

// =============================================================================
// Describe
// =============================================================================

/// Fields every describe template starts with
#[derive(Debug, Clone, Serialize)]
pub struct CommonDescription {
    pub name: String,
    pub namespace: String,
    pub access_mode: String,
    pub csi_driver: String,
    pub capacity: String,
    pub pvc: String,
    pub volume_phase: String,
    pub storage_class: String,
    pub version: String,
    pub status: String,
}

impl CommonDescription {
    pub fn new(pv: &PersistentVolume, vol: &impl PluginVolume, version: String) -> Self {
        Self {
            name: pv_name(pv).to_string(),
            namespace: vol.volume_namespace().to_string(),
            access_mode: pv_access_modes(pv),
            csi_driver: csi_driver_of(pv).unwrap_or_default().to_string(),
            capacity: pv_capacity(pv),
            pvc: pv_claim_name(pv).to_string(),
            volume_phase: pv_phase(pv).to_string(),
            storage_class: pv_storage_class(pv).to_string(),
            version,
            status: vol.volume_status().to_string(),
        }
    }
}

/// Require the plugin volume looked up under `pv`'s name
pub fn find_plugin_volume<V: PluginVolume>(
    cas: CasType,
    pv: &PersistentVolume,
    found: Option<V>,
) -> Result<V> {
    found.ok_or_else(|| Error::ResourceNotFound {
        kind: cas.volume_kind().to_string(),
        name: pv_name(pv).to_string(),
    })
}

/// Fail unless `pv` was provisioned by `cas`
pub fn ensure_plugin(cas: CasType, pv: &PersistentVolume) -> Result<()> {
    if CasType::of_volume(pv) == Some(cas) {
        return Ok(());
    }
    Err(Error::UnsupportedVolume {
        name: pv_name(pv).to_string(),
        driver: csi_driver_of(pv).unwrap_or("none").to_string(),
    })
}

// =============================================================================
// Commands
// =============================================================================

/// Rows of one plugin for the given PersistentVolumes
pub async fn list_volumes(
    cluster: &dyn ClusterReader,
    cas: CasType,
    pvs: &[PersistentVolume],
    namespace: &str,
) -> Result<Vec<VolumeRow>> {
    match cas {
        CasType::Jiva => jiva::list(cluster, pvs, namespace).await,
        CasType::Lvm => lvm::list(cluster, pvs, namespace).await,
        CasType::Zfs => zfs::list(cluster, pvs, namespace).await,
    }
}

/// Rows of one or all plugins, plugin by plugin
pub async fn get_volumes(
    cluster: &dyn ClusterReader,
    cas: Option<CasType>,
    namespace: &str,
) -> Result<Vec<VolumeRow>> {
    let pvs = cluster.list_persistent_volumes().await?;

    // Without an explicit plugin, skip the ones with no volumes; their CRDs
    // may not even be installed
    let plugins: Vec<CasType> = match cas {
        Some(cas) => vec![cas],
        None => CasType::ALL
            .into_iter()
            .filter(|cas| cas_has_volumes(*cas, &pvs))
            .collect(),
    };

    let mut rows = Vec::new();
    for cas in plugins {
        rows.extend(list_volumes(cluster, cas, &pvs, namespace).await?);
    }
    Ok(rows)
}

fn cas_has_volumes(cas: CasType, pvs: &[PersistentVolume]) -> bool {
    pvs.iter().any(|pv| CasType::of_volume(pv) == Some(cas))
}

/// Print rows in the requested format, or the empty-listing message to stderr
pub fn print_volumes<W: Write + ?Sized>(
    out: &mut W,
    rows: &[VolumeRow],
    format: OutputFormat,
    namespace: &str,
    cas: Option<CasType>,
) -> Result<()> {
    if format != OutputFormat::Table {
        return output::print_serialized(out, format, rows);
    }

    if rows.is_empty() {
        let cas = cas.map(|c| c.to_string()).unwrap_or_default();
        eprintln!("{}", output::empty_table_message("volumes", namespace, &cas));
        return Ok(());
    }

    output::print_table(out, &VOLUME_HEADERS, rows.iter().map(VolumeRow::cells))
}

/// Describe one PersistentVolume with its plugin's template
pub async fn describe_volume<W>(
    cluster: &dyn ClusterReader,
    pv: &PersistentVolume,
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    let cas = CasType::of_volume(pv).ok_or_else(|| Error::UnsupportedVolume {
        name: pv_name(pv).to_string(),
        driver: csi_driver_of(pv).unwrap_or("none").to_string(),
    })?;

    match cas {
        CasType::Jiva => jiva::describe(cluster, pv, out).await,
        CasType::Lvm => lvm::describe(cluster, pv, out).await,
        CasType::Zfs => zfs::describe(cluster, pv, out).await,
    }
}

/// Describe each named PersistentVolume, stopping at the first failure
pub async fn describe_volumes<W>(
    cluster: &dyn ClusterReader,
    names: &[String],
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    for name in names {
        let pv = cluster
            .get_persistent_volume(name)
            .await?
            .ok_or_else(|| Error::ResourceNotFound {
                kind: "PersistentVolume".into(),
                name: name.clone(),
            })?;
        describe_volume(cluster, &pv, out).await?;
    }
    Ok(())
}

// =============================================================================
// PersistentVolume Accessors
// =============================================================================

pub fn pv_name(pv: &PersistentVolume) -> &str {
    pv.metadata.name.as_deref().unwrap_or_default()
}

/// Raw `storage` capacity quantity
pub fn pv_capacity(pv: &PersistentVolume) -> String {
    pv.spec
        .as_ref()
        .and_then(|spec| spec.capacity.as_ref())
        .and_then(|capacity| capacity.get("storage"))
        .map(|q| q.0.clone())
        .unwrap_or_default()
}

pub fn pv_storage_class(pv: &PersistentVolume) -> &str {
    pv.spec
        .as_ref()
        .and_then(|spec| spec.storage_class_name.as_deref())
        .unwrap_or_default()
}

pub fn pv_phase(pv: &PersistentVolume) -> &str {
    pv.status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
        .unwrap_or_default()
}

pub fn pv_claim_name(pv: &PersistentVolume) -> &str {
    pv.spec
        .as_ref()
        .and_then(|spec| spec.claim_ref.as_ref())
        .and_then(|claim| claim.name.as_deref())
        .unwrap_or_default()
}

/// First access mode, the one shown in tables
pub fn pv_first_access_mode(pv: &PersistentVolume) -> &str {
    pv.spec
        .as_ref()
        .and_then(|spec| spec.access_modes.as_ref())
        .and_then(|modes| modes.first())
        .map(String::as_str)
        .unwrap_or_default()
}

/// All access modes, comma separated
pub fn pv_access_modes(pv: &PersistentVolume) -> String {
    pv.spec
        .as_ref()
        .and_then(|spec| spec.access_modes.as_ref())
        .map(|modes| modes.join(", "))
        .unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{jiva_volume, lvm_volume, pv, zfs_volume};
    use super::*;
    use crate::domain::memory::InMemoryCluster;
    use crate::domain::ports::{JIVA_CSI_DRIVER, LVM_CSI_DRIVER, ZFS_CSI_DRIVER};
    use assert_matches::assert_matches;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` with a subscriber that records its log lines
    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (result, logs)
    }

    fn mixed_cluster() -> InMemoryCluster {
        InMemoryCluster::new()
            .with_pv(pv("pvc-z", ZFS_CSI_DRIVER, "1Gi"))
            .with_pv(pv("pvc-j", JIVA_CSI_DRIVER, "5Gi"))
            .with_pv(pv("pvc-l", LVM_CSI_DRIVER, "2Gi"))
            .with_pv(pv("pvc-nfs", "nfs.csi.k8s.io", "1Gi"))
            .with_zfs_volume(zfs_volume("pvc-z", "openebs", "node1"))
            .with_jiva_volume(jiva_volume("pvc-j", "openebs"))
            .with_lvm_volume(lvm_volume("pvc-l", "lvm", "node3"))
    }

    #[test]
    fn test_join_excludes_other_drivers() {
        let pvs = vec![
            pv("pvc-1", ZFS_CSI_DRIVER, "4Gi"),
            pv("pvc-2", "ebs.csi.aws.com", "4Gi"),
        ];
        let volumes = vec![
            zfs_volume("pvc-1", "openebs", "node1"),
            zfs_volume("pvc-2", "openebs", "node1"),
        ];

        let rows = join_rows(CasType::Zfs, &pvs, volumes, "", |_| "2.3.0".to_string());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "pvc-1");
    }

    #[test]
    fn test_join_ignores_plugin_volume_without_pv() {
        let pvs = vec![pv("pvc-1", ZFS_CSI_DRIVER, "4Gi")];
        let volumes = vec![
            zfs_volume("pvc-1", "openebs", "node1"),
            zfs_volume("orphan", "openebs", "node1"),
        ];

        let rows = join_rows(CasType::Zfs, &pvs, volumes, "", |_| String::new());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_join_warns_about_unmatched_objects_both_ways() {
        let pvs = vec![
            pv("pvc-1", ZFS_CSI_DRIVER, "4Gi"),
            pv("pvc-nocr", ZFS_CSI_DRIVER, "4Gi"),
        ];
        let volumes = vec![
            zfs_volume("pvc-1", "openebs", "node1"),
            zfs_volume("orphan-cr", "openebs", "node1"),
            zfs_volume("elsewhere-cr", "zfs-system", "node1"),
        ];

        let (rows, logs) = capture_logs(|| {
            join_rows(CasType::Zfs, &pvs, volumes, "openebs", |_| String::new())
        });

        assert_eq!(rows.len(), 1);
        assert!(logs.contains("couldn't find ZFSVolume pvc-nocr"));
        assert!(logs.contains("couldn't find PersistentVolume for ZFSVolume openebs/orphan-cr"));
        assert!(!logs.contains("pvc-1"));
        assert!(!logs.contains("elsewhere-cr"));
    }

    #[tokio::test]
    async fn test_controller_version_fallbacks() {
        let labelled = InMemoryCluster::new()
            .with_controller("openebs-zfs-controller", &[(VERSION_LABEL, "2.3.0")]);
        assert_eq!(controller_version(&labelled, CasType::Zfs).await, "2.3.0");
        assert_eq!(controller_version(&labelled, CasType::Lvm).await, "N/A");
        assert_eq!(controller_version(&labelled, CasType::Jiva).await, "N/A");

        let unlabelled =
            InMemoryCluster::new().with_controller("openebs-zfs-controller", &[("app", "zfs")]);
        assert_eq!(controller_version(&unlabelled, CasType::Zfs).await, "N/A");

        let failing = labelled.failing("controller_labels");
        assert_eq!(controller_version(&failing, CasType::Zfs).await, "N/A");
    }

    #[test]
    fn test_join_preserves_pv_order() {
        let pvs = vec![
            pv("pvc-b", ZFS_CSI_DRIVER, "1Gi"),
            pv("pvc-a", ZFS_CSI_DRIVER, "1Gi"),
        ];
        let volumes = vec![
            zfs_volume("pvc-a", "openebs", "n"),
            zfs_volume("pvc-b", "openebs", "n"),
        ];

        let rows = join_rows(CasType::Zfs, &pvs, volumes, "", |_| String::new());
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["pvc-b", "pvc-a"]);
    }

    #[tokio::test]
    async fn test_get_volumes_all_plugins() {
        let cluster = mixed_cluster();

        let rows = get_volumes(&cluster, None, "").await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["pvc-j", "pvc-l", "pvc-z"]);
    }

    #[tokio::test]
    async fn test_get_volumes_by_plugin_and_namespace() {
        let cluster = mixed_cluster();

        let rows = get_volumes(&cluster, Some(CasType::Lvm), "").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attached_node, "node3");

        let rows = get_volumes(&cluster, None, "openebs").await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_get_volumes_skips_plugins_without_pvs() {
        // ZFS CRD missing entirely is fine as long as no ZFS PV exists
        let cluster = InMemoryCluster::new()
            .with_pv(pv("pvc-l", LVM_CSI_DRIVER, "2Gi"))
            .with_lvm_volume(lvm_volume("pvc-l", "lvm", "node3"))
            .failing("list_zfs_volumes");

        assert_eq!(get_volumes(&cluster, None, "").await.unwrap().len(), 1);
        assert!(get_volumes(&cluster, Some(CasType::Zfs), "").await.is_err());
    }

    #[tokio::test]
    async fn test_get_volumes_pv_list_failure() {
        let cluster = mixed_cluster().failing("list_persistent_volumes");
        assert!(get_volumes(&cluster, None, "").await.is_err());
    }

    #[tokio::test]
    async fn test_describe_volumes_dispatches_by_driver() {
        let cluster = mixed_cluster();
        let names = vec!["pvc-z".to_string(), "pvc-l".to_string()];

        let mut out = Vec::new();
        describe_volumes(&cluster, &names, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("pvc-z Details :"));
        assert!(text.contains("PoolName      : zfspv-pool"));
        assert!(text.contains("pvc-l Details :"));
        assert!(text.contains("VolumeGroup     : lvmvg"));
    }

    #[tokio::test]
    async fn test_describe_unknown_pv() {
        let cluster = mixed_cluster();

        let mut out = Vec::new();
        let err = describe_volumes(&cluster, &["missing".to_string()], &mut out)
            .await
            .unwrap_err();
        assert_matches!(
            err,
            Error::ResourceNotFound { ref kind, .. } if kind == "PersistentVolume"
        );

        let err = describe_volumes(&cluster, &["pvc-nfs".to_string()], &mut out)
            .await
            .unwrap_err();
        assert_matches!(
            err,
            Error::UnsupportedVolume { ref driver, .. } if driver == "nfs.csi.k8s.io"
        );
    }

    #[test]
    fn test_print_volumes_table() {
        let row = VolumeRow {
            namespace: "openebs".into(),
            name: "pvc-1".into(),
            status: "Ready".into(),
            version: "2.3.0".into(),
            capacity: "4.0GiB".into(),
            storage_class: "zfs-sc".into(),
            attached: "Bound".into(),
            access_mode: "ReadWriteOnce".into(),
            attached_node: "node1".into(),
        };

        let mut out = Vec::new();
        print_volumes(&mut out, &[row], OutputFormat::Table, "", None).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("NAMESPACE   NAME    STATUS"));
        assert!(lines.next().unwrap().starts_with("openebs     pvc-1   Ready"));
    }

    #[test]
    fn test_pv_accessors_tolerate_empty_spec() {
        let pv = PersistentVolume::default();
        assert_eq!(pv_name(&pv), "");
        assert_eq!(pv_capacity(&pv), "");
        assert_eq!(pv_first_access_mode(&pv), "");
        assert_eq!(pv_claim_name(&pv), "");
    }

    #[test]
    fn test_access_modes_joined() {
        let mut pv = pv("pvc-1", ZFS_CSI_DRIVER, "1Gi");
        pv.spec.as_mut().unwrap().access_modes =
            Some(vec!["ReadWriteOnce".into(), "ReadOnlyMany".into()]);
        assert_eq!(pv_access_modes(&pv), "ReadWriteOnce, ReadOnlyMany");
        assert_eq!(pv_first_access_mode(&pv), "ReadWriteOnce");
    }
}
