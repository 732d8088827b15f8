//! ZFS LocalPV volumes

use super::{
    controller_version, ensure_plugin, find_plugin_volume, join_rows, pv_name, CommonDescription,
    PluginVolume, VolumeRow,
};
use crate::crd::ZFSVolume;
use crate::domain::ports::{CasType, ClusterReader};
use crate::error::Result;
use crate::output::render_template;
use k8s_openapi::api::core::v1::PersistentVolume;
use serde::Serialize;
use std::io::Write;

/// Label the ZFS node agent puts on each volume
const NODENAME_LABEL: &str = "kubernetes.io/nodename";

const ZFS_VOLUME_TEMPLATE: &str = r#"
{{ name }} Details :
-----------------
Name          : {{ name }}
Namespace     : {{ namespace }}
AccessMode    : {{ access_mode }}
CSIDriver     : {{ csi_driver }}
Capacity      : {{ capacity }}
PVC           : {{ pvc }}
VolumePhase   : {{ volume_phase }}
StorageClass  : {{ storage_class }}
Version       : {{ version }}
Status        : {{ status }}
VolumeType    : {{ volume_type }}
PoolName      : {{ pool_name }}
FileSystem    : {{ file_system }}
Compression   : {{ compression }}
Deduplication : {{ dedup }}
NodeID        : {{ node_id }}
Recordsize    : {{ recordsize }}
"#;

impl PluginVolume for ZFSVolume {
    fn volume_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    fn volume_namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    fn volume_status(&self) -> &str {
        self.state()
    }

    fn attached_node(&self) -> &str {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(NODENAME_LABEL))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[derive(Serialize)]
struct ZfsDescription {
    #[serde(flatten)]
    common: CommonDescription,
    volume_type: String,
    pool_name: String,
    file_system: String,
    compression: String,
    dedup: String,
    node_id: String,
    recordsize: String,
}

/// Rows for every ZFS-provisioned PV in `pvs`
pub async fn list(
    cluster: &dyn ClusterReader,
    pvs: &[PersistentVolume],
    namespace: &str,
) -> Result<Vec<VolumeRow>> {
    let volumes = cluster.list_zfs_volumes().await?;
    let version = controller_version(cluster, CasType::Zfs).await;
    Ok(join_rows(CasType::Zfs, pvs, volumes, namespace, |_| version.clone()))
}

/// Describe a single ZFS-provisioned PV
pub async fn describe<W>(
    cluster: &dyn ClusterReader,
    pv: &PersistentVolume,
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    ensure_plugin(CasType::Zfs, pv)?;
    let found = cluster.get_zfs_volume(pv_name(pv)).await?;
    let vol = find_plugin_volume(CasType::Zfs, pv, found)?;
    let version = controller_version(cluster, CasType::Zfs).await;

    let spec = &vol.spec;
    let description = ZfsDescription {
        common: CommonDescription::new(pv, &vol, version),
        volume_type: spec.volume_type.clone(),
        pool_name: spec.pool_name.clone(),
        file_system: spec.fs_type.clone().unwrap_or_default(),
        compression: spec.compression.clone().unwrap_or_default(),
        dedup: spec.dedup.clone().unwrap_or_default(),
        node_id: spec.owner_node_id.clone(),
        recordsize: spec.recordsize.clone().unwrap_or_default(),
    };
    render_template(out, "zfs-volume", ZFS_VOLUME_TEMPLATE, &description)
}
