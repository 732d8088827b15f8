//! LVM LocalPV volumes

use super::{
    controller_version, ensure_plugin, find_plugin_volume, join_rows, pv_name, CommonDescription,
    PluginVolume, VolumeRow,
};
use crate::crd::LVMVolume;
use crate::domain::ports::{CasType, ClusterReader};
use crate::error::Result;
use crate::output::render_template;
use k8s_openapi::api::core::v1::PersistentVolume;
use serde::Serialize;
use std::io::Write;

const LVM_VOLUME_TEMPLATE: &str = r#"
{{ name }} Details :
------------------
Name            : {{ name }}
Namespace       : {{ namespace }}
AccessMode      : {{ access_mode }}
CSIDriver       : {{ csi_driver }}
Capacity        : {{ capacity }}
PVC             : {{ pvc }}
VolumePhase     : {{ volume_phase }}
StorageClass    : {{ storage_class }}
Version         : {{ version }}
Status          : {{ status }}
VolumeGroup     : {{ volume_group }}
Shared          : {{ shared }}
ThinProvisioned : {{ thin_provision }}
NodeID          : {{ node_id }}
"#;

impl PluginVolume for LVMVolume {
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
        &self.spec.owner_node_id
    }
}

#[derive(Serialize)]
struct LvmDescription {
    #[serde(flatten)]
    common: CommonDescription,
    volume_group: String,
    shared: String,
    thin_provision: String,
    node_id: String,
}

/// Rows for every LVM-provisioned PV in `pvs`
pub async fn list(
    cluster: &dyn ClusterReader,
    pvs: &[PersistentVolume],
    namespace: &str,
) -> Result<Vec<VolumeRow>> {
    let volumes = cluster.list_lvm_volumes().await?;
    let version = controller_version(cluster, CasType::Lvm).await;
    Ok(join_rows(CasType::Lvm, pvs, volumes, namespace, |_| version.clone()))
}

/// Describe a single LVM-provisioned PV
pub async fn describe<W>(
    cluster: &dyn ClusterReader,
    pv: &PersistentVolume,
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    ensure_plugin(CasType::Lvm, pv)?;
    let found = cluster.get_lvm_volume(pv_name(pv)).await?;
    let vol = find_plugin_volume(CasType::Lvm, pv, found)?;
    let version = controller_version(cluster, CasType::Lvm).await;

    let description = LvmDescription {
        common: CommonDescription::new(pv, &vol, version),
        volume_group: vol.spec.vol_group.clone(),
        shared: vol.spec.shared.clone().unwrap_or_else(|| "no".to_string()),
        thin_provision: vol.spec.thin_provision.clone().unwrap_or_else(|| "no".to_string()),
        node_id: vol.spec.owner_node_id.clone(),
    };
    render_template(out, "lvm-volume", LVM_VOLUME_TEMPLATE, &description)
}
