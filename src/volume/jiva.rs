//! Jiva replicated block volumes
//!
//! Jiva volumes carry their own version, so no controller lookup is needed.

use super::{
    ensure_plugin, find_plugin_volume, join_rows, pv_name, CommonDescription, PluginVolume,
    VolumeRow,
};
use crate::crd::JivaVolume;
use crate::domain::ports::{CasType, ClusterReader, VERSION_UNKNOWN};
use crate::error::Result;
use crate::output::render_template;
use k8s_openapi::api::core::v1::PersistentVolume;
use serde::Serialize;
use std::io::Write;

/// Label the Jiva CSI node plugin sets to the node the volume is attached to
const NODE_ID_LABEL: &str = "nodeID";

const JIVA_VOLUME_TEMPLATE: &str = r#"
{{ name }} Details :
-----------------
Name              : {{ name }}
Namespace         : {{ namespace }}
AccessMode        : {{ access_mode }}
CSIDriver         : {{ csi_driver }}
Capacity          : {{ capacity }}
PVC               : {{ pvc }}
VolumePhase       : {{ volume_phase }}
StorageClass      : {{ storage_class }}
Version           : {{ version }}
Status            : {{ status }}
Target            : {{ target }}
IQN               : {{ iqn }}
ReplicationFactor : {{ replication_factor }}
ReplicaCount      : {{ replica_count }}
{% if replicas %}
Replica Details :
-----------------
{% for replica in replicas %}{{ replica.address }}   {{ replica.mode }}
{% endfor %}{% endif %}"#;

impl PluginVolume for JivaVolume {
    fn volume_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    fn volume_namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    fn volume_status(&self) -> &str {
        self.status_text()
    }

    fn attached_node(&self) -> &str {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(NODE_ID_LABEL))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

fn version_of(vol: &JivaVolume) -> String {
    vol.current_version().unwrap_or(VERSION_UNKNOWN).to_string()
}

#[derive(Serialize)]
struct ReplicaLine {
    address: String,
    mode: String,
}

#[derive(Serialize)]
struct JivaDescription {
    #[serde(flatten)]
    common: CommonDescription,
    target: String,
    iqn: String,
    replication_factor: i32,
    replica_count: i32,
    replicas: Vec<ReplicaLine>,
}

/// Rows for every Jiva-provisioned PV in `pvs`
pub async fn list(
    cluster: &dyn ClusterReader,
    pvs: &[PersistentVolume],
    namespace: &str,
) -> Result<Vec<VolumeRow>> {
    let volumes = cluster.list_jiva_volumes().await?;
    Ok(join_rows(CasType::Jiva, pvs, volumes, namespace, version_of))
}

/// Describe a single Jiva-provisioned PV
pub async fn describe<W>(
    cluster: &dyn ClusterReader,
    pv: &PersistentVolume,
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    ensure_plugin(CasType::Jiva, pv)?;
    let found = cluster.get_jiva_volume(pv_name(pv)).await?;
    let vol = find_plugin_volume(CasType::Jiva, pv, found)?;

    let status = vol.status.clone().unwrap_or_default();
    let iscsi = &vol.spec.iscsi_spec;
    let target = match (iscsi.target_ip.as_str(), iscsi.target_port) {
        ("", _) => String::new(),
        (ip, 0) => ip.to_string(),
        (ip, port) => format!("{}:{}", ip, port),
    };

    let description = JivaDescription {
        common: CommonDescription::new(pv, &vol, version_of(&vol)),
        target,
        iqn: iscsi.iqn.clone(),
        replication_factor: vol.spec.desired_replication_factor,
        replica_count: status.replica_count,
        replicas: status
            .replica_status
            .into_iter()
            .map(|r| ReplicaLine {
                address: r.address,
                mode: r.mode,
            })
            .collect(),
    };
    render_template(out, "jiva-volume", JIVA_VOLUME_TEMPLATE, &description)
}
