//! Kubernetes Cluster Adapter
//!
//! Implements [`ClusterReader`] on top of `kube::Api`.

use crate::crd::{JivaVolume, LVMVolume, ZFSVolume};
use crate::domain::ports::{ClusterReader, COMPONENT_LABEL};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::{AsyncBufReadExt, TryStreamExt};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use kube::api::{ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

// =============================================================================
// Configuration
// =============================================================================

/// How to reach the API server
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    /// Explicit kubeconfig file; falls back to in-cluster or `~/.kube/config`
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
}

impl ClusterConfig {
    async fn to_kube_config(&self) -> Result<Config> {
        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        };

        match &self.kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    Error::Configuration(format!(
                        "failed to read kubeconfig {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| Error::Configuration(format!("invalid kubeconfig: {}", e)))
            }
            None if self.context.is_some() => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| Error::Configuration(format!("invalid kubeconfig: {}", e))),
            None => Config::infer()
                .await
                .map_err(|e| Error::Configuration(format!("no cluster configuration: {}", e))),
        }
    }
}

// =============================================================================
// Kube Cluster
// =============================================================================

/// ClusterReader backed by a live API server
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    /// Build a client from the given configuration
    pub async fn connect(config: &ClusterConfig) -> Result<Self> {
        let kube_config = config.to_kube_config().await?;
        info!("Connecting to cluster at {}", kube_config.cluster_url);
        let client = Client::try_from(kube_config)?;
        Ok(Self { client })
    }

    async fn list_all<K>(&self, resource: &str, params: &ListParams) -> Result<Vec<K>>
    where
        K: kube::Resource + Clone + serde::de::DeserializeOwned + std::fmt::Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let list = api
            .list(params)
            .await
            .map_err(|e| Error::list_failed(resource, e))?;
        debug!("Listed {} {}", list.items.len(), resource);
        Ok(list.items)
    }

    /// Namespace of a plugin volume is unknown up front, so select it by
    /// name across all namespaces
    async fn get_named<K>(&self, resource: &str, name: &str) -> Result<Option<K>>
    where
        K: kube::Resource + Clone + serde::de::DeserializeOwned + std::fmt::Debug,
        K::DynamicType: Default,
    {
        let params = ListParams::default().fields(&format!("metadata.name={}", name));
        let items: Vec<K> = self.list_all(resource, &params).await?;
        Ok(items.into_iter().next())
    }
}

#[async_trait]
impl ClusterReader for KubeCluster {
    async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| Error::list_failed("PersistentVolumes", e))?;
        Ok(list.items)
    }

    async fn get_persistent_volume(&self, name: &str) -> Result<Option<PersistentVolume>> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await?)
    }

    async fn list_zfs_volumes(&self) -> Result<Vec<ZFSVolume>> {
        self.list_all("ZFSVolumes", &ListParams::default()).await
    }

    async fn list_lvm_volumes(&self) -> Result<Vec<LVMVolume>> {
        self.list_all("LVMVolumes", &ListParams::default()).await
    }

    async fn list_jiva_volumes(&self) -> Result<Vec<JivaVolume>> {
        self.list_all("JivaVolumes", &ListParams::default()).await
    }

    async fn get_zfs_volume(&self, name: &str) -> Result<Option<ZFSVolume>> {
        self.get_named("ZFSVolumes", name).await
    }

    async fn get_lvm_volume(&self, name: &str) -> Result<Option<LVMVolume>> {
        self.get_named("LVMVolumes", name).await
    }

    async fn get_jiva_volume(&self, name: &str) -> Result<Option<JivaVolume>> {
        self.get_named("JivaVolumes", name).await
    }

    async fn controller_labels(
        &self,
        component: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        let params = ListParams::default().labels(&format!("{}={}", COMPONENT_LABEL, component));

        // Older releases ship the CSI controller as a StatefulSet, newer ones as a Deployment
        let statefulsets: Api<StatefulSet> = Api::all(self.client.clone());
        if let Some(sts) = statefulsets.list(&params).await?.items.into_iter().next() {
            return Ok(Some(sts.metadata.labels.unwrap_or_default()));
        }

        let deployments: Api<Deployment> = Api::all(self.client.clone());
        Ok(deployments
            .list(&params)
            .await?
            .items
            .into_iter()
            .next()
            .map(|deploy| deploy.metadata.labels.unwrap_or_default()))
    }

    async fn list_jobs(&self, namespace: &str, selector: &str) -> Result<Vec<Job>> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default().labels(selector)).await?;
        Ok(list.items)
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default().labels(selector)).await?;
        Ok(list.items)
    }

    async fn pod_logs(&self, namespace: &str, pod: &str) -> Result<String> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.logs(pod, &LogParams::default()).await?)
    }

    async fn stream_pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        out: &mut (dyn Write + Send),
    ) -> Result<()> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            follow: true,
            ..Default::default()
        };

        info!("Following logs of pod {}/{}", namespace, pod);
        let mut lines = Box::pin(api.log_stream(pod, &params).await?.lines());
        while let Some(line) = lines.try_next().await? {
            writeln!(out, "{}", line)?;
            out.flush()?;
        }
        debug!("Log stream of pod {}/{} closed", namespace, pod);
        Ok(())
    }
}
