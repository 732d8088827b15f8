//! In-memory ClusterReader used by unit tests
//!
//! Holds plain API objects and answers list/get calls from them. Individual
//! calls can be told to fail to exercise error paths.

use super::ports::ClusterReader;
use crate::crd::{JivaVolume, LVMVolume, ZFSVolume};
use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

#[derive(Default)]
pub struct InMemoryCluster {
    pvs: Vec<PersistentVolume>,
    zfs_volumes: Vec<ZFSVolume>,
    lvm_volumes: Vec<LVMVolume>,
    jiva_volumes: Vec<JivaVolume>,
    controllers: BTreeMap<String, BTreeMap<String, String>>,
    jobs: Vec<Job>,
    pods: Vec<Pod>,
    logs: BTreeMap<String, String>,
    failing: BTreeSet<&'static str>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pv(mut self, pv: PersistentVolume) -> Self {
        self.pvs.push(pv);
        self
    }

    pub fn with_zfs_volume(mut self, vol: ZFSVolume) -> Self {
        self.zfs_volumes.push(vol);
        self
    }

    pub fn with_lvm_volume(mut self, vol: LVMVolume) -> Self {
        self.lvm_volumes.push(vol);
        self
    }

    pub fn with_jiva_volume(mut self, vol: JivaVolume) -> Self {
        self.jiva_volumes.push(vol);
        self
    }

    /// Register a controller workload carrying `labels`
    pub fn with_controller(mut self, component: &str, labels: &[(&str, &str)]) -> Self {
        let labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.controllers.insert(component.to_string(), labels);
        self
    }

    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Register a pod and the log body it returns
    pub fn with_pod(mut self, pod: Pod, logs: &str) -> Self {
        if let Some(name) = &pod.metadata.name {
            self.logs.insert(name.clone(), logs.to_string());
        }
        self.pods.push(pod);
        self
    }

    /// Make the named port call fail, e.g. `"list_zfs_volumes"`
    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    fn check(&self, call: &'static str) -> Result<()> {
        if self.failing.contains(call) {
            return Err(Error::Configuration(format!("{call} failed")));
        }
        Ok(())
    }
}

/// Equality-based label selector match, `a=b,c=d`
fn selector_matches(meta: &ObjectMeta, namespace: &str, selector: &str) -> bool {
    if meta.namespace.as_deref() != Some(namespace) {
        return false;
    }
    let labels = meta.labels.clone().unwrap_or_default();
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
            None => labels.contains_key(term),
        })
}

fn find_named<K: Resource + Clone>(objects: &[K], name: &str) -> Option<K> {
    objects
        .iter()
        .find(|obj| obj.meta().name.as_deref() == Some(name))
        .cloned()
}

#[async_trait]
impl ClusterReader for InMemoryCluster {
    async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>> {
        self.check("list_persistent_volumes")?;
        Ok(self.pvs.clone())
    }

    async fn get_persistent_volume(&self, name: &str) -> Result<Option<PersistentVolume>> {
        self.check("get_persistent_volume")?;
        Ok(self
            .pvs
            .iter()
            .find(|pv| pv.metadata.name.as_deref() == Some(name))
            .cloned())
    }

    async fn list_zfs_volumes(&self) -> Result<Vec<ZFSVolume>> {
        self.check("list_zfs_volumes")?;
        Ok(self.zfs_volumes.clone())
    }

    async fn list_lvm_volumes(&self) -> Result<Vec<LVMVolume>> {
        self.check("list_lvm_volumes")?;
        Ok(self.lvm_volumes.clone())
    }

    async fn list_jiva_volumes(&self) -> Result<Vec<JivaVolume>> {
        self.check("list_jiva_volumes")?;
        Ok(self.jiva_volumes.clone())
    }

    async fn get_zfs_volume(&self, name: &str) -> Result<Option<ZFSVolume>> {
        self.check("get_zfs_volume")?;
        Ok(find_named(&self.zfs_volumes, name))
    }

    async fn get_lvm_volume(&self, name: &str) -> Result<Option<LVMVolume>> {
        self.check("get_lvm_volume")?;
        Ok(find_named(&self.lvm_volumes, name))
    }

    async fn get_jiva_volume(&self, name: &str) -> Result<Option<JivaVolume>> {
        self.check("get_jiva_volume")?;
        Ok(find_named(&self.jiva_volumes, name))
    }

    async fn controller_labels(
        &self,
        component: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        self.check("controller_labels")?;
        Ok(self.controllers.get(component).cloned())
    }

    async fn list_jobs(&self, namespace: &str, selector: &str) -> Result<Vec<Job>> {
        self.check("list_jobs")?;
        Ok(self
            .jobs
            .iter()
            .filter(|job| selector_matches(&job.metadata, namespace, selector))
            .cloned()
            .collect())
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>> {
        self.check("list_pods")?;
        Ok(self
            .pods
            .iter()
            .filter(|pod| selector_matches(&pod.metadata, namespace, selector))
            .cloned()
            .collect())
    }

    async fn pod_logs(&self, _namespace: &str, pod: &str) -> Result<String> {
        self.check("pod_logs")?;
        Ok(self.logs.get(pod).cloned().unwrap_or_default())
    }

    async fn stream_pod_logs(
        &self,
        _namespace: &str,
        pod: &str,
        out: &mut (dyn Write + Send),
    ) -> Result<()> {
        self.check("stream_pod_logs")?;
        for line in self.logs.get(pod).map(String::as_str).unwrap_or_default().lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
