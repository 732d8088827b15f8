//! Upgrade job status
//!
//! Prints the logs of every pod run by the upgrade jobs, or follows the
//! live log of the first one.

use super::UPGRADE_JOB_SELECTOR;
use crate::domain::ports::ClusterReader;
use crate::error::{Error, Result};
use k8s_openapi::api::batch::v1::Job;
use std::io::Write;
use tracing::{debug, warn};

const SEPARATOR: &str = "***************************************";

/// Show the state of the upgrade jobs in `namespace`
///
/// With `wait`, follows the first pod of the first job until its log
/// stream closes instead of dumping every job.
pub async fn job_status(
    cluster: &dyn ClusterReader,
    namespace: &str,
    wait: bool,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let jobs = cluster
        .list_jobs(namespace, UPGRADE_JOB_SELECTOR)
        .await
        .map_err(|e| Error::list_failed("upgrade Jobs", e))?;
    debug!("Found {} upgrade jobs in {}", jobs.len(), namespace);

    if jobs.is_empty() {
        writeln!(out, "No upgrade-jobs Found in {} namespace", namespace)?;
        return Ok(());
    }

    if wait {
        return follow_first_pod(cluster, namespace, &jobs[0], out).await;
    }

    for job in &jobs {
        let name = job_name(job);
        writeln!(out, "{}", SEPARATOR)?;
        writeln!(out, "Job Name:  {}", name)?;
        print_pod_logs(cluster, namespace, name, out).await?;
        writeln!(out)?;
    }
    writeln!(out, "{}", SEPARATOR)?;
    Ok(())
}

/// Print the logs of every pod created by a job
async fn print_pod_logs(
    cluster: &dyn ClusterReader,
    namespace: &str,
    job: &str,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let pods = match cluster.list_pods(namespace, &job_selector(job)).await {
        Ok(pods) => pods,
        Err(e) => {
            writeln!(out, "error getting pods of job {}: {}", job, e)?;
            return Ok(());
        }
    };

    if pods.is_empty() {
        writeln!(out, "No pods are running for this job")?;
        return Ok(());
    }

    for pod in &pods {
        let pod_name = pod.metadata.name.as_deref().unwrap_or_default();
        writeln!(out, "From Pod: {}", pod_name)?;

        let logs = cluster
            .pod_logs(namespace, pod_name)
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to fetch logs of pod {}: {}", pod_name, e);
                String::new()
            });

        if logs.is_empty() {
            writeln!(out, "-> No recent logs from the pod")?;
        } else {
            writeln!(out, "{}", logs.trim_end())?;
        }
    }
    Ok(())
}

async fn follow_first_pod(
    cluster: &dyn ClusterReader,
    namespace: &str,
    job: &Job,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let name = job_name(job);
    let pods = cluster
        .list_pods(namespace, &job_selector(name))
        .await
        .map_err(|e| Error::list_failed(format!("pods of job {}", name), e))?;

    let Some(pod) = pods.first() else {
        writeln!(out, "No pods are running for the job: {}", name)?;
        return Ok(());
    };

    let pod_name = pod.metadata.name.as_deref().unwrap_or_default();
    cluster.stream_pod_logs(namespace, pod_name, out).await
}

fn job_name(job: &Job) -> &str {
    job.metadata.name.as_deref().unwrap_or_default()
}

/// Selector of the pods a job created
fn job_selector(job: &str) -> String {
    format!("job-name={}", job)
}
