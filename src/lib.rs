//! volscope - read-only inspection of OpenEBS volume plugins
//!
//! Lists and describes volumes provisioned by the ZFS LocalPV, LVM LocalPV
//! and Jiva plugins by joining the cluster's PersistentVolumes with each
//! plugin's volume custom resources, and shows the logs of upgrade jobs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         volscope CLI                         │
//! ├───────────────────┬───────────────────┬──────────────────────┤
//! │   get volumes     │  describe volume  │   upgrade status     │
//! ├───────────────────┴─────────┬─────────┴──────────────────────┤
//! │   volume (join + filter)    │   upgrade (jobs + pod logs)    │
//! │   jiva │ lvm │ zfs          │                                │
//! ├─────────────────────────────┴────────────────────────────────┤
//! │                 ClusterReader (domain port)                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │                KubeCluster (kube::Api adapter)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cluster`]: Kubernetes adapter and connection settings
//! - [`crd`]: Plugin volume custom resources
//! - [`domain`]: Plugin identification and the cluster port
//! - [`output`]: Tables, templates and capacity formatting
//! - [`upgrade`]: Upgrade job status
//! - [`volume`]: Volume listing and description
//! - [`error`]: Error types and handling

pub mod cluster;
pub mod crd;
pub mod domain;
pub mod error;
pub mod output;
pub mod upgrade;
pub mod volume;

// Re-export commonly used types
pub use cluster::{ClusterConfig, KubeCluster};

pub use crd::{JivaVolume, LVMVolume, ZFSVolume};

pub use domain::ports::{CasType, ClusterReader};

pub use error::{Error, Result};

pub use output::OutputFormat;

pub use volume::{describe_volumes, get_volumes, print_volumes, VolumeRow};

pub use upgrade::job_status;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
