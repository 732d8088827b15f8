//! Upgrade inspection
//!
//! Upgrades of Jiva volumes run as batch jobs in the OpenEBS namespace.

pub mod status;

pub use status::*;

/// Namespace OpenEBS components are installed in by default
pub const DEFAULT_OPENEBS_NAMESPACE: &str = "openebs";

/// Label selector of the Jiva upgrade jobs
pub const UPGRADE_JOB_SELECTOR: &str = "cas-type=jiva,name=jiva-upgrade";
