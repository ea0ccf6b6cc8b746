//! Resource types settle reconciles
//!
//! The display name is what users see in error context
//! ("error waiting for MemoryDB Snapshot (x) to be created"), the key is
//! what configuration files use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Types of AWS resources managed by settle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// MemoryDB access control list
    MemorydbAcl,
    /// MemoryDB cluster
    MemorydbCluster,
    /// MemoryDB snapshot
    MemorydbSnapshot,
    /// MemoryDB user
    MemorydbUser,
    /// Global Accelerator accelerator
    GlobalacceleratorAccelerator,
    /// Global Accelerator endpoint group
    GlobalacceleratorEndpointGroup,
    /// X-Ray encryption configuration (one per region)
    XrayEncryptionConfig,
}

impl ResourceKind {
    /// All resource kinds, in declaration order
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::MemorydbAcl,
        ResourceKind::MemorydbCluster,
        ResourceKind::MemorydbSnapshot,
        ResourceKind::MemorydbUser,
        ResourceKind::GlobalacceleratorAccelerator,
        ResourceKind::GlobalacceleratorEndpointGroup,
        ResourceKind::XrayEncryptionConfig,
    ];

    /// Human readable name used in logs and error messages
    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::MemorydbAcl => "MemoryDB ACL",
            ResourceKind::MemorydbCluster => "MemoryDB Cluster",
            ResourceKind::MemorydbSnapshot => "MemoryDB Snapshot",
            ResourceKind::MemorydbUser => "MemoryDB User",
            ResourceKind::GlobalacceleratorAccelerator => "Global Accelerator Accelerator",
            ResourceKind::GlobalacceleratorEndpointGroup => "Global Accelerator Endpoint Group",
            ResourceKind::XrayEncryptionConfig => "XRay Encryption Config",
        }
    }

    /// Stable key used in configuration files
    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::MemorydbAcl => "memorydb-acl",
            ResourceKind::MemorydbCluster => "memorydb-cluster",
            ResourceKind::MemorydbSnapshot => "memorydb-snapshot",
            ResourceKind::MemorydbUser => "memorydb-user",
            ResourceKind::GlobalacceleratorAccelerator => "globalaccelerator-accelerator",
            ResourceKind::GlobalacceleratorEndpointGroup => "globalaccelerator-endpoint-group",
            ResourceKind::XrayEncryptionConfig => "xray-encryption-config",
        }
    }

    /// Label a specific resource instance, e.g. `MemoryDB Snapshot (nightly)`
    pub fn describe(self, id: &str) -> String {
        format!("{} ({})", self.display_name(), id)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches_serde_name() {
        for kind in ResourceKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.key()));
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            ResourceKind::MemorydbSnapshot.describe("nightly"),
            "MemoryDB Snapshot (nightly)"
        );
    }
}
