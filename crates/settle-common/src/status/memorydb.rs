//! MemoryDB status values

use super::status_signal;

status_signal! {
    /// Status of a MemoryDB access control list
    AclStatus {
        Active => "active",
        Creating => "creating",
        Deleting => "deleting",
        Modifying => "modifying",
    }
}

status_signal! {
    /// Status of a MemoryDB cluster
    ClusterStatus {
        Available => "available",
        Creating => "creating",
        Deleting => "deleting",
        Updating => "updating",
    }
}

status_signal! {
    /// Status of the parameter group attached to a cluster
    ClusterParameterGroupStatus {
        Applying => "applying",
        InSync => "in-sync",
    }
}

status_signal! {
    /// Status of one security group membership, or the aggregate over all of them
    ClusterSecurityGroupStatus {
        Active => "active",
        Modifying => "modifying",
    }
}

status_signal! {
    /// Status of a cluster shard
    ClusterShardStatus {
        Available => "available",
    }
}

status_signal! {
    /// Status of the SNS topic notifications are published to
    SnsTopicStatus {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
}

status_signal! {
    /// Status of a MemoryDB snapshot
    SnapshotStatus {
        Creating => "creating",
        Available => "available",
        Deleting => "deleting",
    }
}

status_signal! {
    /// Status of a MemoryDB user
    UserStatus {
        Active => "active",
        Deleting => "deleting",
        Modifying => "modifying",
    }
}
