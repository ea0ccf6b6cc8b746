//! X-Ray status values

use super::status_signal;

status_signal! {
    /// Status of the account's X-Ray encryption configuration
    EncryptionStatus {
        Active => "ACTIVE",
        Updating => "UPDATING",
    }
}
