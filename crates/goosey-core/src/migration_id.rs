//! Strongly-typed migration identifier.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Stable identifier of a migration; the ledger's primary key.
    ///
    /// Usually a content-derived hash written by `goosey make`, or the
    /// migration's directory name when no explicit id is configured.
    pub struct MigrationId;
}
