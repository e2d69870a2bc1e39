//! Migration discovery
//!
//! Each migration is a directory named `<YYYYMMDDHHMMSS>_<slug>` holding an
//! `up.sql`, an optional `down.sql` and an optional `migration.yml` with
//! metadata. Directories that do not start with a timestamp are ignored.

use crate::checksum::script_checksum;
use crate::direction::Direction;
use crate::error::{CoreError, CoreResult};
use crate::migration::Migration;
use crate::migration_id::MigrationId;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name of the optional per-migration metadata.
pub const METADATA_FILE: &str = "migration.yml";

/// Format of the timestamp prefix on migration directory names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Contents of `migration.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationMetadata {
    /// Explicit identifier; defaults to the directory name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MigrationId>,

    /// Free-text attribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// When the migration was merged; defaults to the directory timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Discover all migrations under `dir`, sorted oldest first.
///
/// A missing directory yields no migrations.
pub fn discover_migrations(dir: &Path) -> CoreResult<Vec<Migration>> {
    if !dir.exists() {
        log::debug!("Migrations directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source,
    })?;

    let mut migrations = Vec::new();
    let mut seen: HashMap<MigrationId, PathBuf> = HashMap::new();

    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(created_at) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_created_at)
        else {
            log::debug!("Skipping non-migration directory {}", path.display());
            continue;
        };

        let migration = load_migration(&path, created_at)?;
        if let Some(previous) = seen.insert(migration.id.clone(), path.clone()) {
            return Err(CoreError::DuplicateMigration {
                id: migration.id.to_string(),
                path1: previous.display().to_string(),
                path2: path.display().to_string(),
            });
        }
        migrations.push(migration);
    }

    migrations.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
    Ok(migrations)
}

/// Parse the creation time from a `<YYYYMMDDHHMMSS>_<slug>` directory name.
pub fn parse_created_at(dir_name: &str) -> Option<DateTime<Utc>> {
    let (stamp, slug) = dir_name.split_once('_')?;
    if stamp.len() != 14 || slug.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn load_migration(dir: &Path, created_at: DateTime<Utc>) -> CoreResult<Migration> {
    let up_path = dir.join(Direction::Up.script_file_name());
    if !up_path.is_file() {
        return Err(CoreError::InvalidMigrationDirectory {
            path: dir.display().to_string(),
            reason: format!("missing {}", Direction::Up.script_file_name()),
        });
    }
    let up_sql = std::fs::read_to_string(&up_path).map_err(|source| CoreError::IoWithPath {
        path: up_path.display().to_string(),
        source,
    })?;

    let down_path = Some(dir.join(Direction::Down.script_file_name())).filter(|p| p.is_file());
    let metadata = load_metadata(dir)?;

    let id = match metadata.id {
        Some(id) => id,
        None => dir
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(MigrationId::try_new)
            .ok_or_else(|| CoreError::InvalidMigrationDirectory {
                path: dir.display().to_string(),
                reason: "directory name is not valid UTF-8".to_string(),
            })?,
    };

    Ok(Migration {
        id,
        batch: None,
        marker: false,
        dir: Some(dir.to_path_buf()),
        up_path: Some(up_path),
        down_path,
        merged_at: metadata.merged_at.unwrap_or(created_at),
        created_at,
        author: metadata.author,
        checksum: Some(script_checksum(&up_sql)),
        recorded_checksum: None,
    })
}

fn load_metadata(dir: &Path) -> CoreResult<MigrationMetadata> {
    let path = dir.join(METADATA_FILE);
    if !path.is_file() {
        return Ok(MigrationMetadata::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| CoreError::IoWithPath {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|e| CoreError::MetadataParseError {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
