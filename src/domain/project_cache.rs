//! Project Path Cache (C2).
//!
//! A lazily populated, process-wide bidirectional map between hierarchical
//! project paths (`a_b_c`) and integer ids, backed by an arena instead of
//! parent-pointers (spec section 9 design notes: this avoids ownership
//! cycles and bounds path walks to the cache size). Owned by the
//! `Repository` (C6); mutated only inside a repository transaction.

use std::collections::HashMap;

use rusqlite::{params, Connection, Transaction};

use super::model::PATH_SEPARATOR;
use crate::error::CoreError;

#[derive(Debug, Clone)]
struct ProjectNode {
    name: String,
    parent_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct ProjectPathCache {
    by_id: HashMap<i64, ProjectNode>,
    by_path: HashMap<String, i64>,
    loaded: bool,
}

impl ProjectPathCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_loaded(&mut self, conn: &Connection) -> Result<(), CoreError> {
        if self.loaded {
            return Ok(());
        }
        let mut stmt = conn.prepare("SELECT id, name, parent_id FROM projects")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })?;
        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(row?);
        }
        for (id, name, parent_id) in &nodes {
            self.by_id.insert(*id, ProjectNode { name: name.clone(), parent_id: *parent_id });
        }
        // Build path index once every node is known, since children can
        // precede their parents in arbitrary row order.
        let ids: Vec<i64> = self.by_id.keys().copied().collect();
        for id in ids {
            if let Some(path) = self.path_for_internal(id) {
                self.by_path.insert(path, id);
            }
        }
        self.loaded = true;
        Ok(())
    }

    /// Splits `path` by `_`, looking up or inserting each prefix segment,
    /// returning the terminal id. Must run inside the caller's transaction.
    pub fn resolve_or_create(&mut self, tx: &Transaction, path: &str) -> Result<i64, CoreError> {
        self.ensure_loaded(tx)?;

        let mut parent_id: Option<i64> = None;
        let mut prefix = String::new();
        let mut current_id: Option<i64> = None;

        for segment in path.split(PATH_SEPARATOR) {
            if !prefix.is_empty() {
                prefix.push(PATH_SEPARATOR);
            }
            prefix.push_str(segment);

            if let Some(&id) = self.by_path.get(&prefix) {
                current_id = Some(id);
                parent_id = Some(id);
                continue;
            }

            let id = insert_project(tx, segment, parent_id)?;
            self.by_id.insert(id, ProjectNode { name: segment.to_string(), parent_id });
            self.by_path.insert(prefix.clone(), id);
            current_id = Some(id);
            parent_id = Some(id);
        }

        current_id.ok_or_else(|| CoreError::Logic(format!("empty project path: '{path}'")))
    }

    /// Walks the `parent_id` chain from `id` up to a root, returning the
    /// segment sequence in root-to-leaf order. Bounds the walk to the
    /// cache size to guard against accidental cycles.
    #[must_use]
    pub fn path_for(&self, id: i64) -> Option<Vec<String>> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        let max_steps = self.by_id.len() + 1;
        for _ in 0..max_steps {
            let Some(node_id) = current else { break };
            let Some(node) = self.by_id.get(&node_id) else { return None };
            segments.push(node.name.clone());
            current = node.parent_id;
        }
        segments.reverse();
        Some(segments)
    }

    #[must_use]
    pub fn path_string_for(&self, id: i64) -> Option<String> {
        self.path_for(id).map(|segs| segs.join(&PATH_SEPARATOR.to_string()))
    }

    fn path_for_internal(&self, id: i64) -> Option<String> {
        self.path_for(id).map(|segs| segs.join(&PATH_SEPARATOR.to_string()))
    }

    /// Root project names, in insertion order (lowest id first).
    pub fn roots(&mut self, conn: &Connection) -> Result<Vec<(i64, String)>, CoreError> {
        self.ensure_loaded(conn)?;
        let mut roots: Vec<(i64, String)> = self
            .by_id
            .iter()
            .filter(|(_, node)| node.parent_id.is_none())
            .map(|(id, node)| (*id, node.name.clone()))
            .collect();
        roots.sort_by_key(|(id, _)| *id);
        Ok(roots)
    }
}

fn insert_project(tx: &Transaction, name: &str, parent_id: Option<i64>) -> Result<i64, CoreError> {
    tx.execute(
        "INSERT INTO projects (name, parent_id) VALUES (?1, ?2)",
        params![name, parent_id],
    )?;
    Ok(tx.last_insert_rowid())
}
