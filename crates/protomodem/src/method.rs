//! Parser method: the shareable, schema-derived configuration of a parser.
//!
//! A [`ParserMethod`] owns one member-name table per message type reachable
//! from the root descriptor, built eagerly at construction time. The tables
//! are immutable afterwards, so a single method can configure any number of
//! parser instances concurrently.

use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};

use crate::schema::{FieldDef, MessageDef};

/// Member-name lookup table for one message type.
///
/// Maps both the JSON name and, when different, the proto name of each
/// field to its descriptor.
#[derive(Debug)]
pub(crate) struct NameTable {
    by_name: BTreeMap<String, Arc<FieldDef>>,
}

impl NameTable {
    fn build(msg: &MessageDef) -> Arc<Self> {
        let mut by_name = BTreeMap::new();
        for field in msg.fields() {
            by_name.insert(String::from(field.json_name_str()), field.clone());
            if field.name() != field.json_name_str() {
                by_name.insert(String::from(field.name()), field.clone());
            }
        }
        Arc::new(Self { by_name })
    }

    /// Looks up a raw member name. Names that are not valid UTF-8 cannot
    /// match any field.
    pub(crate) fn lookup(&self, raw: &[u8]) -> Option<&Arc<FieldDef>> {
        core::str::from_utf8(raw)
            .ok()
            .and_then(|name| self.by_name.get(name))
    }
}

/// Schema-derived parser configuration, shared by all parsers for one root
/// message type.
#[derive(Debug)]
pub struct ParserMethod {
    root: Arc<MessageDef>,
    root_table: Arc<NameTable>,
    tables: BTreeMap<usize, Arc<NameTable>>,
}

impl ParserMethod {
    /// Builds the name tables for `root` and every message type reachable
    /// from it (submessages and map entries, transitively).
    #[must_use]
    pub fn new(root: Arc<MessageDef>) -> Arc<Self> {
        let mut tables = BTreeMap::new();
        let mut pending: Vec<Arc<MessageDef>> = alloc::vec![root.clone()];
        while let Some(msg) = pending.pop() {
            let key = Arc::as_ptr(&msg) as usize;
            if tables.contains_key(&key) {
                continue;
            }
            tables.insert(key, NameTable::build(&msg));
            for field in msg.fields() {
                if let Some(sub) = field.message_subdef() {
                    pending.push(sub.clone());
                }
            }
        }
        let root_table = tables[&(Arc::as_ptr(&root) as usize)].clone();
        Arc::new(Self {
            root,
            root_table,
            tables,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Arc<MessageDef> {
        &self.root
    }

    pub(crate) fn root_table(&self) -> &Arc<NameTable> {
        &self.root_table
    }

    /// The name table for a message type, if it is reachable from the root.
    pub(crate) fn table(&self, msg: &Arc<MessageDef>) -> Option<Arc<NameTable>> {
        self.tables.get(&(Arc::as_ptr(msg) as usize)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn tables_cover_reachable_messages() {
        let leaf = MessageDef::new("test.Leaf", vec![FieldDef::new("x", 1, FieldType::Int32)]);
        let mid = MessageDef::new(
            "test.Mid",
            vec![
                FieldDef::message("leaf", 1, &leaf),
                FieldDef::map("by_name", 2, FieldType::String, FieldType::Int32),
            ],
        );
        let root = MessageDef::new("test.Root", vec![FieldDef::message("mid", 1, &mid)]);
        let method = ParserMethod::new(root.clone());

        assert!(method.table(&root).is_some());
        assert!(method.table(&mid).is_some());
        assert!(method.table(&leaf).is_some());
        let map_field = mid.field_by_number(2).unwrap();
        assert!(method.table(map_field.message_subdef().unwrap()).is_some());
    }

    #[test]
    fn lookup_both_spellings() {
        let root = MessageDef::new(
            "test.Root",
            vec![FieldDef::new("snake_name", 1, FieldType::String)],
        );
        let method = ParserMethod::new(root);
        let table = method.root_table();
        assert!(table.lookup(b"snakeName").is_some());
        assert!(table.lookup(b"snake_name").is_some());
        assert!(table.lookup(b"SnakeName").is_none());
        assert!(table.lookup(&[0xFF, 0xFE]).is_none());
    }

    #[test]
    fn shared_subtree_builds_one_table() {
        let shared = MessageDef::new("test.Shared", vec![FieldDef::new("x", 1, FieldType::Int32)]);
        let root = MessageDef::new(
            "test.Root",
            vec![
                FieldDef::message("a", 1, &shared),
                FieldDef::message("b", 2, &shared),
            ],
        );
        let method = ParserMethod::new(root);
        assert!(method.table(&shared).is_some());
    }
}
