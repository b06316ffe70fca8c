//! The metadata catalog interface the validator resolves names against.
//!
//! Lookups may block on RPC in a real deployment; failures surface as
//! ordinary errors, never panics. [MemCatalog] is the in-memory
//! implementation used by tests and embedding.

use std::collections::HashMap;

use ngqlc_ast::error::{Error, NotFoundKind, Result};
use ngqlc_ast::stmt::maintain::{ColumnTypeDef, PropertyType};
use ngqlc_ast::stmt::user::RoleType;
use ngqlc_ast::types::ValueType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceDesc {
    pub id: i32,
    pub name: String,
    pub partition_num: i32,
    pub replica_factor: i32,
    pub vid_type: ColumnTypeDef,
    pub charset: String,
    pub collate: String,
}

impl SpaceDesc {
    pub fn new(id: i32, name: &str) -> Self {
        SpaceDesc {
            id,
            name: name.to_string(),
            partition_num: 100,
            replica_factor: 1,
            vid_type: ColumnTypeDef::fixed_string(8),
            charset: "utf8".to_string(),
            collate: "utf8_bin".to_string(),
        }
    }

    /// The value type vertex ids must have in this space.
    pub fn vid_value_type(&self) -> ValueType {
        match self.vid_type.ptype {
            PropertyType::Int64 => ValueType::Int,
            _ => ValueType::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub type_def: ColumnTypeDef,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: &str, ptype: PropertyType) -> Self {
        ColumnDef {
            name: name.to_string(),
            type_def: ColumnTypeDef::simple(ptype),
            nullable: true,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self.type_def.ptype {
            PropertyType::Bool => ValueType::Bool,
            PropertyType::Int8
            | PropertyType::Int16
            | PropertyType::Int32
            | PropertyType::Int64
            | PropertyType::Timestamp => ValueType::Int,
            PropertyType::Float | PropertyType::Double => ValueType::Float,
            PropertyType::String | PropertyType::FixedString => ValueType::String,
            PropertyType::Date => ValueType::Date,
            PropertyType::Time => ValueType::Time,
            PropertyType::Datetime => ValueType::DateTime,
            PropertyType::Duration => ValueType::Duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDesc {
    pub columns: Vec<ColumnDef>,
}

impl SchemaDesc {
    pub fn with_columns(columns: Vec<ColumnDef>) -> Self {
        SchemaDesc { columns }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn col_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDesc {
    pub name: String,
    pub schema_name: String,
    pub is_edge: bool,
    pub fields: Vec<String>,
}

/// The validator's window onto the metadata service. All lookups are
/// synchronous; a deployment backs this with a thread-safe cache over RPC.
pub trait Catalog: Send + Sync {
    fn space_by_name(&self, name: &str) -> Result<SpaceDesc>;
    fn tag_schema(&self, space: &str, tag: &str) -> Result<SchemaDesc>;
    fn edge_schema(&self, space: &str, edge: &str) -> Result<SchemaDesc>;
    fn tag_index(&self, space: &str, name: &str) -> Result<IndexDesc>;
    fn edge_index(&self, space: &str, name: &str) -> Result<IndexDesc>;
    /// Indexes defined over the given tag.
    fn tag_indexes(&self, space: &str) -> Vec<IndexDesc>;
    fn edge_indexes(&self, space: &str) -> Vec<IndexDesc>;
    fn role(&self, space: &str, user: &str) -> Option<RoleType>;
    fn is_god(&self, user: &str) -> bool;
    fn list_spaces(&self) -> Vec<String>;
    fn list_tags(&self, space: &str) -> Result<Vec<String>>;
    fn list_edges(&self, space: &str) -> Result<Vec<String>>;
}

/// In-memory catalog; build it up front, then share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemCatalog {
    spaces: HashMap<String, SpaceDesc>,
    tags: HashMap<(String, String), SchemaDesc>,
    edges: HashMap<(String, String), SchemaDesc>,
    tag_indexes: HashMap<(String, String), IndexDesc>,
    edge_indexes: HashMap<(String, String), IndexDesc>,
    roles: HashMap<(String, String), RoleType>,
    gods: Vec<String>,
}

impl MemCatalog {
    pub fn new() -> Self {
        MemCatalog::default()
    }

    pub fn add_space(&mut self, desc: SpaceDesc) -> &mut Self {
        self.spaces.insert(desc.name.clone(), desc);
        self
    }

    pub fn add_tag(&mut self, space: &str, tag: &str, schema: SchemaDesc) -> &mut Self {
        self.tags.insert((space.to_string(), tag.to_string()), schema);
        self
    }

    pub fn add_edge(&mut self, space: &str, edge: &str, schema: SchemaDesc) -> &mut Self {
        self.edges
            .insert((space.to_string(), edge.to_string()), schema);
        self
    }

    pub fn add_tag_index(&mut self, space: &str, index: IndexDesc) -> &mut Self {
        self.tag_indexes
            .insert((space.to_string(), index.name.clone()), index);
        self
    }

    pub fn add_edge_index(&mut self, space: &str, index: IndexDesc) -> &mut Self {
        self.edge_indexes
            .insert((space.to_string(), index.name.clone()), index);
        self
    }

    pub fn grant_role(&mut self, space: &str, user: &str, role: RoleType) -> &mut Self {
        self.roles
            .insert((space.to_string(), user.to_string()), role);
        self
    }

    pub fn add_god(&mut self, user: &str) -> &mut Self {
        self.gods.push(user.to_string());
        self
    }
}

impl Catalog for MemCatalog {
    fn space_by_name(&self, name: &str) -> Result<SpaceDesc> {
        self.spaces
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(NotFoundKind::Space, name))
    }

    fn tag_schema(&self, space: &str, tag: &str) -> Result<SchemaDesc> {
        self.tags
            .get(&(space.to_string(), tag.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(NotFoundKind::Tag, tag))
    }

    fn edge_schema(&self, space: &str, edge: &str) -> Result<SchemaDesc> {
        self.edges
            .get(&(space.to_string(), edge.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(NotFoundKind::Edge, edge))
    }

    fn tag_index(&self, space: &str, name: &str) -> Result<IndexDesc> {
        self.tag_indexes
            .get(&(space.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(NotFoundKind::Index, name))
    }

    fn edge_index(&self, space: &str, name: &str) -> Result<IndexDesc> {
        self.edge_indexes
            .get(&(space.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(NotFoundKind::Index, name))
    }

    fn tag_indexes(&self, space: &str) -> Vec<IndexDesc> {
        self.tag_indexes
            .iter()
            .filter(|((s, _), _)| s == space)
            .map(|(_, idx)| idx.clone())
            .collect()
    }

    fn edge_indexes(&self, space: &str) -> Vec<IndexDesc> {
        self.edge_indexes
            .iter()
            .filter(|((s, _), _)| s == space)
            .map(|(_, idx)| idx.clone())
            .collect()
    }

    fn role(&self, space: &str, user: &str) -> Option<RoleType> {
        self.roles
            .get(&(space.to_string(), user.to_string()))
            .copied()
    }

    fn is_god(&self, user: &str) -> bool {
        self.gods.iter().any(|g| g == user)
    }

    fn list_spaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.spaces.keys().cloned().collect();
        names.sort();
        names
    }

    fn list_tags(&self, space: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .tags
            .keys()
            .filter(|(s, _)| s == space)
            .map(|(_, t)| t.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn list_edges(&self, space: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .edges
            .keys()
            .filter(|(s, _)| s == space)
            .map(|(_, e)| e.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_and_not_found() {
        let mut cat = MemCatalog::new();
        cat.add_space(SpaceDesc::new(1, "nba"));
        cat.add_tag(
            "nba",
            "person",
            SchemaDesc::with_columns(vec![
                ColumnDef::new("name", PropertyType::String),
                ColumnDef::new("age", PropertyType::Int64),
            ]),
        );
        assert_eq!(cat.space_by_name("nba").unwrap().name, "nba");
        let schema = cat.tag_schema("nba", "person").unwrap();
        assert_eq!(schema.column("age").unwrap().value_type(), ValueType::Int);
        let err = cat.tag_schema("nba", "ghost").unwrap_err();
        assert_eq!(err.message, "tag `ghost' not found");
    }

    #[test]
    fn roles_and_god() {
        let mut cat = MemCatalog::new();
        cat.grant_role("nba", "moon", RoleType::User);
        cat.add_god("root");
        assert_eq!(cat.role("nba", "moon"), Some(RoleType::User));
        assert_eq!(cat.role("nba", "sun"), None);
        assert!(cat.is_god("root"));
        assert!(!cat.is_god("moon"));
    }
}
