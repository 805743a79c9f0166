//! Relay-style Connection types for list results
//!
//! A list-returning operation is exposed as `{Element}Connection` with
//! `{Element}Edge` edges and a shared `PageInfo`. Connections are cached by
//! element type, so every list of the same element shares one Connection.

use crate::builtin::BuiltinCatalog;
use crate::registry::TypeRegistry;
use indexmap::IndexMap;
use std::collections::HashMap;
use swagger_graphql_common::{
    BuiltinType, CompileError, Result, SchemaArena, SchemaId, SchemaNode, TypeRef,
};
use tracing::debug;

/// Argument names appended to paginated fields, with their scalar types
pub const CURSOR_ARGUMENTS: [(&str, BuiltinType); 4] = [
    ("first", BuiltinType::Int),
    ("after", BuiltinType::String),
    ("last", BuiltinType::Int),
    ("before", BuiltinType::String),
];

#[derive(Debug, Default)]
pub struct ConnectionBuilder {
    connections: HashMap<String, TypeRef>,
    page_info: Option<SchemaId>,
}

impl ConnectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection type for the list held by `container`
    ///
    /// Without `list_property` the container is the list itself. With one, the
    /// list is that property and the container's other properties are carried
    /// onto the Connection as metadata fields.
    pub fn get(
        &mut self,
        schemas: &mut SchemaArena,
        outputs: &mut TypeRegistry,
        builtins: &mut BuiltinCatalog,
        container: SchemaId,
        list_property: Option<&str>,
    ) -> Result<TypeRef> {
        let (list, meta) = split_container(schemas, container, list_property)?;

        let items = schemas.get(list).items.ok_or_else(|| {
            CompileError::Generation("Connection list schema declares no items".to_string())
        })?;
        let element = outputs.resolve(schemas, builtins, items, false, None)?;
        let key = element.to_string();

        if let Some(existing) = self.connections.get(&key) {
            return Ok(existing.clone());
        }

        // `[[Pet]]` pages over `[Pet]` elements: PetListConnection
        let named = element.base_name();
        let base = format!(
            "{}{}",
            named.strip_prefix(outputs.name_prefix()).unwrap_or(named),
            "List".repeat(list_depth(&element))
        );
        debug!(element = %key, "creating connection type");

        let page_info = self.page_info(schemas, outputs);

        let cursor = schemas.alloc(SchemaNode::primitive("string"));
        let edge = schemas.alloc(SchemaNode::object(
            vec![("cursor".to_string(), cursor), ("node".to_string(), items)],
            &["cursor"],
        ));
        let edge = outputs.create_implicit(&format!("{}Edge", base), edge);
        let edges = schemas.alloc(SchemaNode::array(edge));
        let total_count = schemas.alloc(SchemaNode::primitive("integer"));

        let mut properties = meta;
        properties.insert("nodes".to_string(), list);
        properties.insert("edges".to_string(), edges);
        properties.insert("pageInfo".to_string(), page_info);
        properties.insert("totalCount".to_string(), total_count);

        let connection = schemas.alloc(SchemaNode::object(
            properties,
            &["pageInfo", "totalCount"],
        ));
        let connection = outputs.create_implicit(&format!("{}Connection", base), connection);
        let ty = outputs.resolve(schemas, builtins, connection, false, None)?;

        self.connections.insert(key, ty.clone());
        Ok(ty)
    }

    fn page_info(&mut self, schemas: &mut SchemaArena, outputs: &mut TypeRegistry) -> SchemaId {
        if let Some(page_info) = self.page_info {
            return page_info;
        }

        let string = schemas.alloc(SchemaNode::primitive("string"));
        let boolean = schemas.alloc(SchemaNode::primitive("boolean"));
        let node = schemas.alloc(SchemaNode::object(
            vec![
                ("endCursor".to_string(), string),
                ("hasNextPage".to_string(), boolean),
                ("hasPreviousPage".to_string(), boolean),
                ("startCursor".to_string(), string),
            ],
            &[],
        ));

        let page_info = outputs.create_implicit("PageInfo", node);
        self.page_info = Some(page_info);
        page_info
    }
}

fn split_container(
    schemas: &SchemaArena,
    container: SchemaId,
    list_property: Option<&str>,
) -> Result<(SchemaId, IndexMap<String, SchemaId>)> {
    let Some(property) = list_property else {
        return Ok((container, IndexMap::new()));
    };

    let node = schemas.get(container);
    let list = *node.properties.get(property).ok_or_else(|| {
        CompileError::Generation(format!(
            "Connection container has no list property '{}'",
            property
        ))
    })?;

    let meta = node
        .properties
        .iter()
        .filter(|(name, _)| name.as_str() != property)
        .map(|(name, id)| (name.clone(), *id))
        .collect();

    Ok((list, meta))
}

fn list_depth(ty: &TypeRef) -> usize {
    match ty {
        TypeRef::Named(_) => 0,
        TypeRef::List(inner) => 1 + list_depth(inner),
        TypeRef::NonNull(inner) => list_depth(inner),
    }
}
