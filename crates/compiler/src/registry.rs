//! Type registry
//!
//! One registry per direction (input or output). A registry maps schema nodes
//! to generated GraphQL types, guarantees unique type names and builds each
//! type body at most once. A type enters the `Building` state before its
//! fields are resolved, so a property that refers back to its own container
//! gets a reference to the name instead of recursing forever.

use crate::builtin::BuiltinCatalog;
use crate::naming::{is_valid_name, make_unique_valid_name, normalize_type_name};
use std::collections::{HashMap, HashSet};
use swagger_graphql_common::{
    BuiltinType, CompileError, FieldDefinition, Result, SchemaArena, SchemaId, TypeDefinition,
    TypeKind, TypeRef, MAX_SCHEMA_DEPTH,
};
use tracing::debug;

/// Which side of the API a registry produces types for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Input,
    Output,
}

impl RegistryKind {
    fn suffix(self) -> &'static str {
        match self {
            RegistryKind::Input => "Input",
            RegistryKind::Output => "",
        }
    }

    fn object_kind(self) -> TypeKind {
        match self {
            RegistryKind::Input => TypeKind::InputObject,
            RegistryKind::Output => TypeKind::Object,
        }
    }

    fn object_builtin(self) -> BuiltinType {
        match self {
            RegistryKind::Input => BuiltinType::InputObject,
            RegistryKind::Output => BuiltinType::Object,
        }
    }
}

/// Naming hint for an anonymous schema: `{parent}_{hint}`
#[derive(Debug, Clone, Copy)]
pub struct NameContext<'a> {
    pub parent: &'a str,
    pub hint: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Unbuilt,
    Building,
    Built,
}

#[derive(Debug, Clone)]
enum TypeBody {
    Object(Vec<FieldDefinition>),
    Scalar,
}

/// A named GraphQL type owned by a registry
#[derive(Debug, Clone)]
pub struct GeneratedType {
    /// Name the type was registered under, before prefixing
    pub source_name: String,
    /// Final unique GraphQL name
    pub name: String,
    pub node: SchemaId,
    pub state: BuildState,
    order: Option<usize>,
    description: Option<String>,
    body: Option<TypeBody>,
}

#[derive(Debug)]
pub struct TypeRegistry {
    kind: RegistryKind,
    name_prefix: String,
    types: Vec<GeneratedType>,
    by_node: HashMap<SchemaId, usize>,
    by_source_name: HashMap<String, usize>,
    taken_names: HashSet<String>,
    next_order: usize,
    next_anonymous: usize,
}

impl TypeRegistry {
    pub fn new(kind: RegistryKind, name_prefix: impl Into<String>) -> Self {
        Self {
            kind,
            name_prefix: name_prefix.into(),
            types: Vec::new(),
            by_node: HashMap::new(),
            by_source_name: HashMap::new(),
            taken_names: HashSet::new(),
            next_order: 0,
            next_anonymous: 1,
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// Reserve `candidate`, appending `2`, `3`, … until the name is free
    pub fn register_unique_name(&mut self, candidate: &str) -> String {
        let mut name = candidate.to_string();
        let mut suffix = 2;
        while self.taken_names.contains(&name) {
            name = format!("{}{}", candidate, suffix);
            suffix += 1;
        }
        self.taken_names.insert(name.clone());
        name
    }

    /// Register a named definition without building it
    pub fn add_definition(&mut self, source_name: &str, node: SchemaId) {
        self.register(source_name, node);
    }

    /// Register a type under `source_name` unless one already exists
    ///
    /// Returns the node registered under that name, which is the existing
    /// type's node when the name was taken earlier.
    pub fn create_implicit(&mut self, source_name: &str, node: SchemaId) -> SchemaId {
        match self.by_source_name.get(source_name) {
            Some(&index) => self.types[index].node,
            None => {
                let index = self.register(source_name, node);
                self.types[index].node
            }
        }
    }

    fn register(&mut self, source_name: &str, node: SchemaId) -> usize {
        let candidate = format!(
            "{}{}{}",
            self.name_prefix,
            normalize_type_name(source_name),
            self.kind.suffix()
        );
        let name = self.register_unique_name(&candidate);

        let index = self.types.len();
        self.types.push(GeneratedType {
            source_name: source_name.to_string(),
            name,
            node,
            state: BuildState::Unbuilt,
            order: None,
            description: None,
            body: None,
        });
        self.by_node.entry(node).or_insert(index);
        self.by_source_name.entry(source_name.to_string()).or_insert(index);
        index
    }

    pub fn get_by_node(&self, node: SchemaId) -> Option<&GeneratedType> {
        self.by_node.get(&node).map(|&index| &self.types[index])
    }

    pub fn get_by_source_name(&self, source_name: &str) -> Option<&GeneratedType> {
        self.by_source_name
            .get(source_name)
            .map(|&index| &self.types[index])
    }

    /// Resolve a schema node to a GraphQL type reference
    ///
    /// Arrays become lists of their resolved items; registered nodes become a
    /// reference to their named type (built on first use); primitives become
    /// built-in scalars; anything else gets an implicit type named from
    /// `context`, or `UnknownTypeN` without one. `required` wraps the result in
    /// a non-null.
    pub fn resolve(
        &mut self,
        schemas: &SchemaArena,
        builtins: &mut BuiltinCatalog,
        node: SchemaId,
        required: bool,
        context: Option<NameContext<'_>>,
    ) -> Result<TypeRef> {
        self.resolve_at(schemas, builtins, node, required, context, 0)
    }

    fn resolve_at(
        &mut self,
        schemas: &SchemaArena,
        builtins: &mut BuiltinCatalog,
        node: SchemaId,
        required: bool,
        context: Option<NameContext<'_>>,
        depth: usize,
    ) -> Result<TypeRef> {
        let ty = self.resolve_base(schemas, builtins, node, context, depth)?;
        if required {
            builtins.record(BuiltinType::NonNull);
            Ok(ty.non_null())
        } else {
            Ok(ty)
        }
    }

    fn resolve_base(
        &mut self,
        schemas: &SchemaArena,
        builtins: &mut BuiltinCatalog,
        node: SchemaId,
        context: Option<NameContext<'_>>,
        depth: usize,
    ) -> Result<TypeRef> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(CompileError::SchemaTooDeep(MAX_SCHEMA_DEPTH));
        }

        let schema = schemas.get(node);

        if let Some(items) = schema.items.filter(|_| schema.is_array()) {
            let item = self.resolve_at(schemas, builtins, items, false, None, depth + 1)?;
            builtins.record(BuiltinType::List);
            return Ok(TypeRef::list(item));
        }

        if let Some(&index) = self.by_node.get(&node) {
            return self.reference(schemas, builtins, index, depth);
        }

        if let Some(builtin) = builtins.resolve_schema(schema) {
            return Ok(builtin);
        }

        let source_name = match context {
            Some(context) => format!("{}_{}", context.parent, context.hint),
            None => {
                let name = format!("UnknownType{}", self.next_anonymous);
                self.next_anonymous += 1;
                name
            }
        };

        // A synthesized name only ever reuses the type of the same node; a
        // different node gets its own, suffixed type.
        let index = match self.by_source_name.get(&source_name) {
            Some(&index) if self.types[index].node == node => index,
            _ => self.register(&source_name, node),
        };
        self.reference(schemas, builtins, index, depth)
    }

    /// Reference the type at `index`, building its body on first use
    fn reference(
        &mut self,
        schemas: &SchemaArena,
        builtins: &mut BuiltinCatalog,
        index: usize,
        depth: usize,
    ) -> Result<TypeRef> {
        if self.types[index].state == BuildState::Unbuilt {
            self.types[index].state = BuildState::Building;
            self.types[index].order = Some(self.next_order);
            self.next_order += 1;

            let body = self.build_body(schemas, builtins, index, depth)?;

            let ty = &mut self.types[index];
            ty.description = schemas.get(ty.node).description.clone();
            ty.body = Some(body);
            ty.state = BuildState::Built;
        }

        Ok(TypeRef::named(self.types[index].name.clone()))
    }

    fn build_body(
        &mut self,
        schemas: &SchemaArena,
        builtins: &mut BuiltinCatalog,
        index: usize,
        depth: usize,
    ) -> Result<TypeBody> {
        let node = self.types[index].node;
        let schema = schemas.get(node);

        if schema.additional_properties || schema.properties.is_empty() {
            debug!(name = %self.types[index].name, "passing shapeless object through as a scalar");
            builtins.record(BuiltinType::Scalar);
            return Ok(TypeBody::Scalar);
        }

        builtins.record(self.kind.object_builtin());

        let parent = self.types[index].source_name.clone();
        let mut used: HashSet<String> = schema.properties.keys().cloned().collect();
        let mut fields = Vec::with_capacity(schema.properties.len());

        for (key, &child) in &schema.properties {
            let context = NameContext {
                parent: &parent,
                hint: key,
            };
            let ty = self.resolve_at(
                schemas,
                builtins,
                child,
                schema.is_required(key),
                Some(context),
                depth + 1,
            )?;

            let (name, accessor) = if is_valid_name(key) {
                (key.clone(), None)
            } else {
                let name = make_unique_valid_name(key, &mut used);
                let accessor = match self.kind {
                    RegistryKind::Output => Some(key.clone()),
                    RegistryKind::Input => None,
                };
                (name, accessor)
            };

            fields.push(FieldDefinition {
                name,
                ty,
                description: schemas.get(child).description.clone(),
                accessor,
            });
        }

        Ok(TypeBody::Object(fields))
    }

    /// Built type definitions, most recently started build first
    ///
    /// A type's dependencies start building after it does, so they precede it.
    pub fn definitions(&self) -> Vec<TypeDefinition> {
        let mut built: Vec<&GeneratedType> = self
            .types
            .iter()
            .filter(|ty| ty.state == BuildState::Built)
            .collect();
        built.sort_by(|a, b| b.order.cmp(&a.order));

        built
            .into_iter()
            .map(|ty| match &ty.body {
                Some(TypeBody::Object(fields)) => TypeDefinition {
                    name: ty.name.clone(),
                    kind: self.kind.object_kind(),
                    description: ty.description.clone(),
                    fields: fields.clone(),
                },
                _ => TypeDefinition {
                    name: ty.name.clone(),
                    kind: TypeKind::Scalar,
                    description: ty.description.clone(),
                    fields: Vec::new(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_graphql_common::SchemaNode;

    fn object(arena: &mut SchemaArena, props: &[(&str, SchemaId)], required: &[&str]) -> SchemaId {
        arena.alloc(SchemaNode::object(
            props.iter().map(|(k, v)| (k.to_string(), *v)),
            required,
        ))
    }

    #[test]
    fn test_register_unique_name() {
        let mut registry = TypeRegistry::new(RegistryKind::Output, "");
        assert_eq!(registry.register_unique_name("Foo"), "Foo");
        assert_eq!(registry.register_unique_name("Foo"), "Foo2");
        assert_eq!(registry.register_unique_name("Foo"), "Foo3");
        assert_eq!(registry.register_unique_name("Bar"), "Bar");
    }

    #[test]
    fn test_names_use_prefix_and_input_suffix() {
        let mut arena = SchemaArena::new();
        let name = arena.alloc(SchemaNode::primitive("string"));
        let pet = object(&mut arena, &[("name", name)], &[]);

        let mut inputs = TypeRegistry::new(RegistryKind::Input, "Api");
        inputs.add_definition("my.pet", pet);
        assert_eq!(inputs.get_by_node(pet).unwrap().name, "ApiMyPetInput");
    }

    #[test]
    fn test_registers_definitions_lazily() {
        let mut arena = SchemaArena::new();
        let name = arena.alloc(SchemaNode::primitive("string"));
        let pet = object(&mut arena, &[("name", name)], &["name"]);

        let mut builtins = BuiltinCatalog::new();
        let mut outputs = TypeRegistry::new(RegistryKind::Output, "");
        outputs.add_definition("Pet", pet);
        assert!(outputs.definitions().is_empty());

        let ty = outputs.resolve(&arena, &mut builtins, pet, false, None).unwrap();
        assert_eq!(ty, TypeRef::named("Pet"));

        let defs = outputs.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].kind, TypeKind::Object);
        assert_eq!(defs[0].fields[0].ty.to_string(), "String!");
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut arena = SchemaArena::new();
        let recursive = arena.reserve();
        let list = arena.alloc(SchemaNode::array(recursive));
        arena.set(
            recursive,
            SchemaNode::object(
                vec![("children".to_string(), list), ("parent".to_string(), recursive)],
                &[],
            ),
        );

        let mut builtins = BuiltinCatalog::new();
        let mut outputs = TypeRegistry::new(RegistryKind::Output, "");
        outputs.add_definition("Recursive", recursive);
        outputs
            .resolve(&arena, &mut builtins, recursive, false, None)
            .unwrap();

        let defs = outputs.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].fields[0].ty.to_string(), "[Recursive]");
        assert_eq!(defs[0].fields[1].ty.to_string(), "Recursive");
    }

    #[test]
    fn test_anonymous_types_are_named_from_context() {
        let mut arena = SchemaArena::new();
        let street = arena.alloc(SchemaNode::primitive("string"));
        let address = object(&mut arena, &[("street", street)], &[]);
        let person = object(&mut arena, &[("address", address)], &[]);
        let orphan = object(&mut arena, &[("street", street)], &[]);

        let mut builtins = BuiltinCatalog::new();
        let mut outputs = TypeRegistry::new(RegistryKind::Output, "");
        outputs.add_definition("Person", person);
        outputs.resolve(&arena, &mut builtins, person, false, None).unwrap();
        let ty = outputs.resolve(&arena, &mut builtins, orphan, false, None).unwrap();

        assert!(outputs.get_by_source_name("Person_address").is_some());
        assert_eq!(outputs.get_by_node(address).unwrap().name, "PersonAddress");
        assert_eq!(ty, TypeRef::named("UnknownType1"));
    }

    #[test]
    fn test_distinct_nodes_with_the_same_context_stay_distinct() {
        let mut arena = SchemaArena::new();
        let int = arena.alloc(SchemaNode::primitive("integer"));
        let string = arena.alloc(SchemaNode::primitive("string"));
        let first = object(&mut arena, &[("a", int)], &[]);
        let second = object(&mut arena, &[("b", string)], &[]);
        let context = || {
            Some(NameContext {
                parent: "foo",
                hint: "Response",
            })
        };

        let mut builtins = BuiltinCatalog::new();
        let mut outputs = TypeRegistry::new(RegistryKind::Output, "");
        let a = outputs.resolve(&arena, &mut builtins, first, false, context()).unwrap();
        let b = outputs.resolve(&arena, &mut builtins, second, false, context()).unwrap();
        let again = outputs.resolve(&arena, &mut builtins, first, false, context()).unwrap();

        assert_eq!(a, TypeRef::named("FooResponse"));
        assert_eq!(b, TypeRef::named("FooResponse2"));
        assert_eq!(again, a);

        let defs = outputs.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs.iter().find(|d| d.name == "FooResponse2").unwrap().fields[0].name, "b");
    }

    #[test]
    fn test_shapeless_objects_become_scalars() {
        let mut arena = SchemaArena::new();
        let free_form = arena.alloc(SchemaNode::primitive("object"));
        let mut map = SchemaNode::object(vec![("x".to_string(), free_form)], &[]);
        map.additional_properties = true;
        let map = arena.alloc(map);

        let mut builtins = BuiltinCatalog::new();
        let mut outputs = TypeRegistry::new(RegistryKind::Output, "");
        outputs.add_definition("FreeForm", free_form);
        outputs.add_definition("Map", map);
        outputs.resolve(&arena, &mut builtins, free_form, false, None).unwrap();
        outputs.resolve(&arena, &mut builtins, map, false, None).unwrap();

        let defs = outputs.definitions();
        assert!(defs.iter().all(|def| def.kind == TypeKind::Scalar));
        assert!(builtins.used().contains(&BuiltinType::Scalar));
    }

    #[test]
    fn test_illegal_keys_get_accessors_on_outputs_only() {
        let mut arena = SchemaArena::new();
        let value = arena.alloc(SchemaNode::primitive("string"));
        let thing = object(&mut arena, &[("bad-name", value), ("ok", value)], &[]);

        let mut builtins = BuiltinCatalog::new();
        let mut outputs = TypeRegistry::new(RegistryKind::Output, "");
        let mut inputs = TypeRegistry::new(RegistryKind::Input, "");
        outputs.add_definition("Thing", thing);
        inputs.add_definition("Thing", thing);
        outputs.resolve(&arena, &mut builtins, thing, false, None).unwrap();
        inputs.resolve(&arena, &mut builtins, thing, false, None).unwrap();

        let output = &outputs.definitions()[0];
        assert_eq!(output.fields[0].name, "badName");
        assert_eq!(output.fields[0].accessor.as_deref(), Some("bad-name"));
        assert_eq!(output.fields[1].accessor, None);

        let input = &inputs.definitions()[0];
        assert_eq!(input.name, "ThingInput");
        assert_eq!(input.fields[0].name, "badName");
        assert_eq!(input.fields[0].accessor, None);
    }

    #[test]
    fn test_depth_guard() {
        let mut arena = SchemaArena::new();
        let mut node = arena.alloc(SchemaNode::primitive("string"));
        for _ in 0..(MAX_SCHEMA_DEPTH + 2) {
            node = arena.alloc(SchemaNode::array(node));
        }

        let mut builtins = BuiltinCatalog::new();
        let mut outputs = TypeRegistry::new(RegistryKind::Output, "");
        let err = outputs
            .resolve(&arena, &mut builtins, node, false, None)
            .unwrap_err();
        assert!(matches!(err, CompileError::SchemaTooDeep(_)));
    }
}
