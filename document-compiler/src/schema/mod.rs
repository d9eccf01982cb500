//! The view of a schema that the document compiler needs.
//!
//! Reading introspection results or SDL into a schema happens elsewhere. The compiler only
//! asks the questions of [`SchemaDescriptor`], which is implemented here for
//! [`apollo_compiler::Schema`].

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::ast::FieldDefinition;
use apollo_compiler::ast::Type;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;

/// Schema lookups used while compiling a document.
pub trait SchemaDescriptor {
    /// The name of the type at the root of query operations.
    fn query_root_type(&self) -> Option<&Name>;

    /// The definition of the field `field_name` declared by the object or interface
    /// `type_name`, including its arguments and their defaults.
    fn field(&self, type_name: &Name, field_name: &Name) -> Option<&FieldDefinition>;

    /// The object types an abstract type can resolve to: the implementations of an interface
    /// or the members of a union. Empty for any other type.
    ///
    /// The set is sorted so that searching it is deterministic.
    fn implementations(&self, abstract_type: &Name) -> BTreeSet<Name>;

    /// The object, interface or union type underneath the list and non-null wrappers of `ty`,
    /// or `None` for leaf types.
    fn implementing_type(&self, ty: &Type) -> Option<Name>;

    fn is_enum(&self, _type_name: &Name) -> bool {
        false
    }

    /// The declared type of the field `field_name` of the input object `input_object`.
    fn input_field_type(&self, _input_object: &Name, _field_name: &Name) -> Option<&Type> {
        None
    }
}

impl SchemaDescriptor for Schema {
    fn query_root_type(&self) -> Option<&Name> {
        self.root_operation(ast::OperationType::Query)
    }

    fn field(&self, type_name: &Name, field_name: &Name) -> Option<&FieldDefinition> {
        // Includes meta-fields such as `__typename`.
        self.type_field(type_name.as_str(), field_name.as_str())
            .ok()
            .map(|component| &*component.node)
    }

    fn implementations(&self, abstract_type: &Name) -> BTreeSet<Name> {
        match self.types.get(abstract_type) {
            Some(ExtendedType::Interface(_)) => self
                .types
                .values()
                .filter_map(|ty| match ty {
                    ExtendedType::Object(object)
                        if object
                            .implements_interfaces
                            .iter()
                            .any(|interface| interface.name == *abstract_type) =>
                    {
                        Some(object.name.clone())
                    }
                    _ => None,
                })
                .collect(),
            Some(ExtendedType::Union(union_)) => union_
                .members
                .iter()
                .map(|member| member.name.clone())
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    fn implementing_type(&self, ty: &Type) -> Option<Name> {
        let name = ty.inner_named_type();
        match self.types.get(name)? {
            ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_) => {
                Some(name.clone())
            }
            ExtendedType::Scalar(_) | ExtendedType::Enum(_) | ExtendedType::InputObject(_) => {
                None
            }
        }
    }

    fn is_enum(&self, type_name: &Name) -> bool {
        matches!(self.types.get(type_name), Some(ExtendedType::Enum(_)))
    }

    fn input_field_type(&self, input_object: &Name, field_name: &Name) -> Option<&Type> {
        self.get_input_object(input_object.as_str())?
            .fields
            .get(field_name)
            .map(|field| &*field.node.ty)
    }
}

impl<S: SchemaDescriptor> SchemaDescriptor for Valid<S> {
    fn query_root_type(&self) -> Option<&Name> {
        (**self).query_root_type()
    }

    fn field(&self, type_name: &Name, field_name: &Name) -> Option<&FieldDefinition> {
        (**self).field(type_name, field_name)
    }

    fn implementations(&self, abstract_type: &Name) -> BTreeSet<Name> {
        (**self).implementations(abstract_type)
    }

    fn implementing_type(&self, ty: &Type) -> Option<Name> {
        (**self).implementing_type(ty)
    }

    fn is_enum(&self, type_name: &Name) -> bool {
        (**self).is_enum(type_name)
    }

    fn input_field_type(&self, input_object: &Name, field_name: &Name) -> Option<&Type> {
        (**self).input_field_type(input_object, field_name)
    }
}

// Global storage for the counter used to identify schemas
static NEXT_SCHEMA_ID: atomic::AtomicU64 = atomic::AtomicU64::new(1);

/// Opaque identity of a [`SchemaRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaId(u64);

impl SchemaId {
    fn new() -> Self {
        // atomically increment global counter
        Self(NEXT_SCHEMA_ID.fetch_add(1, atomic::Ordering::AcqRel))
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema#{}", self.0)
    }
}

/// A shared schema with an identity.
///
/// Clones share the identity of the original. Every call to [`SchemaRef::new`] creates a new
/// identity, even for a schema structurally equal to an existing one, so that replacing a
/// schema is enough to stop reusing anything cached for the old one.
#[derive(Debug)]
pub struct SchemaRef<S> {
    id: SchemaId,
    schema: Arc<S>,
}

impl<S> SchemaRef<S> {
    pub fn new(schema: S) -> Self {
        Self::from_arc(Arc::new(schema))
    }

    pub fn from_arc(schema: Arc<S>) -> Self {
        Self {
            id: SchemaId::new(),
            schema,
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }
}

impl<S> Clone for SchemaRef<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            schema: self.schema.clone(),
        }
    }
}

impl<S> Deref for SchemaRef<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.schema
    }
}

impl<S> PartialEq for SchemaRef<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S> Eq for SchemaRef<S> {}
