//! Compiles sets of operation paths into executable GraphQL query documents.
//!
//! A caller describes the query it needs as a flat [`DocumentSpec`]: the [`OperationPath`]s of
//! the fields to select, plus variables and literal values for their arguments. [`compile`]
//! turns it into a single deduplicated [`apollo_compiler::ast::Document`]: the selection tree,
//! arguments, variable definitions, and fragment definitions. Output is deterministic for a
//! given schema and spec.
//!
//! ```
//! use apollo_compiler::Schema;
//! use apollo_compiler::ast;
//! use apollo_compiler::name;
//! use document_compiler::DocumentSpec;
//! use document_compiler::OperationPath;
//!
//! let schema = Schema::parse_and_validate(
//!     "type Query { search(query: String): [String] }",
//!     "schema.graphql",
//! )
//! .unwrap();
//! let spec = DocumentSpec::builder()
//!     .add_field_path("/search".parse::<OperationPath>().unwrap())
//!     .unwrap()
//!     .bind_variable(name!("q"), "/search?query".parse().unwrap())
//!     .unwrap()
//!     .build();
//! let document = document_compiler::compile(&schema, &spec).unwrap();
//!
//! let expected = ast::Document::parse(
//!     "query($q: String) { search(query: $q) }",
//!     "expected.graphql",
//! )
//! .unwrap();
//! assert_eq!(document.to_string(), expected.to_string());
//! ```
//!
//! [`CompileCache`] memoizes compilation by schema identity (see [`SchemaRef`]).

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

mod cache;
mod compiler;
mod config;
pub mod document_spec;
pub mod error;
pub mod operation_path;
pub mod schema;

pub use crate::cache::CompileCache;
pub use crate::compiler::compile;
pub use crate::config::CompileCacheConfig;
pub use crate::document_spec::DocumentSpec;
pub use crate::document_spec::DocumentSpecBuilder;
pub use crate::document_spec::LiteralValue;
pub use crate::error::CompileError;
pub use crate::operation_path::OperationPath;
pub use crate::operation_path::PathParseError;
pub use crate::operation_path::SelectionSegment;
pub use crate::schema::SchemaDescriptor;
pub use crate::schema::SchemaId;
pub use crate::schema::SchemaRef;

// Compilation may happen on any thread, and the cache is shared between them.
const _: () = {
    const fn assert_thread_safe<T: Send + Sync>() {}

    assert_thread_safe::<CompileCache>();
    assert_thread_safe::<DocumentSpec>();
    assert_thread_safe::<OperationPath>();
    assert_thread_safe::<CompileError>();
    assert_thread_safe::<SchemaRef<apollo_compiler::Schema>>();
};
