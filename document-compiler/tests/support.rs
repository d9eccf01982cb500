use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::validation::Valid;
use document_compiler::DocumentSpec;
use document_compiler::OperationPath;

pub(crate) const SCHEMA: &str = r#"
    type Query {
      user: User
      node(id: ID!): Node
      search(query: String, first: Int = 10): [String]
      suggest(query: String): [String]
      lookup(query: String!, tags: [String!]!): String
      count(query: Int): Int
      posts(order: Order, filter: PostFilter): [Post!]!
    }

    interface Node {
      id: ID!
    }

    type User implements Node {
      id: ID!
      name: String
      email: String
      friends(first: Int): [User]
    }

    type Admin implements Node {
      id: ID!
      level: Int
    }

    type Post {
      title: String
      author: User
    }

    enum Order {
      NEWEST
      OLDEST
    }

    input PostFilter {
      order: Order
      tags: [String!]
      minScore: Float
    }
"#;

pub(crate) fn schema() -> Valid<Schema> {
    Schema::parse_and_validate(SCHEMA, "schema.graphql").unwrap()
}

pub(crate) fn path(text: &str) -> OperationPath {
    text.parse().unwrap()
}

pub(crate) fn spec(paths: &[&str]) -> DocumentSpec {
    DocumentSpec::builder()
        .add_field_paths(paths.iter().map(|text| path(text)))
        .unwrap()
        .build()
}

/// Compares documents after printing, so that the expected document can be written in any
/// format.
#[track_caller]
pub(crate) fn assert_document(document: &ast::Document, expected: &str) {
    let expected = ast::Document::parse(expected, "expected.graphql").unwrap();
    pretty_assertions::assert_eq!(document.to_string(), expected.to_string());
}
