use apollo_compiler::name;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn path(text: &str) -> OperationPath {
    text.parse().unwrap()
}

#[test]
fn root_path() {
    let root = OperationPath::root();
    assert!(root.is_root());
    assert!(root.refers_to_selection());
    assert_eq!(root.level(), 0);
    assert_eq!(root.parent_path(), None);
    assert_eq!(root.to_string(), "/");
    assert_eq!(format!("{root:#}"), "gqlop:/");
}

#[test]
fn parent_of_selection_drops_last_segment() {
    let user_name = path("/user/name");
    assert_eq!(user_name.level(), 2);
    assert_eq!(user_name.parent_path(), Some(path("/user")));
    assert_eq!(
        user_name.ancestors().collect::<Vec<_>>(),
        vec![path("/user"), OperationPath::root()]
    );
}

#[test]
fn parent_of_argument_walks_back_up_the_sub_path() {
    let nested = path("/search?filter.author.name");
    assert!(nested.refers_to_part_of_argument());
    assert!(!nested.refers_to_argument());
    assert!(!nested.refers_to_selection());

    let filter_author = nested.parent_path().unwrap();
    assert_eq!(filter_author, path("/search?filter.author"));
    let filter = filter_author.parent_path().unwrap();
    assert_eq!(filter, path("/search?filter"));
    assert!(filter.refers_to_argument());
    assert_eq!(filter.parent_path(), Some(path("/search")));
}

#[test]
fn parent_of_directive_clears_it() {
    let include = path("/user@include.if");
    assert!(include.refers_to_part_of_directive());
    assert_eq!(include.parent_path(), Some(path("/user@include")));
    assert_eq!(
        include.parent_path().and_then(|p| p.parent_path()),
        Some(path("/user"))
    );
}

#[test]
fn argument_and_directive_are_exclusive() {
    let user = OperationPath::fields([name!("user")]);
    let with_directive = user
        .clone()
        .transform()
        .argument(name!("id"))
        .directive(name!("skip"))
        .build();
    assert_eq!(with_directive.argument(), None);
    assert_eq!(
        with_directive.directive(),
        Some(&PathAttachment::new(name!("skip")))
    );

    let with_argument = with_directive.transform().argument(name!("id")).build();
    assert_eq!(with_argument.directive(), None);
    assert_eq!(with_argument, user.argument_path(name!("id")));
}

#[test]
fn transform_edits_the_selection_chain() {
    let edited = path("/user/name")
        .transform()
        .prepend(SelectionSegment::Field(name!("viewer")))
        .replace_last(SelectionSegment::AliasedField {
            alias: name!("fullName"),
            name: name!("name"),
        })
        .build();
    assert_eq!(edited.to_string(), "/viewer/user/fullName:name");
    assert_eq!(
        edited.transform().drop_first().drop_last().build(),
        path("/user")
    );
    assert_eq!(
        OperationPath::root().transform().drop_first().drop_last().build(),
        OperationPath::root()
    );
}

#[test]
fn sub_path_edits_without_an_argument_do_nothing() {
    let user = path("/user");
    assert_eq!(
        user.clone()
            .transform()
            .append_argument_segment(name!("x"))
            .append_directive_segment(name!("y"))
            .build(),
        user
    );
}

#[rstest]
#[case("/")]
#[case("/user")]
#[case("/user/name")]
#[case("/user/fullName:name")]
#[case("/node/[Admin]level")]
#[case("/node/[AdminFields:Admin]level")]
#[case("/node/[Admin]rank:level")]
#[case("/node/[AdminFields:Admin]rank:level")]
#[case("/search?query")]
#[case("/search?filter.author.name")]
#[case("/user@include")]
#[case("/user@include.if")]
fn display_and_parse_agree(#[case] text: &str) {
    assert_eq!(path(text).to_string(), text);
}

#[test]
fn parses_segments() {
    assert_eq!(
        path("gqlop:/node/[Admin]level/[F:User]n:name/n:name"),
        OperationPath::selection_of([
            SelectionSegment::Field(name!("node")),
            SelectionSegment::InlineFragment {
                type_condition: name!("Admin"),
                alias: None,
                field: name!("level"),
            },
            SelectionSegment::FragmentSpread {
                fragment_name: name!("F"),
                type_condition: name!("User"),
                alias: Some(name!("n")),
                field: name!("name"),
            },
            SelectionSegment::AliasedField {
                alias: name!("n"),
                name: name!("name"),
            },
        ])
    );
}

#[rstest]
#[case("user", PathParseError::MissingLeadingSlash("user".to_owned()))]
#[case("/user//name", PathParseError::EmptySegment { path: "/user//name".to_owned() })]
#[case("/[Admin", PathParseError::UnterminatedTypeCondition { segment: "[Admin".to_owned() })]
#[case("/1user", PathParseError::InvalidName("1user".to_owned()))]
#[case("/user?", PathParseError::InvalidName("".to_owned()))]
#[case("/[Admin]1:level", PathParseError::InvalidName("1".to_owned()))]
fn rejects_malformed_paths(#[case] text: &str, #[case] expected: PathParseError) {
    assert_eq!(text.parse::<OperationPath>(), Err(expected));
}

#[test]
fn fields_sort_before_inline_fragments_before_spreads() {
    let mut paths = vec![
        path("/node/[B:Admin]a"),
        path("/node/[Admin]z"),
        path("/node/zeta"),
        path("/node/[A:User]b"),
        path("/node/alpha:zeta"),
        path("/node/[Admin]a"),
        path("/node/[Admin]b:a"),
        path("/node/alpha"),
        path("/node"),
    ];
    paths.sort();
    assert_eq!(
        paths.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        vec![
            "/node",
            "/node/alpha",
            "/node/zeta",
            "/node/alpha:zeta",
            "/node/[Admin]a",
            "/node/[Admin]b:a",
            "/node/[Admin]z",
            "/node/[A:User]b",
            "/node/[B:Admin]a",
        ]
    );
}

#[test]
fn selection_path_strips_attachments() {
    assert_eq!(path("/search?filter.a").selection_path(), path("/search"));
    assert_eq!(path("/user@skip").selection_path(), path("/user"));
}
