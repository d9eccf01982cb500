use std::str::FromStr;

use apollo_compiler::Name;

use super::OperationPath;
use super::PathTransform;
use super::SCHEME;
use super::SelectionSegment;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathParseError {
    #[error("operation path `{0}` must start with `/`")]
    MissingLeadingSlash(String),
    #[error("operation path `{path}` has an empty segment")]
    EmptySegment { path: String },
    #[error("segment `{segment}` has an unterminated type condition")]
    UnterminatedTypeCondition { segment: String },
    #[error("`{0}` is not a valid GraphQL name")]
    InvalidName(String),
}

fn parse_name(text: &str) -> Result<Name, PathParseError> {
    Name::new(text).map_err(|_| PathParseError::InvalidName(text.to_owned()))
}

// `name` or `alias:name`
fn parse_field(text: &str) -> Result<(Option<Name>, Name), PathParseError> {
    Ok(match text.split_once(':') {
        Some((alias, name)) => (Some(parse_name(alias)?), parse_name(name)?),
        None => (None, parse_name(text)?),
    })
}

fn parse_segment(segment: &str) -> Result<SelectionSegment, PathParseError> {
    if let Some(rest) = segment.strip_prefix('[') {
        let Some((condition, field)) = rest.split_once(']') else {
            return Err(PathParseError::UnterminatedTypeCondition {
                segment: segment.to_owned(),
            });
        };
        let (alias, field) = parse_field(field)?;
        return Ok(match condition.split_once(':') {
            Some((fragment_name, type_condition)) => SelectionSegment::FragmentSpread {
                fragment_name: parse_name(fragment_name)?,
                type_condition: parse_name(type_condition)?,
                alias,
                field,
            },
            None => SelectionSegment::InlineFragment {
                type_condition: parse_name(condition)?,
                alias,
                field,
            },
        });
    }
    Ok(match parse_field(segment)? {
        (Some(alias), name) => SelectionSegment::AliasedField { alias, name },
        (None, name) => SelectionSegment::Field(name),
    })
}

// `name.sub.path`
fn parse_attachment(text: &str) -> Result<(Name, Vec<Name>), PathParseError> {
    let mut keys = text.split('.');
    let name = parse_name(keys.next().unwrap_or_default())?;
    let sub_path = keys.map(parse_name).collect::<Result<Vec<_>, _>>()?;
    Ok((name, sub_path))
}

/// Parses the textual form produced by `Display`, with or without the `gqlop:` scheme prefix.
impl FromStr for OperationPath {
    type Err = PathParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let path = text
            .strip_prefix(SCHEME)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(text);
        let Some(path) = path.strip_prefix('/') else {
            return Err(PathParseError::MissingLeadingSlash(text.to_owned()));
        };

        // Names cannot contain `?` or `@`, so the first one marks the end of the selection.
        let (selection, attachment) = match path.find(['?', '@']) {
            Some(index) => (&path[..index], Some(path.split_at(index).1)),
            None => (path, None),
        };

        let mut transform = PathTransform::new(OperationPath::root());
        if !selection.is_empty() {
            for segment in selection.split('/') {
                if segment.is_empty() {
                    return Err(PathParseError::EmptySegment {
                        path: text.to_owned(),
                    });
                }
                transform = transform.append(parse_segment(segment)?);
            }
        }

        if let Some(attachment) = attachment {
            if let Some(argument) = attachment.strip_prefix('?') {
                let (name, sub_path) = parse_attachment(argument)?;
                transform = transform.argument_with_sub_path(name, sub_path);
            } else if let Some(directive) = attachment.strip_prefix('@') {
                let (name, sub_path) = parse_attachment(directive)?;
                transform = transform.directive_with_sub_path(name, sub_path);
            }
        }
        Ok(transform.build())
    }
}
