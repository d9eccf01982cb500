use apollo_compiler::Name;
use apollo_compiler::ast::Type;

use crate::operation_path::OperationPath;

/// Break out of the current function, returning a structural invariant violation.
#[macro_export]
macro_rules! bail {
    ( $( $arg:tt )+ ) => {
        return Err($crate::error::CompileError::invariant(format!( $( $arg )+ )).into())
    };
}

/// A safe assertion: in debug mode, it panics on failure, and in production, it returns a
/// structural invariant violation.
///
/// Treat this as an assertion. It must only be used for conditions that *should never happen*
/// in normal operation.
#[macro_export]
macro_rules! ensure {
    ( $expr:expr, $( $arg:tt )+ ) => {
        #[cfg(debug_assertions)]
        {
            if false {
                return Err($crate::error::CompileError::invariant("ensure!() must be used in a function that returns a Result").into());
            }
            assert!($expr, $( $arg )+);
        }

        #[cfg(not(debug_assertions))]
        if !$expr {
            $crate::bail!( $( $arg )+ );
        }
    };
}

/// Everything that can go wrong while turning a [`DocumentSpec`](crate::DocumentSpec) into a
/// query document.
///
/// No variant is recoverable: compilation stops at the first error and never hands out a
/// partial document. The type is `Clone` so that a failed compilation can be cached and
/// returned again for the same input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A selection segment names a field that neither the parent type nor any of its
    /// implementations declare.
    #[error("Cannot resolve field `{field_name}` of path `{path}` on type `{type_name}`")]
    SchemaResolution {
        path: OperationPath,
        type_name: Name,
        field_name: Name,
    },
    /// A required argument has no variable, no explicit default, no schema default, and is
    /// neither a list nor nullable.
    #[error("Cannot bind required argument `{argument}: {ty}` at `{path}`: {message}")]
    ArgumentBinding {
        path: OperationPath,
        argument: Name,
        ty: Type,
        message: String,
    },
    /// The same variable is bound to arguments of different types.
    #[error(
        "Variable `${variable}` is declared both as `{existing}` and as `{conflicting}`"
    )]
    VariableRedefinition {
        variable: Name,
        existing: Type,
        conflicting: Type,
    },
    /// Two fragment spreads share a fragment name but select different things.
    #[error("Fragment `{fragment}` is defined more than once with different selections")]
    FragmentRedefinition { fragment: Name },
    /// An explicit default literal has no GraphQL value representation.
    #[error("Invalid literal for `{path}`: {message}")]
    InvalidLiteral {
        path: OperationPath,
        message: String,
    },
    /// A path was given in the wrong mode, or the compiler broke one of its own invariants.
    #[error("{message}")]
    StructuralInvariantViolation { message: String },
}

impl CompileError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::StructuralInvariantViolation {
            message: message.into(),
        }
    }

    /// A short, stable name for the error kind, used as a log field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaResolution { .. } => "SCHEMA_RESOLUTION",
            Self::ArgumentBinding { .. } => "ARGUMENT_BINDING",
            Self::VariableRedefinition { .. } => "VARIABLE_REDEFINITION",
            Self::FragmentRedefinition { .. } => "FRAGMENT_REDEFINITION",
            Self::InvalidLiteral { .. } => "INVALID_LITERAL",
            Self::StructuralInvariantViolation { .. } => "STRUCTURAL_INVARIANT_VIOLATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;

    use super::*;

    fn fails_with_bail() -> Result<(), CompileError> {
        bail!("level {} has no parent", 3);
    }

    #[test]
    fn bail_returns_an_invariant_violation() {
        assert_eq!(
            fails_with_bail(),
            Err(CompileError::StructuralInvariantViolation {
                message: "level 3 has no parent".to_owned()
            })
        );
    }

    #[test]
    fn displays_variable_conflicts() {
        let error = CompileError::VariableRedefinition {
            variable: name!("q"),
            existing: Type::Named(name!("String")),
            conflicting: Type::NonNullNamed(name!("Int")),
        };
        assert_eq!(
            error.to_string(),
            "Variable `$q` is declared both as `String` and as `Int!`"
        );
        assert_eq!(error.code(), "VARIABLE_REDEFINITION");
    }
}
