//! Predicates for filtering stored records by translated locale.
//!
//! The crate does not build queries itself; a [`LocalePredicate`] is handed to an
//! external query builder through [`PredicateBuilder`].

use std::fmt::{self, Display};

use crate::{codec::span_pattern, schema::encoded_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalePredicate {
    /// The column holds a non-null, non-empty value.
    NotEmpty { column: String },

    /// The column matches a `LIKE` pattern.
    Like { column: String, pattern: String },

    /// At least one of the predicates holds.
    AnyOf(Vec<LocalePredicate>),
}

/// Receives predicates in the shape of a typical SQL query builder.
pub trait PredicateBuilder {
    fn where_not_empty(&mut self, column: &str);

    fn where_like(&mut self, column: &str, pattern: &str);

    /// Adds a group whose members are OR-combined by `build`.
    fn or_group(&mut self, build: &mut dyn FnMut(&mut Self));
}

impl LocalePredicate {
    pub fn apply<B: PredicateBuilder>(&self, builder: &mut B) {
        match self {
            LocalePredicate::NotEmpty { column } => builder.where_not_empty(column),
            LocalePredicate::Like { column, pattern } => builder.where_like(column, pattern),
            LocalePredicate::AnyOf(predicates) => builder.or_group(&mut |group: &mut B| {
                for predicate in predicates {
                    predicate.apply(group);
                }
            }),
        }
    }
}

impl Display for LocalePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalePredicate::NotEmpty { column } => {
                write!(f, "({} IS NOT NULL AND {} <> '')", column, column)
            }
            LocalePredicate::Like { column, pattern } => {
                write!(f, "{} LIKE '{}'", column, pattern.replace('\'', "''"))
            }
            LocalePredicate::AnyOf(predicates) if predicates.is_empty() => write!(f, "FALSE"),
            LocalePredicate::AnyOf(predicates) => write!(
                f,
                "({})",
                predicates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" OR ")
            ),
        }
    }
}

/// Matches records of `column` that hold a translation for `locale`.
///
/// The main locale lives in the plain column; every other locale is matched by its
/// span markers inside the encoded column.
pub fn where_locale(column: &str, locale: &str, main_locale: &str) -> LocalePredicate {
    if locale == main_locale {
        return LocalePredicate::NotEmpty {
            column: column.to_string(),
        };
    }

    LocalePredicate::Like {
        column: encoded_key(column),
        pattern: span_pattern(locale),
    }
}

/// Matches records of `column` holding a translation for any of `locales`.
pub fn where_locales<I, S>(column: &str, locales: I, main_locale: &str) -> LocalePredicate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    LocalePredicate::AnyOf(
        locales
            .into_iter()
            .map(|locale| where_locale(column, locale.as_ref(), main_locale))
            .collect(),
    )
}
