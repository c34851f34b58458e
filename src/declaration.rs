//! Deciding whether the comment of a declaration should be parsed at all.
//!
//! Enumerating declarations is up to the caller; this module only needs the kind, visibility and
//! raw comment of each one.
use std::ops::BitOr;

use thiserror::Error;
use tracing::debug;

use crate::ast::Document;
use crate::error::ParseError;
use crate::parser::Parser;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeclarationKind {
    Class,
    Interface,
    Method,
    Property,
    Constant,
    Function,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// Set of member kinds and visibilities whose comments get parsed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Filter(u16);

impl Filter {
    pub const METHODS_PUBLIC: Filter = Filter(1);
    pub const METHODS_PROTECTED: Filter = Filter(2);
    pub const METHODS_PRIVATE: Filter = Filter(4);
    pub const METHODS_ALL: Filter = Filter(7);
    pub const PROPERTIES_PUBLIC: Filter = Filter(8);
    pub const PROPERTIES_PROTECTED: Filter = Filter(16);
    pub const PROPERTIES_PRIVATE: Filter = Filter(32);
    pub const PROPERTIES_ALL: Filter = Filter(56);
    pub const CONSTANTS_PUBLIC: Filter = Filter(64);
    pub const CONSTANTS_PROTECTED: Filter = Filter(128);
    pub const CONSTANTS_PRIVATE: Filter = Filter(256);
    pub const CONSTANTS_ALL: Filter = Filter(448);
    pub const ALL: Filter = Filter(511);

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Filter) -> bool {
        self.0 & other.0 == other.0
    }

    /// Classes, interfaces and functions are always admitted. Members need the bit for their kind
    /// and visibility.
    pub fn admits(self, kind: DeclarationKind, visibility: Visibility) -> bool {
        let (public, protected, private) = match kind {
            DeclarationKind::Class | DeclarationKind::Interface | DeclarationKind::Function => {
                return true
            }
            DeclarationKind::Method => (
                Filter::METHODS_PUBLIC,
                Filter::METHODS_PROTECTED,
                Filter::METHODS_PRIVATE,
            ),
            DeclarationKind::Property => (
                Filter::PROPERTIES_PUBLIC,
                Filter::PROPERTIES_PROTECTED,
                Filter::PROPERTIES_PRIVATE,
            ),
            DeclarationKind::Constant => (
                Filter::CONSTANTS_PUBLIC,
                Filter::CONSTANTS_PROTECTED,
                Filter::CONSTANTS_PRIVATE,
            ),
        };
        self.contains(match visibility {
            Visibility::Public => public,
            Visibility::Protected => protected,
            Visibility::Private => private,
        })
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::ALL
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        Filter(self.0 | rhs.0)
    }
}

/// What the caller knows about one declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub kind: DeclarationKind,
    pub visibility: Visibility,
    /// Built into the runtime rather than declared in source, so it has no comment to read.
    pub is_internal: bool,
    pub doc_comment: Option<&'a str>,
}

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DeclarationError {
    #[error("cannot parse internal element \"{0}\"")]
    InternalElement(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parses the comment of `declaration` if `filter` admits it.
///
/// Returns `Ok(None)` for a filtered-out declaration. A declaration without a comment gives the
/// empty document.
pub fn parse_declaration(
    declaration: &Declaration,
    filter: Filter,
) -> Result<Option<Document>, DeclarationError> {
    if declaration.is_internal {
        return Err(DeclarationError::InternalElement(
            declaration.name.to_string(),
        ));
    }
    if !filter.admits(declaration.kind, declaration.visibility) {
        debug!(name = declaration.name, kind = ?declaration.kind, "declaration filtered out");
        return Ok(None);
    }
    let document = Parser::new(declaration.doc_comment.unwrap_or("")).parse()?;
    Ok(Some(document))
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Description;

    fn method<'a>(visibility: Visibility, doc_comment: Option<&'a str>) -> Declaration<'a> {
        Declaration {
            name: "myMethod",
            kind: DeclarationKind::Method,
            visibility,
            is_internal: false,
            doc_comment,
        }
    }

    #[test]
    fn test_filter_bits() -> () {
        assert_eq!(
            Filter::METHODS_PUBLIC | Filter::METHODS_PROTECTED | Filter::METHODS_PRIVATE,
            Filter::METHODS_ALL
        );
        assert_eq!(
            Filter::METHODS_ALL | Filter::PROPERTIES_ALL | Filter::CONSTANTS_ALL,
            Filter::ALL
        );
        assert_eq!(Filter::default(), Filter::ALL);
        assert!(Filter::ALL.contains(Filter::CONSTANTS_PRIVATE));
        assert!(!Filter::METHODS_ALL.contains(Filter::PROPERTIES_PUBLIC));
        assert_eq!((Filter::METHODS_PUBLIC | Filter::CONSTANTS_PUBLIC).bits(), 65);
    }

    #[test]
    fn test_admits() -> () {
        let members = [
            DeclarationKind::Method,
            DeclarationKind::Property,
            DeclarationKind::Constant,
        ];
        let visibilities = [Visibility::Public, Visibility::Protected, Visibility::Private];
        for (kind, visibility) in members.iter().cartesian_product(visibilities.iter()) {
            assert!(Filter::ALL.admits(*kind, *visibility));
        }

        let filter = Filter::METHODS_PUBLIC | Filter::PROPERTIES_PRIVATE;
        assert!(filter.admits(DeclarationKind::Method, Visibility::Public));
        assert!(!filter.admits(DeclarationKind::Method, Visibility::Private));
        assert!(filter.admits(DeclarationKind::Property, Visibility::Private));
        assert!(!filter.admits(DeclarationKind::Constant, Visibility::Public));

        // Non-members ignore the filter.
        for kind in [
            DeclarationKind::Class,
            DeclarationKind::Interface,
            DeclarationKind::Function,
        ] {
            assert!(Filter(0).admits(kind, Visibility::Private));
        }
    }

    #[test]
    fn test_parse_declaration() -> () {
        let document = parse_declaration(
            &method(Visibility::Public, Some("/** Does things. */")),
            Filter::METHODS_PUBLIC,
        )
        .unwrap()
        .unwrap();
        assert_eq!(document.description, Description::from("Does things."));

        assert_eq!(
            parse_declaration(
                &method(Visibility::Private, Some("/** Does things. */")),
                Filter::METHODS_PUBLIC
            ),
            Ok(None)
        );
        assert_eq!(
            parse_declaration(&method(Visibility::Public, None), Filter::ALL),
            Ok(Some(Document::default()))
        );
    }

    #[test]
    fn test_parse_declaration_errors() -> () {
        let internal = Declaration {
            name: "strlen",
            kind: DeclarationKind::Function,
            visibility: Visibility::Public,
            is_internal: true,
            doc_comment: None,
        };
        let err = parse_declaration(&internal, Filter::ALL).expect_err("");
        assert_eq!(err.to_string(), "cannot parse internal element \"strlen\"");

        match parse_declaration(&method(Visibility::Public, Some("/** @return */")), Filter::ALL) {
            Err(DeclarationError::Parse(ParseError::UnexpectedToken { text, .. })) => {
                assert_eq!(text, "*/")
            }
            other => panic!("{:?}", other),
        }
    }
}
