//! SQL dialect conventions supplied by the data-access layer.

use std::fmt;

use convert_case::{Case, Casing};

/// Text conventions of one relational backend.
///
/// The compiler never hard-codes quoting, escaping, or joined-relation
/// naming; it asks the dialect of the executor it is compiling for.
pub trait SqlDialect: Send + Sync + fmt::Debug {
    /// Dialect identifier (`postgres`, `mysql`, `sqlite`, ...). Keys the
    /// field-wrapper template table.
    fn name(&self) -> &str;

    /// Quote a single identifier, escaping embedded quote characters.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Escape character that must be declared with `ESCAPE` on pattern
    /// matches, or `None` if the backend needs no declaration.
    fn like_escape(&self) -> Option<char> {
        Some('\\')
    }

    /// Rewrite the relation segment of a dotted column reference into the
    /// alias naming the backend uses for joined relations.
    fn relation_alias(&self, segment: &str) -> String {
        segment.to_case(Case::Pascal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Plain;

    impl SqlDialect for Plain {
        fn name(&self) -> &str {
            "plain"
        }

        fn quote_identifier(&self, ident: &str) -> String {
            ident.to_string()
        }
    }

    #[test]
    fn test_default_relation_alias_is_upper_camel() {
        assert_eq!(Plain.relation_alias("user"), "User");
        assert_eq!(Plain.relation_alias("order_item"), "OrderItem");
    }

    #[test]
    fn test_default_escape_is_backslash() {
        assert_eq!(Plain.like_escape(), Some('\\'));
    }
}
