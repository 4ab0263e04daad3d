//! SQL text conventions per backend.

use querypage_core::traits::SqlDialect;

/// Relational backends whose conventions are known.
///
/// Only PostgreSQL has an executor; the others still drive compilation
/// and the field-wrapper table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Infer the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split_once("://").map(|(s, _)| s).unwrap_or(url);
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Positional placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${index}"),
            Self::MySql | Self::Sqlite => "?".to_string(),
        }
    }

    /// Quote a possibly schema-qualified relation name segment by segment.
    pub fn quote_relation(&self, relation: &str) -> String {
        relation
            .split('.')
            .map(|segment| self.quote_identifier(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn quote_char(&self) -> char {
        match self {
            Self::Postgres | Self::Sqlite => '"',
            Self::MySql => '`',
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    fn quote_identifier(&self, ident: &str) -> String {
        let q = self.quote_char();
        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(q);
        for ch in ident.chars() {
            if ch == q {
                quoted.push(q);
            }
            quoted.push(ch);
        }
        quoted.push(q);
        quoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(Dialect::from_url("postgres://u@h/db"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_url("postgresql://h/db"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_url("mysql://h/db"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_url("sqlite://data.db"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_url("oracle://h"), None);
    }

    #[test]
    fn test_quoting_doubles_embedded_quotes() {
        assert_eq!(Dialect::Postgres.quote_identifier("na\"me"), "\"na\"\"me\"");
        assert_eq!(Dialect::MySql.quote_identifier("na`me"), "`na``me`");
        assert_eq!(Dialect::Sqlite.quote_identifier("id"), "\"id\"");
    }

    #[test]
    fn test_quote_relation() {
        assert_eq!(
            Dialect::Postgres.quote_relation("public.articles"),
            "\"public\".\"articles\""
        );
    }

    #[test]
    fn test_names_key_wrapper_table() {
        assert_eq!(Dialect::Postgres.name(), "postgres");
        assert_eq!(Dialect::MySql.name(), "mysql");
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::Sqlite.placeholder(3), "?");
    }
}
