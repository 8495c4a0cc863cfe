//! Bidirectional type table between abstract and SQL Anywhere physical types.
//!
//! The two directions are deliberately not inverses: several physical types
//! collapse onto one abstract type, while every abstract type expands to a
//! single canonical declaration.

use crate::core::schema::AbstractType;

/// Physical type name → abstract type, used by introspection.
///
/// Multi-word engine domain names are matched whole before falling back to
/// their first word.
pub const PHYSICAL_TO_ABSTRACT: &[(&str, AbstractType)] = &[
    // exact numbers
    ("bigint", AbstractType::Bigint),
    ("unsigned bigint", AbstractType::Bigint),
    ("numeric", AbstractType::Decimal),
    ("bit", AbstractType::Smallint),
    ("smallint", AbstractType::Smallint),
    ("unsigned smallint", AbstractType::Smallint),
    ("decimal", AbstractType::Decimal),
    ("integer", AbstractType::Integer),
    ("int", AbstractType::Integer),
    ("unsigned int", AbstractType::Integer),
    ("tinyint", AbstractType::Smallint),
    ("money", AbstractType::Money),
    ("smallmoney", AbstractType::Money),
    // approximate numbers
    ("float", AbstractType::Float),
    ("real", AbstractType::Float),
    ("double", AbstractType::Double),
    // date and time
    ("date", AbstractType::Date),
    ("time", AbstractType::Time),
    ("datetime", AbstractType::Datetime),
    ("smalldatetime", AbstractType::Datetime),
    ("timestamp", AbstractType::Timestamp),
    ("timestamp with time zone", AbstractType::Timestamp),
    // character strings
    ("char", AbstractType::Char),
    ("varchar", AbstractType::String),
    ("text", AbstractType::Text),
    ("long varchar", AbstractType::Text),
    // unicode character strings
    ("nchar", AbstractType::Char),
    ("nvarchar", AbstractType::String),
    ("ntext", AbstractType::Text),
    ("long nvarchar", AbstractType::Text),
    // binary strings
    ("binary", AbstractType::Binary),
    ("varbinary", AbstractType::Binary),
    ("long binary", AbstractType::Binary),
    ("image", AbstractType::Binary),
    // other data types
    ("uniqueidentifier", AbstractType::String),
    ("uniqueidentifierstr", AbstractType::String),
    ("xml", AbstractType::Text),
];

/// Canonical physical declaration for an abstract type.
pub fn abstract_to_physical(t: AbstractType) -> &'static str {
    match t {
        AbstractType::Pk | AbstractType::Upk => "integer IDENTITY PRIMARY KEY",
        AbstractType::Bigpk | AbstractType::Ubigpk => "bigint IDENTITY PRIMARY KEY",
        AbstractType::Char => "nchar(1)",
        AbstractType::String => "nvarchar(255)",
        AbstractType::Text => "ntext",
        AbstractType::Smallint => "smallint",
        AbstractType::Integer => "integer",
        AbstractType::Bigint => "bigint",
        AbstractType::Float | AbstractType::Double => "float",
        AbstractType::Decimal => "decimal",
        AbstractType::Datetime => "datetime",
        AbstractType::Timestamp => "timestamp",
        AbstractType::Time => "time",
        AbstractType::Date => "date",
        AbstractType::Binary => "binary(1)",
        AbstractType::Boolean => "bit",
        AbstractType::Money => "decimal(19,4)",
    }
}

/// Abstract type for a physical type name; unknown names fall back to `string`.
pub fn physical_to_abstract(name: &str) -> AbstractType {
    lookup_physical(name).unwrap_or(AbstractType::String)
}

fn lookup_physical(name: &str) -> Option<AbstractType> {
    let lower = name.trim().to_ascii_lowercase();
    PHYSICAL_TO_ABSTRACT
        .iter()
        .find(|(physical, _)| *physical == lower)
        .map(|(_, t)| *t)
}

/// A physical type string split into its name and parenthesized arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalType {
    /// Lowercased type name that matched the table (or the first word when nothing matched).
    pub name: String,
    /// Comma-separated arguments, empty when there were none.
    pub args: Vec<String>,
    /// Whether the name mentions `unsigned`.
    pub unsigned: bool,
}

impl PhysicalType {
    /// Parse `<typeName>(<args>)?`, ignoring anything after the closing parenthesis.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (head, args) = match raw.find('(') {
            Some(open) => {
                let rest = &raw[open + 1..];
                let inner = rest.find(')').map_or(rest, |close| &rest[..close]);
                (&raw[..open], split_args(inner))
            }
            None => (raw, Vec::new()),
        };

        let full = head.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();
        let name = if lookup_physical(&full).is_some() {
            full.clone()
        } else {
            full.chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect()
        };

        Self {
            name,
            args,
            unsigned: full.contains("unsigned"),
        }
    }

    /// Abstract type of the parsed name.
    pub fn abstract_type(&self) -> AbstractType {
        physical_to_abstract(&self.name)
    }
}

fn split_args(inner: &str) -> Vec<String> {
    let inner = inner.trim();
    // An empty or literal "0" argument list counts as no arguments.
    if inner.is_empty() || inner == "0" {
        return Vec::new();
    }
    inner.split(',').map(|a| a.trim().to_string()).collect()
}

/// Convert a column type specification into a physical declaration.
///
/// - `string` → `nvarchar(255)`
/// - `string(64)` → `nvarchar(64)`
/// - `string NOT NULL` → `nvarchar(255) NOT NULL`
/// - anything not starting with an abstract type name passes through unchanged
pub fn column_type(spec: &str) -> String {
    let spec_trim = spec.trim();
    if let Ok(t) = spec_trim.parse::<AbstractType>() {
        return abstract_to_physical(t).to_string();
    }

    let word_end = spec_trim
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(spec_trim.len());
    let (word, rest) = spec_trim.split_at(word_end);
    let Ok(t) = word.parse::<AbstractType>() else {
        return spec.to_string();
    };
    let canonical = abstract_to_physical(t);

    if let Some(after_open) = rest.strip_prefix('(') {
        let Some(close) = after_open.find(')') else {
            return spec.to_string();
        };
        let args = &after_open[..close];
        let suffix = &after_open[close + 1..];
        let base = match canonical.find('(') {
            Some(open) => format!("{}({})", &canonical[..open], args),
            None if accepts_arguments(t) => format!("{}({})", canonical, args),
            None => canonical.to_string(),
        };
        return format!("{}{}", base, suffix);
    }

    if rest.starts_with(char::is_whitespace) {
        return format!("{}{}", canonical, rest);
    }

    spec.to_string()
}

fn accepts_arguments(t: AbstractType) -> bool {
    matches!(
        t,
        AbstractType::String
            | AbstractType::Char
            | AbstractType::Binary
            | AbstractType::Decimal
            | AbstractType::Money
    )
}

/// Type table handle for callers that prefer a value over free functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMap;

impl TypeMap {
    /// Create a type map handle.
    pub fn new() -> Self {
        Self
    }

    /// Abstract type for a physical type name.
    pub fn to_abstract(&self, physical: &str) -> AbstractType {
        physical_to_abstract(physical)
    }

    /// Canonical physical declaration for an abstract type.
    pub fn to_physical(&self, t: AbstractType) -> &'static str {
        abstract_to_physical(t)
    }

    /// Physical declaration for an abstract or raw column type specification.
    pub fn column_type(&self, spec: &str) -> String {
        column_type(spec)
    }

    /// All abstract → physical pairs in declaration order.
    pub fn declarations(&self) -> impl Iterator<Item = (AbstractType, &'static str)> {
        AbstractType::ALL
            .into_iter()
            .map(|t| (t, abstract_to_physical(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_lookup() {
        assert_eq!(physical_to_abstract("nvarchar"), AbstractType::String);
        assert_eq!(physical_to_abstract("INTEGER"), AbstractType::Integer);
        assert_eq!(physical_to_abstract("bit"), AbstractType::Smallint);
        assert_eq!(physical_to_abstract("long nvarchar"), AbstractType::Text);
        assert_eq!(physical_to_abstract("timestamp"), AbstractType::Timestamp);
    }

    #[test]
    fn test_unknown_physical_falls_back_to_string() {
        assert_eq!(physical_to_abstract("st_geometry"), AbstractType::String);
        assert_eq!(physical_to_abstract(""), AbstractType::String);
    }

    #[test]
    fn test_identity_declarations() {
        assert_eq!(abstract_to_physical(AbstractType::Pk), "integer IDENTITY PRIMARY KEY");
        assert_eq!(abstract_to_physical(AbstractType::Upk), "integer IDENTITY PRIMARY KEY");
        assert_eq!(abstract_to_physical(AbstractType::Bigpk), "bigint IDENTITY PRIMARY KEY");
        assert_eq!(abstract_to_physical(AbstractType::Money), "decimal(19,4)");
        assert_eq!(abstract_to_physical(AbstractType::Boolean), "bit");
    }

    #[test]
    fn test_round_trip_for_simple_types() {
        // Identity shorthands, boolean (width narrowing), and the collapsing
        // pairs double→float and money→decimal are not expected to round-trip.
        let excluded = [
            AbstractType::Pk,
            AbstractType::Upk,
            AbstractType::Bigpk,
            AbstractType::Ubigpk,
            AbstractType::Boolean,
            AbstractType::Double,
            AbstractType::Money,
        ];
        for t in AbstractType::ALL.into_iter().filter(|t| !excluded.contains(t)) {
            let physical = abstract_to_physical(t);
            let parsed = PhysicalType::parse(physical);
            assert_eq!(parsed.abstract_type(), t, "{} -> {}", t, physical);
        }
    }

    #[test]
    fn test_parse_with_arguments() {
        let parsed = PhysicalType::parse("decimal(19,4)");
        assert_eq!(parsed.name, "decimal");
        assert_eq!(parsed.args, vec!["19", "4"]);
        assert!(!parsed.unsigned);
    }

    #[test]
    fn test_parse_multi_word_domain() {
        let parsed = PhysicalType::parse("unsigned int(4)");
        assert_eq!(parsed.name, "unsigned int");
        assert_eq!(parsed.args, vec!["4"]);
        assert!(parsed.unsigned);
        assert_eq!(parsed.abstract_type(), AbstractType::Integer);

        let parsed = PhysicalType::parse("long varchar(32767)");
        assert_eq!(parsed.abstract_type(), AbstractType::Text);
    }

    #[test]
    fn test_parse_unknown_multi_word_uses_first_word() {
        let parsed = PhysicalType::parse("varchar character set utf8(10)");
        assert_eq!(parsed.name, "varchar");
        assert_eq!(parsed.abstract_type(), AbstractType::String);
    }

    #[test]
    fn test_parse_zero_argument_is_empty() {
        assert!(PhysicalType::parse("bit(0)").args.is_empty());
        assert!(PhysicalType::parse("date").args.is_empty());
    }

    #[test]
    fn test_column_type_plain_and_suffix() {
        assert_eq!(column_type("string"), "nvarchar(255)");
        assert_eq!(column_type("string NOT NULL"), "nvarchar(255) NOT NULL");
        assert_eq!(column_type("pk"), "integer IDENTITY PRIMARY KEY");
    }

    #[test]
    fn test_column_type_with_length() {
        assert_eq!(column_type("string(64)"), "nvarchar(64)");
        assert_eq!(column_type("string(64) NOT NULL"), "nvarchar(64) NOT NULL");
        assert_eq!(column_type("decimal(10,2)"), "decimal(10,2)");
        assert_eq!(column_type("money(12,2)"), "decimal(12,2)");
        assert_eq!(column_type("integer(11)"), "integer");
    }

    #[test]
    fn test_column_type_passthrough() {
        assert_eq!(column_type("varchar(40)"), "varchar(40)");
        assert_eq!(column_type("long varchar"), "long varchar");
        assert_eq!(column_type("stringy"), "stringy");
    }

    #[test]
    fn test_type_map_declarations_cover_all_types() {
        let map = TypeMap::new();
        assert_eq!(map.declarations().count(), AbstractType::ALL.len());
        assert_eq!(map.to_physical(AbstractType::Text), "ntext");
        assert_eq!(map.to_abstract("ntext"), AbstractType::Text);
        assert_eq!(map.column_type("text NULL"), "ntext NULL");
    }
}
