use crate::prelude::*;

/// Separator between element names in a dotted path
pub const PATH_SEPARATOR: char = '.';
/// Names starting with this marker are attributes, not columns
pub const ATTRIBUTE_MARKER: char = '@';
/// Identity column every created table carries
pub const IDENTITY_COLUMN: &str = "id";
pub const POSITIONAL_PREFIX: &str = "col_";

lazy_static! {
    static ref INVALID_IDENTIFIER_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_]")
        .expect("Failed to compile identifier character regex");

    static ref LEADING_NON_LETTERS: Regex = Regex::new(r"^[^A-Za-z]+")
        .expect("Failed to compile leading character regex");

    pub static ref STORAGE_IDENTIFIER_PATTERN: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$")
        .expect("Failed to compile storage identifier regex");
}

/// Joins a parent path and a child name: `images` + `url` -> `images.url`
pub fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}{}{}", prefix, PATH_SEPARATOR, name),
        None => name.to_string(),
    }
}

/// Derives a storage identifier from a dotted path.
///
/// Keeps the part after the last separator, drops characters outside
/// `[A-Za-z0-9_]` and then any leading run of non-letters.
pub fn sanitize_storage_name(path: &str) -> FeedResult<String> {
    let last_segment = match path.rfind(PATH_SEPARATOR) {
        Some(idx) => &path[idx + PATH_SEPARATOR.len_utf8()..],
        None => path,
    };

    let cleaned = INVALID_IDENTIFIER_CHARS.replace_all(last_segment, "");
    let cleaned = LEADING_NON_LETTERS.replace(&cleaned, "");

    if cleaned.is_empty() {
        return Err(FeedError::InvalidColumnName {
            path: path.to_string(),
        });
    }

    Ok(cleaned.into_owned())
}

pub fn is_storage_identifier(name: &str) -> bool {
    STORAGE_IDENTIFIER_PATTERN.is_match(name)
}

/// 1-based positional column name
pub fn positional_name(index: usize) -> String {
    format!("{}{}", POSITIONAL_PREFIX, index + 1)
}

/// Hands out unique storage names.
///
/// Names compare case-insensitively (MySQL column names do) and the identity
/// column is taken from the start. The first claim of a name keeps it; later
/// claims get `_2`, `_3`, ... using the first suffix still free.
#[derive(Debug)]
pub struct ColumnNameResolver {
    taken: HashSet<String>,
}

impl ColumnNameResolver {
    pub fn new() -> Self {
        let mut taken = HashSet::new();
        taken.insert(IDENTITY_COLUMN.to_string());
        Self { taken }
    }

    pub fn resolve(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_lowercase()) {
            return base.to_string();
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            if self.taken.insert(candidate.to_lowercase()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

impl Default for ColumnNameResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_last_segment() {
        assert_eq!(sanitize_storage_name("price").unwrap(), "price");
        assert_eq!(sanitize_storage_name("images.image.url").unwrap(), "url");
        assert_eq!(sanitize_storage_name("CategoryName").unwrap(), "CategoryName");
    }

    #[test]
    fn test_sanitize_strips_invalid_and_leading_characters() {
        assert_eq!(sanitize_storage_name("meta.is-k-cup").unwrap(), "iskcup");
        assert_eq!(sanitize_storage_name("_2nd_price").unwrap(), "nd_price");
        assert_eq!(sanitize_storage_name("ns:title").unwrap(), "nstitle");
        assert_eq!(sanitize_storage_name("größe").unwrap(), "gre");
    }

    #[test]
    fn test_sanitize_rejects_empty_results() {
        assert!(matches!(
            sanitize_storage_name("images.image.0"),
            Err(FeedError::InvalidColumnName { path }) if path == "images.image.0"
        ));
        assert!(sanitize_storage_name("___").is_err());
        assert!(sanitize_storage_name("a.").is_err());
    }

    #[test]
    fn test_sanitized_names_are_identifiers() {
        for path in ["x.Brand", "a.b.c_d", "9lives", "$price", "item.Is KCup"] {
            let name = sanitize_storage_name(path).unwrap();
            assert!(is_storage_identifier(&name), "{} -> {}", path, name);
        }
    }

    #[test]
    fn test_positional_names_are_one_based() {
        assert_eq!(positional_name(0), "col_1");
        assert_eq!(positional_name(17), "col_18");
    }

    #[test]
    fn test_resolver_suffixes_duplicates() {
        let mut resolver = ColumnNameResolver::new();
        assert_eq!(resolver.resolve("url"), "url");
        assert_eq!(resolver.resolve("url"), "url_2");
        assert_eq!(resolver.resolve("URL"), "URL_3");
        assert_eq!(resolver.resolve("sku"), "sku");
    }

    #[test]
    fn test_resolver_reserves_identity_column() {
        let mut resolver = ColumnNameResolver::new();
        assert_eq!(resolver.resolve("id"), "id_2");
        assert_eq!(resolver.resolve("Id"), "Id_3");
    }

    #[test]
    fn test_resolver_skips_suffixes_already_claimed() {
        let mut resolver = ColumnNameResolver::new();
        assert_eq!(resolver.resolve("tag_2"), "tag_2");
        assert_eq!(resolver.resolve("tag"), "tag");
        assert_eq!(resolver.resolve("tag"), "tag_3");
    }
}
