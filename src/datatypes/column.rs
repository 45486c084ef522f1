use crate::prelude::*;

/// A discovered column: where it came from and what the table calls it.
///
/// In header mode `discovered_name` is the dotted path of the leaf
/// (`images.image.url`); in positional mode it is the positional name itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub discovered_name: String,
    pub storage_name: String,
}

impl Column {
    pub fn new(discovered_name: impl Into<String>, storage_name: impl Into<String>) -> Self {
        Self {
            discovered_name: discovered_name.into(),
            storage_name: storage_name.into(),
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            discovered_name: name.clone(),
            storage_name: name,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.discovered_name == self.storage_name {
            write!(f, "{}", self.storage_name)
        } else {
            write!(f, "{} -> {}", self.discovered_name, self.storage_name)
        }
    }
}

/// Storage names in schema order
pub fn storage_names(columns: &[Column]) -> Vec<String> {
    columns.iter().map(|c| c.storage_name.clone()).collect()
}
