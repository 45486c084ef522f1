use crate::prelude::*;
use crate::features::api::fetch_to_temp;
use crate::loaders::xml_loader::{parse_xml_file, XmlParseConfig};
use url::Url;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Local(PathBuf),
    Remote(Url),
}

impl FeedLocation {
    /// `http`/`https` URLs are remote, `file://` URLs become their path and
    /// anything else is taken as a local path (`C:\feeds\a.xml` included).
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => FeedLocation::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => FeedLocation::Local(path),
                Err(()) => FeedLocation::Local(PathBuf::from(location)),
            },
            _ => FeedLocation::Local(PathBuf::from(location)),
        }
    }
}

impl fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLocation::Local(path) => write!(f, "{}", path.display()),
            FeedLocation::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Resolves a location to a parsed `Document`.
#[derive(Debug, Clone)]
pub struct FeedLoader {
    parse_config: XmlParseConfig,
    fetch_timeout: Duration,
}

impl Default for FeedLoader {
    fn default() -> Self {
        Self::new(XmlParseConfig::default(), DEFAULT_FETCH_TIMEOUT)
    }
}

impl FeedLoader {
    pub fn new(parse_config: XmlParseConfig, fetch_timeout: Duration) -> Self {
        Self {
            parse_config,
            fetch_timeout,
        }
    }

    pub async fn load(&self, location: &str) -> FeedResult<Document> {
        let location = FeedLocation::parse(location);

        let result = match &location {
            FeedLocation::Local(path) => self.load_path(path),
            FeedLocation::Remote(url) => self.load_remote(url).await,
        };

        match &result {
            Ok(doc) => info!(
                "Loaded {} records under <{}> from {}",
                doc.len(),
                doc.root_name(),
                location
            ),
            Err(e) => error!("Failed to load feed from {}: {}", location, e.detail()),
        }

        result
    }

    /// Parses a local file; a missing path is `NotFound` and never reaches the parser.
    pub fn load_path(&self, path: &Path) -> FeedResult<Document> {
        if !path.exists() {
            return Err(FeedError::NotFound {
                location: path.display().to_string(),
                reason: "File does not exist".to_string(),
            });
        }
        if path.is_dir() {
            return Err(FeedError::NotFound {
                location: path.display().to_string(),
                reason: "Path is a directory, not a file".to_string(),
            });
        }

        parse_xml_file(path, &self.parse_config)
    }

    async fn load_remote(&self, url: &Url) -> FeedResult<Document> {
        let download = fetch_to_temp(url, self.fetch_timeout).await?;
        debug!("Parsing downloaded feed {}", download.path().display());

        // report the URL rather than the temp path, which is gone after this call
        parse_xml_file(download.path(), &self.parse_config).map_err(|e| match e {
            FeedError::InvalidFormat { diagnostics, .. } => FeedError::InvalidFormat {
                path: url.to_string(),
                diagnostics,
            },
            other => other,
        })
    }
}
