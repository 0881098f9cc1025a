//! Download catalog for the premake5 generator
//!
//! Maps a platform to the archive that carries the generator and the name of
//! the executable inside it. Only Windows ships in the built-in table; other
//! platforms can be added from `bootstrap.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

pub const PREMAKE_VERSION: &str = "5.0.0-beta7";

const WINDOWS_URL: &str = "https://github.com/premake/premake-core/releases/download/v5.0.0-beta7/premake-5.0.0-beta7-windows.zip";

/// Operating system identifier, named the way `std::env::consts::OS` does
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other(String),
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        Self::from(std::env::consts::OS)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Other(name) => name,
        }
    }

    /// Executable name used when the catalog has no entry for this platform
    pub fn default_executable(&self) -> &'static str {
        match self {
            Self::Windows => "premake5.exe",
            _ => "premake5",
        }
    }
}

impl From<&str> for Platform {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "macos" | "darwin" => Self::MacOs,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// Where to fetch the generator for one platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolSource {
    pub url: String,
    pub executable: String,
}

impl ToolSource {
    pub fn new(url: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            executable: executable.into(),
        }
    }

    /// File name of the archive, taken from the last URL path segment
    pub fn archive_name(&self) -> String {
        reqwest::Url::parse(&self.url)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("premake-{PREMAKE_VERSION}.zip"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCatalog {
    sources: BTreeMap<Platform, ToolSource>,
}

impl ToolCatalog {
    /// Table shipped with the binary
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.insert(
            Platform::Windows,
            ToolSource::new(WINDOWS_URL, Platform::Windows.default_executable()),
        );
        catalog
    }

    /// Adds or replaces the entry for `platform`
    pub fn insert(&mut self, platform: Platform, source: ToolSource) {
        self.sources.insert(platform, source);
    }

    pub fn lookup(&self, platform: &Platform) -> Option<&ToolSource> {
        self.sources.get(platform)
    }

    /// Executable name for `platform`, falling back to the conventional name
    pub fn executable_for(&self, platform: &Platform) -> String {
        self.lookup(platform).map_or_else(
            || platform.default_executable().to_string(),
            |source| source.executable.clone(),
        )
    }

    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.sources.keys()
    }
}
