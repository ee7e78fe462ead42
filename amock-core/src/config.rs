//! Process configuration: config file, environment overrides, and table sources.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::CoreError;

/// Files looked up, in order, when no explicit config path is given.
pub const CONFIG_FILES: &[&str] = &[
    ".amock.json",
    ".amockrc",
    ".amock.yml",
    ".amock.yaml",
    "amock.json",
    "amock.yml",
    "amock.yaml",
];

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory scanned for `*.json` raw schema documents.
    pub dir: Option<PathBuf>,
    /// Explicit raw schema document paths.
    pub entities: Vec<PathBuf>,
    pub init_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8080,
            dir: None,
            entities: Vec::new(),
            init_count: 20,
        }
    }
}

/// One table to hydrate: its name and the raw schema document it is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSource {
    pub name: String,
    pub definition: PathBuf,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        let parsed = if yaml {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| CoreError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// First known config file in `dir`, if any.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|p| p.is_file())
    }

    /// Load `explicit` if given, else the discovered file in the working directory, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CoreError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match Self::discover(".") {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using discovered config file");
                Self::from_path(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `AMOCK_*` overrides from an environment snapshot.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                "AMOCK_HOST" => self.host = value.to_string(),
                "AMOCK_PORT" => self.port = parse_env("AMOCK_PORT", value)?,
                "AMOCK_DIR" => self.dir = Some(PathBuf::from(value)),
                "AMOCK_ENTITIES" => {
                    self.entities = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(PathBuf::from)
                        .collect();
                }
                "AMOCK_INIT_COUNT" => self.init_count = parse_env("AMOCK_INIT_COUNT", value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply a `[scheme://]host[:port]` address given on the command line.
    pub fn apply_address(&mut self, address: &str) -> Result<(), CoreError> {
        let rest = address
            .strip_prefix("http://")
            .or_else(|| address.strip_prefix("https://"))
            .unwrap_or(address)
            .trim_end_matches('/');
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (rest, None),
        };
        if let Some(port) = port {
            self.port = port
                .parse()
                .map_err(|_| CoreError::Config(format!("invalid port in address {address:?}")))?;
        }
        if !host.is_empty() {
            self.host = host.to_string();
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Every raw schema document to load, named by lower-cased file stem.
    ///
    /// Directory entries come first in name order, then `entities` as listed.
    pub fn table_sources(&self) -> Result<Vec<TableSource>, CoreError> {
        let mut paths = Vec::new();
        if let Some(dir) = &self.dir {
            let entries = fs::read_dir(dir)
                .map_err(|e| CoreError::Config(format!("cannot read dir {}: {e}", dir.display())))?;
            let mut found = Vec::new();
            for entry in entries {
                let path = entry
                    .map_err(|e| CoreError::Config(format!("cannot read dir {}: {e}", dir.display())))?
                    .path();
                if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                    found.push(path);
                }
            }
            found.sort();
            paths.extend(found);
        }
        paths.extend(self.entities.iter().cloned());

        let mut by_name: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_lowercase)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| CoreError::Config(format!("cannot name a table after {}", path.display())))?;
            if let Some(previous) = by_name.insert(name.clone(), path.clone()) {
                return Err(CoreError::Config(format!(
                    "table {name} is defined by both {} and {}",
                    previous.display(),
                    path.display()
                )));
            }
            sources.push(TableSource { name, definition: path });
        }

        if sources.is_empty() {
            return Err(CoreError::Config(
                "no tables configured: set `dir` or `entities`".into(),
            ));
        }
        Ok(sources)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CoreError> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("{key}: cannot parse {value:?}")))
}
