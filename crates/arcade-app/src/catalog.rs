//! Symbol catalogs for the memory game.
//!
//! A catalog maps category keys to the ordered symbol tokens the board generator
//! draws from. Catalogs come from a [`CategoryProvider`]; when the provider cannot
//! deliver one, [`load_catalog`] substitutes [`CategoryCatalog::fallback`] so a
//! game can always start.

use std::{
    fmt,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use arcade_core::Symbol;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap as _,
};

/// Key of the category in the fallback catalog.
pub const FALLBACK_CATEGORY: &str = "fallback";

/// Symbols of the fallback category.
pub const FALLBACK_SYMBOLS: [&str; 8] = ["❌", "❓", "❕", "⚠️", "⛔", "🚫", "🛑", "🚨"];

/// Category keys mapped to their symbols, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    entries: Vec<(String, Vec<Symbol>)>,
}

impl CategoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the catalog used when no provider is available.
    #[must_use]
    pub fn fallback() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            FALLBACK_CATEGORY,
            FALLBACK_SYMBOLS.into_iter().map(Symbol::from).collect(),
        );
        catalog
    }

    /// Adds a category, replacing the symbols of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, symbols: Vec<Symbol>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = symbols,
            None => self.entries.push((key, symbols)),
        }
    }

    /// Returns the number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` names a category.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the symbols of a category.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Symbol]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, symbols)| symbols.as_slice())
    }

    /// Iterates over the category keys in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Picks the category a new memory session starts with.
    ///
    /// This is `preferred` when the catalog has it, otherwise the first category.
    #[must_use]
    pub fn initial_category(&self, preferred: &str) -> Option<&str> {
        if self.contains(preferred) {
            return self.keys().find(|key| *key == preferred);
        }
        self.keys().next()
    }
}

impl Serialize for CategoryCatalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, symbols) in &self.entries {
            map.serialize_entry(key, symbols)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = CategoryCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from category keys to symbol lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut catalog = CategoryCatalog::new();
                while let Some((key, symbols)) = map.next_entry::<String, Vec<Symbol>>()? {
                    catalog.insert(key, symbols);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Errors returned by a [`CategoryProvider`].
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CatalogError {
    /// The catalog source could not be read.
    #[display("failed to read catalog: {_0}")]
    Io(#[from] io::Error),
    /// The catalog payload is not valid JSON of the expected shape.
    #[display("malformed catalog: {_0}")]
    Json(#[from] serde_json::Error),
    /// The payload reported an unsuccessful response.
    #[display("catalog source reported failure")]
    Unsuccessful,
    /// The payload contained no categories.
    #[display("catalog has no categories")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    Envelope {
        success: bool,
        #[serde(default)]
        data: Option<CategoryCatalog>,
    },
    Bare(CategoryCatalog),
}

impl CatalogPayload {
    fn into_catalog(self) -> Result<CategoryCatalog, CatalogError> {
        let catalog = match self {
            Self::Envelope { success: false, .. } => return Err(CatalogError::Unsuccessful),
            Self::Envelope { data, .. } => data.unwrap_or_default(),
            Self::Bare(catalog) => catalog,
        };
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }
}

/// Parses a catalog payload.
///
/// Accepts either a response envelope `{ "success": true, "data": { .. } }` or a
/// bare map from category keys to symbol lists.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, the envelope reports failure, or
/// the catalog has no categories.
pub fn parse_catalog(json: &str) -> Result<CategoryCatalog, CatalogError> {
    serde_json::from_str::<CatalogPayload>(json)?.into_catalog()
}

/// A source of category catalogs.
pub trait CategoryProvider {
    /// Fetches the current catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is unavailable.
    fn fetch(&self) -> Result<CategoryCatalog, CatalogError>;
}

/// A provider that always returns the same in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider(CategoryCatalog);

impl StaticProvider {
    /// Creates a provider for `catalog`.
    #[must_use]
    pub fn new(catalog: CategoryCatalog) -> Self {
        Self(catalog)
    }
}

impl CategoryProvider for StaticProvider {
    fn fetch(&self) -> Result<CategoryCatalog, CatalogError> {
        if self.0.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(self.0.clone())
    }
}

/// A provider that reads a JSON catalog payload from a file.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    /// Creates a provider reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CategoryProvider for JsonFileProvider {
    fn fetch(&self) -> Result<CategoryCatalog, CatalogError> {
        let reader = BufReader::new(File::open(&self.path)?);
        serde_json::from_reader::<_, CatalogPayload>(reader)?.into_catalog()
    }
}

/// Fetches a catalog from `provider`, falling back to
/// [`CategoryCatalog::fallback`] when it is unavailable.
pub fn load_catalog<P>(provider: &P) -> CategoryCatalog
where
    P: CategoryProvider + ?Sized,
{
    match provider.fetch() {
        Ok(catalog) => {
            log::debug!("loaded category catalog with {} categories", catalog.len());
            catalog
        }
        Err(err) => {
            log::warn!("category catalog unavailable, using fallback: {err}");
            CategoryCatalog::fallback()
        }
    }
}
