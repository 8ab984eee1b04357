//! Looking up algorithms by name.
use std::collections::BTreeMap;

use crate::algorithm::Algorithm;
use crate::codec::SymbolReader;
use crate::error::{Error, Result};
use crate::{Lz77, Lzw};

type Factory = Box<dyn Fn() -> Box<dyn Algorithm> + Send + Sync>;

/// A table of algorithm constructors keyed by algorithm name.
///
/// The default registry knows `lz77` and `lzw` with their default parameters.
pub struct Registry {
    factories: BTreeMap<String, Factory>,
}

impl Registry {
    /// A registry without any algorithm.
    pub fn empty() -> Self {
        Registry {
            factories: BTreeMap::new(),
        }
    }

    /// Make `factory` available under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Algorithm> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(Error::DuplicateAlgorithm(name.to_owned()));
        }
        self.factories.insert(name.to_owned(), self::factory(factory));
        Ok(())
    }

    /// Construct the algorithm registered under `name`.
    pub fn get(&self, name: &str) -> Result<Box<dyn Algorithm>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_owned()))
    }

    /// Construct the algorithm a symbol stream declares.
    pub fn for_reader(&self, reader: &dyn SymbolReader) -> Result<Box<dyn Algorithm>> {
        let name = reader.algorithm().ok_or(Error::MissingAlgorithm)?;
        self.get(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut factories = BTreeMap::new();
        factories.insert(Lz77::NAME.to_owned(), factory(|| Box::new(Lz77::new())));
        factories.insert(Lzw::NAME.to_owned(), factory(|| Box::new(Lzw::new())));
        Registry { factories }
    }
}

fn factory<F>(f: F) -> Factory
where
    F: Fn() -> Box<dyn Algorithm> + Send + Sync + 'static,
{
    Box::new(f)
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::codec::SymbolSlice;
    use crate::{Algorithm, Error, Lzw, Symbol};

    #[test]
    fn knows_the_builtin_algorithms() {
        let registry = Registry::default();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["lz77", "lzw"]);
        assert_eq!(registry.get("lz77").unwrap().name(), "lz77");
        assert_eq!(registry.get("lzw").unwrap().name(), "lzw");
        assert!(matches!(registry.get("zip"), Err(Error::UnknownAlgorithm(ref name)) if name == "zip"));
    }

    #[test]
    fn custom_algorithms() {
        let mut registry = Registry::empty();
        assert_eq!(registry.names().count(), 0);
        registry
            .register("lzw", || Box::new(Lzw::with_max_entries(512).unwrap()))
            .unwrap();
        assert!(matches!(
            registry.register("lzw", || Box::new(Lzw::new())),
            Err(Error::DuplicateAlgorithm(_))
        ));

        let data = vec![7u8; 5000];
        let symbols = registry.get("lzw").unwrap().compress_to_vec(&data).unwrap();
        let restored = Lzw::with_max_entries(512).unwrap().decompress_to_vec(&symbols).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn selects_by_stream_tag() {
        let registry = Registry::default();
        let symbols = [Symbol::Literal(b'x')];

        let tagged = SymbolSlice::tagged("lz77", &symbols);
        assert_eq!(registry.for_reader(&tagged).unwrap().name(), "lz77");

        let untagged = SymbolSlice::untagged(&symbols);
        assert!(matches!(registry.for_reader(&untagged), Err(Error::MissingAlgorithm)));

        let unknown = SymbolSlice::tagged("lzma", &symbols);
        assert!(matches!(registry.for_reader(&unknown), Err(Error::UnknownAlgorithm(_))));
    }
}
