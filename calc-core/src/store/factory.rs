use std::collections::HashMap;

use async_trait::async_trait;

use super::key_value::{KeyValueStore, StoreError};

/// Which saved-results backend to open and how.
///
/// `connection_string` is handed to the backend untouched: `quota=4096` or
/// `disabled` for `memory`, a file path or `:memory:` for `sqlite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            connection_string: String::new(),
        }
    }
}

/// Opens stores of one backend.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn KeyValueStore>, StoreError>;
}

/// The backends a binary was built with.
#[derive(Default)]
pub struct StoreRegistry {
    factories: HashMap<&'static str, Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations under the same name win.
    pub fn register(
        &mut self,
        factory: Box<dyn StoreFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a store with the factory registered as `config.backend`.
    ///
    /// # Errors
    /// [`StoreError::Configuration`] for an unregistered backend, otherwise
    /// whatever the backend reports.
    pub async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn KeyValueStore>, StoreError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(StoreError::Configuration(format!(
                "no store backend named '{}' (registered: {})",
                config.backend,
                self.available_backends().join(", ")
            )));
        };
        factory.create(config).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStoreFactory;

    /// The memory backend published under another name.
    struct Alias(&'static str);

    #[async_trait]
    impl StoreFactory for Alias {
        fn backend_name(&self) -> &'static str {
            self.0
        }

        async fn create(
            &self,
            config: &StoreConfig,
        ) -> Result<Box<dyn KeyValueStore>, StoreError> {
            MemoryStoreFactory.create(config).await
        }
    }

    fn memory_registry() -> StoreRegistry {
        let mut registry = StoreRegistry::new();
        registry.register(Box::new(MemoryStoreFactory));
        registry
    }

    fn config(
        backend: &str,
        connection_string: &str,
    ) -> StoreConfig {
        StoreConfig {
            backend: backend.to_string(),
            connection_string: connection_string.to_string(),
        }
    }

    #[test]
    fn default_config_opens_an_unlimited_memory_store() {
        assert_eq!(StoreConfig::default(), config("memory", ""));
    }

    #[test]
    fn backends_are_listed_by_name() {
        let mut registry = memory_registry();
        registry.register(Box::new(Alias("cache")));
        registry.register(Box::new(Alias("scratch")));

        assert_eq!(registry.available_backends(), vec!["cache", "memory", "scratch"]);
        assert!(StoreRegistry::new().available_backends().is_empty());
    }

    #[tokio::test]
    async fn connection_string_reaches_the_backend() {
        let store = memory_registry()
            .create(&config("memory", "disabled"))
            .await
            .unwrap();

        assert!(matches!(
            store.set("k", "v").await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn reregistering_a_name_replaces_the_backend() {
        let mut registry = memory_registry();
        registry.register(Box::new(Alias("memory")));

        let store = registry.create(&config("memory", "")).await.unwrap();
        store.set("k", "v").await.unwrap();

        assert_eq!(registry.available_backends(), vec!["memory"]);
        assert_eq!(store.get("k").await, Ok(Some("v".to_string())));
    }

    #[tokio::test]
    async fn unregistered_backend_lists_the_registered_ones() {
        let err = memory_registry()
            .create(&config("redis", ""))
            .await
            .err();

        assert_eq!(
            err,
            Some(StoreError::Configuration(
                "no store backend named 'redis' (registered: memory)".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn backend_errors_pass_through() {
        let err = memory_registry()
            .create(&config("memory", "quota=lots"))
            .await
            .err();

        assert_eq!(
            err,
            Some(StoreError::Configuration(
                "invalid memory store option 'quota=lots'".to_string()
            ))
        );
    }
}
