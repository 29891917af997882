//! Provider factory.

use super::{openai::OpenAICompatibleProvider, Provider, ProviderError};
use crate::config::ProviderConfig;
use crate::registry::{ProviderDescriptor, ProviderEntry, ProviderType};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Create the adapter for one configured provider.
///
/// The API key is read from the environment variable named by
/// `api_key_env`. The OpenAI cloud type refuses to start without one.
///
/// # Examples
///
/// ```
/// use switchyard::config::ProviderConfig;
/// use switchyard::provider::create_provider;
/// use std::sync::Arc;
///
/// let config: ProviderConfig = toml::from_str(
///     "name = \"local\"\nurl = \"http://localhost:8080\"\nmodels = [\"llama3\"]",
/// ).unwrap();
/// let provider = create_provider(&config, Arc::new(reqwest::Client::new())).unwrap();
/// assert_eq!(provider.name(), "local");
/// ```
pub fn create_provider(
    config: &ProviderConfig,
    client: Arc<Client>,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = match &config.api_key_env {
        Some(env_var) => match std::env::var(env_var) {
            Ok(key) if !key.is_empty() => Some(key),
            _ => None,
        },
        None => None,
    };

    if config.provider_type == ProviderType::OpenAI && api_key.is_none() {
        return Err(ProviderError::Configuration(format!(
            "provider '{}' of type openai requires an API key in the environment variable named by 'api_key_env'",
            config.name
        )));
    }

    Ok(Arc::new(OpenAICompatibleProvider::new(
        config.name.clone(),
        config.url.clone(),
        api_key,
        Duration::from_secs(config.timeout_seconds),
        client,
    )))
}

/// Build registry entries for every configured provider.
pub fn build_entries(
    configs: &[ProviderConfig],
    client: Arc<Client>,
) -> Result<Vec<ProviderEntry>, ProviderError> {
    configs
        .iter()
        .map(|config| {
            let provider = create_provider(config, Arc::clone(&client))?;
            Ok(ProviderEntry::new(ProviderDescriptor::from(config), provider))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml: &str) -> ProviderConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_generic_provider_without_key() {
        let cfg = config("name = \"vllm\"\nurl = \"http://gpu:8000/\"\nmodels = [\"m\"]");
        let provider = create_provider(&cfg, Arc::new(Client::new())).unwrap();
        assert_eq!(provider.name(), "vllm");
    }

    #[test]
    fn test_openai_provider_requires_key() {
        let cfg = config(
            "name = \"openai\"\nurl = \"https://api.openai.com\"\ntype = \"openai\"\nmodels = [\"gpt-4o\"]\napi_key_env = \"SWITCHYARD_TEST_MISSING_KEY\"",
        );
        let result = create_provider(&cfg, Arc::new(Client::new()));
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_openai_provider_reads_key_from_env() {
        std::env::set_var("SWITCHYARD_TEST_FACTORY_KEY", "sk-test");
        let cfg = config(
            "name = \"openai\"\nurl = \"https://api.openai.com\"\ntype = \"openai\"\nmodels = [\"gpt-4o\"]\napi_key_env = \"SWITCHYARD_TEST_FACTORY_KEY\"",
        );
        let result = create_provider(&cfg, Arc::new(Client::new()));
        std::env::remove_var("SWITCHYARD_TEST_FACTORY_KEY");
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_entries_pairs_descriptors() {
        let configs = vec![
            config("name = \"a\"\nurl = \"http://a/\"\nmodels = [\"m\"]\npriority = 2"),
            config("name = \"b\"\nurl = \"http://b\"\nmodels = [\"m\"]\nretry_delay_ms = 250"),
        ];
        let entries = build_entries(&configs, Arc::new(Client::new())).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].descriptor.base_url, "http://a");
        assert_eq!(entries[0].descriptor.priority, 2);
        assert_eq!(
            entries[1].descriptor.retry_delay,
            Some(Duration::from_millis(250))
        );
        assert_eq!(entries[1].provider.name(), "b");
    }
}
