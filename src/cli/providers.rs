//! Providers command implementation

use crate::cli::output::{format_providers_json, format_providers_table};
use crate::cli::ProvidersArgs;
use crate::config::SwitchyardConfig;
use crate::registry::{ProviderDescriptor, ProviderView};

/// Handle providers command
///
/// Reads the catalog straight from config; no provider is contacted and no
/// API key is required.
pub fn handle_providers(
    args: &ProvidersArgs,
    config: &SwitchyardConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut descriptors: Vec<ProviderDescriptor> =
        config.providers.iter().map(ProviderDescriptor::from).collect();

    if let Some(ref model) = args.model {
        descriptors.retain(|d| d.serves(model));
        if descriptors.is_empty() {
            return Err(format!("No configured provider serves model '{}'", model).into());
        }
    }
    descriptors.sort_by_key(|d| d.priority);

    let views: Vec<ProviderView> = descriptors.iter().map(ProviderView::from).collect();

    if args.json {
        Ok(format_providers_json(&views)?)
    } else {
        Ok(format_providers_table(&views))
    }
}
