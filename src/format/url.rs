//! URL output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::geo::AddressInfo;

/// URL formatter - outputs a map URL for the address position
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format URL with optional provider override
    pub fn format_with_provider(
        &self,
        address: &AddressInfo,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        config.format_url(provider, address.latitude, address.longitude)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the address position"
    }

    fn format(&self, address: &AddressInfo, config: &Config) -> Result<String> {
        self.format_with_provider(address, config, None)
    }
}
