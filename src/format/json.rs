//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::geo::AddressInfo;

/// JSON formatter - outputs the address as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Address as JSON"
    }

    fn format(&self, address: &AddressInfo, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(address)?)
    }
}
