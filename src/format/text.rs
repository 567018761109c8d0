//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::geo::AddressInfo;

/// Text formatter - one summary line plus the individual fields
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable address"
    }

    fn format(&self, address: &AddressInfo, _config: &Config) -> Result<String> {
        let mut output = String::new();

        let parts = address.parts();
        if parts.is_empty() {
            output.push_str("(no address)\n");
        } else {
            output.push_str(&parts.join(", "));
            output.push('\n');
        }
        output.push_str(&format!(
            "Position: ({:.6}, {:.6})\n",
            address.latitude, address.longitude
        ));

        let fields = [
            ("Road", &address.road),
            ("Neighbourhood", &address.neighbourhood),
            ("Suburb", &address.suburb),
            ("City", &address.city),
            ("Postcode", &address.postcode),
            ("State", &address.state),
            ("Country", &address.country),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                output.push_str(&format!("  {}: {}\n", label, value));
            }
        }

        Ok(output)
    }
}
