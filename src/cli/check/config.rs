use std::path::Path;

use crate::cli::output;
use crate::config::Config;
use crate::error::Result;

/// Report on a configuration file that has already loaded and validated.
pub fn execute(path: &Path, config: &Config) -> Result<()> {
    output::note(&format!("Checking configuration: {}", path.display()));
    output::ok("Configuration file is valid");

    output::section("Engine");
    output::key_value("Total stake", config.engine.total_stake);
    output::key_value("Min profit %", config.engine.min_profit_pct);
    output::key_value("Max outcomes", config.engine.max_outcomes);

    output::section("Confidence");
    output::key_value("Critical above %", config.confidence.critical_above);
    output::key_value("Moderate above %", config.confidence.moderate_above);
    output::key_value("Verify above %", config.confidence.verify_above);
    output::key_value(
        "Escalate shared source",
        config.confidence.escalate_shared_source,
    );

    output::section("Sanity");
    if config.sanity.enabled {
        output::key_value(
            "Price band",
            format!("{} - {}", config.sanity.min_price, config.sanity.max_price),
        );
        output::key_value("Min implied prob.", config.sanity.min_implied_probability);
    } else {
        output::warn("Sanity checks disabled; implausible prices will be reported");
    }

    output::section("Sources");
    if config.sources.allowed.is_empty() {
        output::note("All sources accepted");
    } else {
        output::key_value("Allowed", config.sources.allowed.join(", "));
    }

    output::section("Schedule");
    output::key_value("Include live", config.schedule.include_live);
    output::key_value("Grace minutes", config.schedule.grace_minutes);

    println!();
    output::note("Configuration is ready to use.");
    Ok(())
}
