//! Configuration validation for the `[engine]`, `[strategy]` and `[instrument]` sections.

use crate::domain::config::parse_utc_offset;
use crate::domain::error::DevScriptError;
use crate::ports::config_port::ConfigPort;

pub fn validate_runtime_config(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    validate_engine_config(config)?;
    validate_strategy_config(config)?;
    validate_instrument_config(config)?;
    Ok(())
}

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    validate_max_bars_back(config)?;
    validate_max_steps(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    validate_initial_capital(config)?;
    validate_default_qty(config)?;
    Ok(())
}

pub fn validate_instrument_config(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    validate_mintick(config)?;
    validate_point_value(config)?;
    validate_timezone(config)?;
    validate_session_hours(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> DevScriptError {
    DevScriptError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_max_bars_back(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    let value = config.get_int("engine", "max_bars_back", 5000);
    if value < 1 {
        return Err(invalid(
            "engine",
            "max_bars_back",
            "max_bars_back must be at least 1",
        ));
    }
    Ok(())
}

fn validate_max_steps(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    let value = config.get_int("engine", "max_steps", 1_000_000);
    if value < 1 {
        return Err(invalid("engine", "max_steps", "max_steps must be at least 1"));
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    let value = config.get_double("strategy", "initial_capital", 100_000.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            "strategy",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_default_qty(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    let value = config.get_double("strategy", "default_qty", 1.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            "strategy",
            "default_qty",
            "default_qty must be positive",
        ));
    }
    Ok(())
}

fn validate_mintick(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    let value = config.get_double("instrument", "mintick", 0.01);
    if value <= 0.0 {
        return Err(invalid("instrument", "mintick", "mintick must be positive"));
    }
    Ok(())
}

fn validate_point_value(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    let value = config.get_double("instrument", "point_value", 1.0);
    if value <= 0.0 {
        return Err(invalid(
            "instrument",
            "point_value",
            "point_value must be positive",
        ));
    }
    Ok(())
}

fn validate_timezone(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    match config.get_string("instrument", "timezone") {
        Some(zone) if !zone.trim().is_empty() && parse_utc_offset(&zone).is_none() => {
            Err(invalid(
                "instrument",
                "timezone",
                "timezone must be UTC or a fixed offset such as UTC+10 or -05:00",
            ))
        }
        _ => Ok(()),
    }
}

fn validate_session_hours(config: &dyn ConfigPort) -> Result<(), DevScriptError> {
    let open = config.get_int("instrument", "session_open_hour", 9);
    let close = config.get_int("instrument", "session_close_hour", 16);
    if !(0..=23).contains(&open) {
        return Err(invalid(
            "instrument",
            "session_open_hour",
            "session_open_hour must be between 0 and 23",
        ));
    }
    if !(1..=24).contains(&close) {
        return Err(invalid(
            "instrument",
            "session_close_hour",
            "session_close_hour must be between 1 and 24",
        ));
    }
    if close <= open {
        return Err(invalid(
            "instrument",
            "session_close_hour",
            "session_close_hour must be after session_open_hour",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(content: &str) -> String {
        match validate_runtime_config(&make_config(content)).unwrap_err() {
            DevScriptError::ConfigInvalid { key, .. } => key,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn full_valid_config_passes() {
        let config = make_config(
            r#"
[engine]
max_bars_back = 500
max_steps = 20000

[strategy]
initial_capital = 50000
default_qty = 2

[instrument]
ticker = BHP
mintick = 0.01
point_value = 1
timezone = UTC+10
session_open_hour = 10
session_close_hour = 16
"#,
        );
        assert!(validate_runtime_config(&config).is_ok());
    }

    #[test]
    fn empty_config_passes() {
        assert!(validate_runtime_config(&make_config("")).is_ok());
    }

    #[test]
    fn max_bars_back_must_be_positive() {
        assert_eq!(invalid_key("[engine]\nmax_bars_back = 0\n"), "max_bars_back");
    }

    #[test]
    fn max_steps_must_be_positive() {
        assert_eq!(invalid_key("[engine]\nmax_steps = -1\n"), "max_steps");
    }

    #[test]
    fn initial_capital_must_be_positive() {
        assert_eq!(
            invalid_key("[strategy]\ninitial_capital = -100\n"),
            "initial_capital"
        );
        assert_eq!(
            invalid_key("[strategy]\ninitial_capital = 0\n"),
            "initial_capital"
        );
    }

    #[test]
    fn default_qty_must_be_positive() {
        assert_eq!(invalid_key("[strategy]\ndefault_qty = 0\n"), "default_qty");
    }

    #[test]
    fn mintick_and_point_value_must_be_positive() {
        assert_eq!(invalid_key("[instrument]\nmintick = 0\n"), "mintick");
        assert_eq!(invalid_key("[instrument]\npoint_value = -1\n"), "point_value");
    }

    #[test]
    fn named_timezones_are_rejected() {
        assert_eq!(
            invalid_key("[instrument]\ntimezone = Australia/Sydney\n"),
            "timezone"
        );
    }

    #[test]
    fn session_must_close_after_open() {
        assert_eq!(
            invalid_key("[instrument]\nsession_open_hour = 16\nsession_close_hour = 9\n"),
            "session_close_hour"
        );
        assert_eq!(
            invalid_key("[instrument]\nsession_open_hour = 24\n"),
            "session_open_hour"
        );
    }
}
