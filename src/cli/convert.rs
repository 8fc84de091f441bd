use super::ui;
use crate::core::amount::{Amount, format_amount, parse_amount};
use crate::core::config::AppConfig;
use crate::core::{ConversionBinder, EditOutcome, Field, RateMode, RateProvider, RateSnapshot};
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;

/// The result of converting a single amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub from: Field,
    pub amount: String,
    pub converted: String,
    pub rate: Decimal,
}

/// Converts `amount`, given in the currency of `from`, at the rate selected by `mode`.
pub fn convert(
    snapshot: RateSnapshot,
    amount: &str,
    from: Field,
    mode: RateMode,
) -> Result<Conversion> {
    let mut binder = ConversionBinder::new(mode);
    binder.apply_snapshot(snapshot);

    match binder.edit(from, amount) {
        // A numeric amount is only rejected when its conversion overflows.
        EditOutcome::Rejected if matches!(parse_amount(amount), Some(Amount::Value(_))) => {
            bail!("Amount out of range: {:?}", amount)
        }
        EditOutcome::Rejected | EditOutcome::Cleared => bail!("Invalid amount: {:?}", amount),
        EditOutcome::Updated { derived: None } => bail!("{mode} rate is unavailable"),
        EditOutcome::Updated {
            derived: Some(converted),
        } => Ok(Conversion {
            from,
            amount: binder.value(from).to_string(),
            converted,
            // The binder only derives a value when the rate is known.
            rate: binder.active_rate().unwrap_or_default(),
        }),
    }
}

pub async fn run(
    provider: &dyn RateProvider,
    amount: &str,
    from: Field,
    mode: RateMode,
    config: &AppConfig,
) -> Result<()> {
    let pb = ui::new_spinner("Loading exchange rates...");
    let result = provider.fetch_rates().await;
    pb.finish_and_clear();
    let snapshot = result.context("Failed to load exchange rates")?;

    let conversion = convert(snapshot, amount, from, mode)?;
    println!(
        "{} {} = {} {}",
        conversion.amount,
        ui::field_label(from),
        ui::style_text(&conversion.converted, ui::StyleType::Value),
        ui::field_label(from.other())
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "{mode} rate: {} ({})",
                config.display.format(conversion.rate),
                format_amount(conversion.rate)
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn snapshot() -> RateSnapshot {
        RateSnapshot {
            official_rate: Decimal::new(3650, 2),
            market_rate: Decimal::new(4000, 2),
            last_updated: DateTime::parse_from_rfc3339("2025-01-10T12:00:00Z").unwrap(),
        }
    }

    #[test]
    fn test_convert_usd_to_ves() {
        let conversion = convert(snapshot(), "10", Field::Source, RateMode::Average).unwrap();
        assert_eq!(conversion.converted, "382.50");
        assert_eq!(conversion.rate, Decimal::new(3825, 2));
        assert_eq!(conversion.amount, "10");
    }

    #[test]
    fn test_convert_ves_to_usd() {
        let conversion = convert(snapshot(), "400", Field::Target, RateMode::Market).unwrap();
        assert_eq!(conversion.converted, "10.00");
    }

    #[test]
    fn test_convert_rejects_invalid_amount() {
        let err = convert(snapshot(), "abc", Field::Source, RateMode::Official).unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount: \"abc\"");

        let err = convert(snapshot(), "", Field::Source, RateMode::Official).unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount: \"\"");
    }

    #[test]
    fn test_convert_rejects_amount_out_of_range() {
        let err = convert(snapshot(), "1e28", Field::Source, RateMode::Official).unwrap_err();
        assert_eq!(err.to_string(), "Amount out of range: \"1e28\"");
    }

    #[test]
    fn test_convert_reports_unavailable_rate() {
        let mut snap = snapshot();
        snap.market_rate = Decimal::ZERO;
        let err = convert(snap, "10", Field::Source, RateMode::Average).unwrap_err();
        assert_eq!(err.to_string(), "Average rate is unavailable");
    }
}
