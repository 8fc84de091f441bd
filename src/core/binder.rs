//! Two-way binding between the USD and VES amount fields.
//!
//! The binder owns both text fields, the selected [`RateMode`] and the last
//! applied [`RateSnapshot`]. Every change (a field edit, a mode switch, a new
//! snapshot) funnels into [`ConversionBinder::propagate`], which is the only
//! place that writes a derived field.

use crate::core::amount::{Amount, format_amount, parse_amount};
use crate::core::rate::{RateMode, RateSnapshot};
use rust_decimal::Decimal;
use tracing::debug;

/// Identifies one of the two amount fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Amount in USD.
    Source,
    /// Amount in VES.
    Target,
}

impl Field {
    pub fn other(self) -> Field {
        match self {
            Field::Source => Field::Target,
            Field::Target => Field::Source,
        }
    }
}

/// What happened to a user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The text was not numeric, or its counterpart would overflow. Both
    /// fields are untouched.
    Rejected,
    /// The field was blanked.
    Cleared,
    /// The text was stored. `derived` holds the counterpart value when a rate
    /// was available to recompute it.
    Updated { derived: Option<String> },
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Edited(Field),
    RateChanged,
}

#[derive(Debug, Default)]
pub struct ConversionBinder {
    mode: RateMode,
    snapshot: Option<RateSnapshot>,
    source: String,
    target: String,
}

impl ConversionBinder {
    pub fn new(mode: RateMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> RateMode {
        self.mode
    }

    pub fn snapshot(&self) -> Option<&RateSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Source => &self.source,
            Field::Target => &self.target,
        }
    }

    /// The rate currently used for conversion, if one can be computed.
    pub fn active_rate(&self) -> Option<Decimal> {
        self.snapshot.as_ref().and_then(|s| s.rate_for(self.mode))
    }

    pub fn edit(&mut self, field: Field, text: &str) -> EditOutcome {
        let Some(amount) = parse_amount(text) else {
            debug!(?field, text, "Rejected non-numeric edit");
            return EditOutcome::Rejected;
        };

        // A value whose counterpart cannot be represented is invalid input.
        if let (Amount::Value(value), Some(rate)) = (amount, self.active_rate()) {
            if convert(field, value, rate).is_none() {
                debug!(?field, text, %rate, "Rejected out-of-range edit");
                return EditOutcome::Rejected;
            }
        }

        *self.slot(field) = match amount {
            Amount::Empty => String::new(),
            Amount::Value(_) => text.trim().to_string(),
        };
        let derived = self.propagate(Trigger::Edited(field));

        match amount {
            Amount::Empty => EditOutcome::Cleared,
            Amount::Value(_) => EditOutcome::Updated { derived },
        }
    }

    pub fn edit_source(&mut self, text: &str) -> EditOutcome {
        self.edit(Field::Source, text)
    }

    pub fn edit_target(&mut self, text: &str) -> EditOutcome {
        self.edit(Field::Target, text)
    }

    /// Switches the rate mode. Returns `true` when the mode actually changed.
    pub fn set_mode(&mut self, mode: RateMode) -> bool {
        if self.mode == mode {
            return false;
        }
        let before = self.active_rate();
        self.mode = mode;
        debug!(%mode, "Rate mode changed");
        if self.active_rate() != before {
            self.propagate(Trigger::RateChanged);
        }
        true
    }

    /// Replaces the snapshot wholesale and recomputes if the active rate moved.
    pub fn apply_snapshot(&mut self, snapshot: RateSnapshot) {
        let before = self.active_rate();
        self.snapshot = Some(snapshot);
        if self.active_rate() != before {
            self.propagate(Trigger::RateChanged);
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Source => &mut self.source,
            Field::Target => &mut self.target,
        }
    }

    /// Recomputes the field that depends on `trigger` and returns its new text.
    ///
    /// An edit drives the other field. A rate change drives the target from the
    /// source when the source holds a value, otherwise the source from the
    /// target. Nothing is written while the rate is unknown. A counterpart that
    /// overflows on a rate change is cleared rather than left stale.
    fn propagate(&mut self, trigger: Trigger) -> Option<String> {
        let rate = self.active_rate()?;

        let leader = match trigger {
            Trigger::Edited(field) => field,
            Trigger::RateChanged if !self.source.is_empty() => Field::Source,
            Trigger::RateChanged if !self.target.is_empty() => Field::Target,
            Trigger::RateChanged => return None,
        };

        let derived = match parse_amount(self.value(leader))? {
            Amount::Empty => String::new(),
            Amount::Value(amount) => match convert(leader, amount, rate) {
                Some(converted) => format_amount(converted),
                None => {
                    debug!(?leader, %rate, "Counterpart out of range, clearing it");
                    String::new()
                }
            },
        };

        debug!(?leader, %rate, derived = %derived, "Recomputed dependent field");
        *self.slot(leader.other()) = derived.clone();
        Some(derived)
    }
}

/// Converts an amount typed into `from` into the other field's currency.
fn convert(from: Field, amount: Decimal, rate: Decimal) -> Option<Decimal> {
    match from {
        Field::Source => amount.checked_mul(rate),
        Field::Target => amount.checked_div(rate),
    }
}
