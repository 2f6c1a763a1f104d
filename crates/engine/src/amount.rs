use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::EngineError;

/// Non-negative money amount backed by an exact decimal.
///
/// Amounts are persisted as their canonical decimal string (see
/// [`Display`](fmt::Display)) rather than as floating point, so summing many
/// expenses never drifts. The canonical form carries at least two decimals
/// and keeps any further digits the input had.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount: Amount = "12.5".parse().unwrap();
/// assert_eq!(amount.to_string(), "12.50");
/// assert_eq!(".5".parse::<Amount>().unwrap().to_string(), "0.50");
/// assert_eq!("12.345".parse::<Amount>().unwrap().to_string(), "12.345");
/// ```
///
/// Parsing accepts `.` or `,` as decimal separator and an exponent, and
/// rejects negatives:
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("10,5".parse::<Amount>().unwrap().to_string(), "10.50");
/// assert_eq!("1e3".parse::<Amount>().unwrap().to_string(), "1000.00");
/// assert!("-1".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Sum of `amounts`, or `None` if the total overflows.
    #[must_use]
    pub fn checked_sum<I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, Amount::checked_add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut canonical = self.0.normalize();
        if canonical.scale() < 2 {
            canonical.rescale(2);
        }
        write!(f, "{canonical}")
    }
}

/// Checks `digits` is `[0-9]*(\.[0-9]*)?` with at least one digit, and
/// returns it with a leading `0` when the integer part is empty.
fn plain_decimal(digits: &str) -> Option<String> {
    let (units, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());

    if units.is_empty() && fraction.is_empty() {
        return None;
    }
    if !all_digits(units) || !all_digits(fraction) {
        return None;
    }

    let units = if units.is_empty() { "0" } else { units };
    Some(if fraction.is_empty() {
        units.to_string()
    } else {
        format!("{units}.{fraction}")
    })
}

/// Checks `exponent` is an optionally signed run of digits.
fn plain_exponent(exponent: &str) -> bool {
    let digits = exponent
        .strip_prefix(['+', '-'])
        .unwrap_or(exponent);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Accepts `.` or `,` as decimal separator, a missing integer part
    /// (`".50"`), an exponent (`"1e3"`) and an optional leading `+`.
    /// A leading `-` is only accepted for zero (`"-0"`, `"-0.00"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidValue(format!("invalid amount: {s}"));

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidValue("empty amount".to_string()));
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.replace(',', ".");
        let (mantissa, exponent) = match rest.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => (mantissa, Some(exponent)),
            None => (rest.as_str(), None),
        };

        let mantissa = plain_decimal(mantissa).ok_or_else(invalid)?;
        let value = match exponent {
            None => Decimal::from_str(&mantissa),
            Some(exponent) if plain_exponent(exponent) => {
                Decimal::from_scientific(&format!("{mantissa}e{exponent}"))
            }
            Some(_) => return Err(invalid()),
        }
        .map_err(|_| EngineError::InvalidValue(format!("amount out of range: {s}")))?;

        if negative && !value.is_zero() {
            return Err(EngineError::InvalidValue(
                "amount must not be negative".to_string(),
            ));
        }

        // `-0` keeps its sign bit in `Decimal`; store it as plain zero.
        Ok(Amount(value.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> String {
        s.parse::<Amount>().unwrap().to_string()
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Amount::ZERO.to_string(), "0.00");
        assert_eq!(amount("0.01"), "0.01");
        assert_eq!(amount("0.1"), "0.10");
        assert_eq!(amount("12.500"), "12.50");
        assert_eq!(amount("1234.56"), "1234.56");
        assert_eq!(amount("0.125"), "0.125");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(amount("10"), "10.00");
        assert_eq!(amount("10."), "10.00");
        assert_eq!(amount("10.5"), "10.50");
        assert_eq!(amount("10,50"), "10.50");
        assert_eq!(amount("+1.00"), "1.00");
        assert_eq!(amount("  2.30 "), "2.30");
        assert_eq!(amount("-0.00"), "0.00");
    }

    #[test]
    fn parse_accepts_missing_units_and_exponents() {
        assert_eq!(amount(".50"), "0.50");
        assert_eq!(amount(",5"), "0.50");
        assert_eq!(amount("1e3"), "1000.00");
        assert_eq!(amount("2.5E-1"), "0.25");
        assert_eq!(amount("12.345"), "12.345");
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert!("-0.01".parse::<Amount>().is_err());
        assert!("-1e2".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
        assert!(".".parse::<Amount>().is_err());
        assert!("1.2.3".parse::<Amount>().is_err());
        assert!("1e".parse::<Amount>().is_err());
        assert!("1_000".parse::<Amount>().is_err());
        assert!("e3".parse::<Amount>().is_err());
    }

    #[test]
    fn checked_sum_is_exact_and_detects_overflow() {
        let dime: Amount = "0.10".parse().unwrap();
        let total = Amount::checked_sum(std::iter::repeat_n(dime, 10)).unwrap();
        assert_eq!(total.to_string(), "1.00");

        let max = Amount(Decimal::MAX);
        assert_eq!(Amount::checked_sum([max, dime, max]), None);
    }
}
