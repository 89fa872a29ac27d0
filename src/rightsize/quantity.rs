//! Kubernetes resource quantities.
//!
//! Parses the `<number><suffix>` grammar used by container requests and
//! limits (`250m`, `1.5Gi`, `1e3`) into an exact value, and prints it back in
//! canonical form the way the API server would.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{FluxfitError, Result};

/// `<sign><digits>[.<digits>]<suffix>` where suffix is binary SI, decimal SI or an exponent.
static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)(\d+|\d+\.\d*|\.\d+)(Ki|Mi|Gi|Ti|Pi|Ei|n|u|m|k|M|G|T|P|E|[eE][+-]?\d+)?$")
        .expect("quantity regex is valid")
});

const NANOS_PER_UNIT: i128 = 1_000_000_000;

const BINARY_SUFFIXES: &[(&str, u32)] = &[("Ki", 1), ("Mi", 2), ("Gi", 3), ("Ti", 4), ("Pi", 5), ("Ei", 6)];

const DECIMAL_SUFFIXES: &[(&str, i32)] = &[
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("", 0),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// How a quantity was written, which decides its canonical spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityFormat {
    BinarySi,
    DecimalSi,
    DecimalExponent,
}

/// An exact resource amount, stored in nano-units.
///
/// Two quantities are equal when their values are equal, however they were
/// spelled.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    nanos: i128,
    format: QuantityFormat,
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl Quantity {
    /// Parse a quantity string. Fractions below one nano-unit round up.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |message: &str| FluxfitError::QuantityParse {
            value: input.to_string(),
            message: message.to_string(),
        };

        let caps = QUANTITY_REGEX
            .captures(input)
            .ok_or_else(|| invalid("quantities must match the regular expression '^([+-]?[0-9.]+)([eEinumkKMGTP]*[-+]?[0-9]*)$'"))?;

        let negative = &caps[1] == "-";
        let number = &caps[2];
        let suffix = caps.get(3).map_or("", |m| m.as_str());

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        let digits = format!("{}{}", int_part, frac_part);
        let mantissa: i128 = digits
            .trim_start_matches('0')
            .chars()
            .try_fold(0i128, |acc, c| {
                acc.checked_mul(10)?.checked_add(i128::from(c.to_digit(10)?))
            })
            .ok_or_else(|| invalid("value is too large"))?;
        let frac_len = frac_part.len() as i32;

        let (nanos, format) = if let Some(&(_, power)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
            let scaled = mantissa
                .checked_mul(1i128 << (10 * power))
                .and_then(|v| v.checked_mul(NANOS_PER_UNIT))
                .ok_or_else(|| invalid("value is too large"))?;
            (scale_by_ten(scaled, -frac_len).ok_or_else(|| invalid("value is too large"))?, QuantityFormat::BinarySi)
        } else if let Some(&(_, exp)) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
            let nanos = scale_by_ten(mantissa, exp + 9 - frac_len).ok_or_else(|| invalid("value is too large"))?;
            (nanos, QuantityFormat::DecimalSi)
        } else {
            let exp: i32 = suffix[1..]
                .parse()
                .map_err(|_| invalid("exponent is out of range"))?;
            let nanos = exp
                .checked_add(9 - frac_len)
                .and_then(|e| scale_by_ten(mantissa, e))
                .ok_or_else(|| invalid("value is too large"))?;
            (nanos, QuantityFormat::DecimalExponent)
        };

        Ok(Self {
            nanos: if negative { -nanos } else { nanos },
            format,
        })
    }

    pub fn format(&self) -> QuantityFormat {
        self.format
    }

    /// Value in millis, rounded up (e.g. millicores for CPU).
    pub fn as_millis(&self) -> i128 {
        div_ceil(self.nanos, 1_000_000)
    }

    /// Whole units, rounded up (e.g. bytes for memory).
    pub fn as_units(&self) -> i128 {
        div_ceil(self.nanos, NANOS_PER_UNIT)
    }

    /// Convert into the Kubernetes API representation.
    pub fn to_k8s(&self) -> k8s_openapi::apimachinery::pkg::api::resource::Quantity {
        k8s_openapi::apimachinery::pkg::api::resource::Quantity(self.to_string())
    }

    fn canonical(&self) -> String {
        if self.nanos == 0 {
            return "0".to_string();
        }
        let sign = if self.nanos < 0 { "-" } else { "" };
        let abs = self.nanos.abs();

        if self.format == QuantityFormat::BinarySi && abs % NANOS_PER_UNIT == 0 {
            let units = abs / NANOS_PER_UNIT;
            if units >= 1024 {
                if let Some((suffix, power)) = BINARY_SUFFIXES
                    .iter()
                    .rev()
                    .find(|(_, power)| units % (1i128 << (10 * power)) == 0)
                {
                    return format!("{}{}{}", sign, units >> (10 * power), suffix);
                }
            }
        }

        // Largest power-of-1000 exponent that keeps the mantissa integral.
        let mut exp = 18;
        while exp > -9 && abs % 10i128.pow((exp + 9) as u32) != 0 {
            exp -= 3;
        }
        let mantissa = abs / 10i128.pow((exp + 9) as u32);

        let suffix = match self.format {
            QuantityFormat::DecimalExponent if exp != 0 => format!("e{}", exp),
            QuantityFormat::DecimalExponent => String::new(),
            _ => DECIMAL_SUFFIXES
                .iter()
                .find(|(_, e)| *e == exp)
                .map(|(s, _)| s.to_string())
                .unwrap_or_default(),
        };
        format!("{}{}{}", sign, mantissa, suffix)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl std::str::FromStr for Quantity {
    type Err = FluxfitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Multiply by `10^exp`, rounding up when `exp` is negative.
fn scale_by_ten(value: i128, exp: i32) -> Option<i128> {
    if exp >= 0 {
        value.checked_mul(10i128.checked_pow(exp as u32)?)
    } else {
        Some(div_ceil(value, 10i128.checked_pow(exp.unsigned_abs())?))
    }
}

fn div_ceil(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    if value % divisor > 0 { quotient + 1 } else { quotient }
}

/// Parse a recommended CPU value such as `"0.25 core"` or `"250m"`.
pub fn parse_cpu(value: &str) -> Result<Quantity> {
    let normalized = value.trim().to_lowercase();
    let normalized = normalized.strip_suffix(" core").unwrap_or(&normalized);
    Quantity::parse(normalized)
}

/// Parse a recommended memory value such as `"1.5 GiB"` or `"200MB"`.
pub fn parse_memory(value: &str) -> Result<Quantity> {
    let normalized = value
        .replace(' ', "")
        .replace("KiB", "Ki")
        .replace("KB", "K")
        .replace("MiB", "Mi")
        .replace("MB", "M")
        .replace("GiB", "Gi")
        .replace("GB", "G");
    Quantity::parse(normalized.trim())
}
