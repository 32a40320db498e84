//! Payroll rate table
//!
//! Built from the company's `payroll_settings` key/value map. Rates are
//! fractions (`0.01` = 1%), amounts are IDR. Missing keys use the statutory
//! defaults; malformed values log a warning and fall back to the default.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

pub const KEY_KES_EMPLOYEE_RATE: &str = "bpjs_kesehatan_employee_rate";
pub const KEY_KES_COMPANY_RATE: &str = "bpjs_kesehatan_company_rate";
pub const KEY_KES_SALARY_CAP: &str = "bpjs_kesehatan_salary_cap";
pub const KEY_JHT_EMPLOYEE_RATE: &str = "bpjs_jht_employee_rate";
pub const KEY_JHT_COMPANY_RATE: &str = "bpjs_jht_company_rate";
pub const KEY_JP_EMPLOYEE_RATE: &str = "bpjs_jp_employee_rate";
pub const KEY_JP_COMPANY_RATE: &str = "bpjs_jp_company_rate";
pub const KEY_JP_SALARY_CAP: &str = "bpjs_jp_salary_cap";
pub const KEY_JKK_COMPANY_RATE: &str = "bpjs_jkk_company_rate";
pub const KEY_JKM_COMPANY_RATE: &str = "bpjs_jkm_company_rate";
pub const KEY_BIAYA_JABATAN_RATE: &str = "biaya_jabatan_rate";
pub const KEY_BIAYA_JABATAN_CAP: &str = "biaya_jabatan_monthly_cap";
pub const KEY_PTKP_BASE: &str = "ptkp_base";
pub const KEY_PTKP_MARRIED: &str = "ptkp_married";
pub const KEY_PTKP_DEPENDENT: &str = "ptkp_per_dependent";
pub const KEY_PTKP_MAX_DEPENDENTS: &str = "ptkp_max_dependents";
pub const KEY_BRACKETS: &str = "pph21_brackets";
pub const KEY_NON_NPWP_SURCHARGE: &str = "non_npwp_surcharge_rate";
pub const KEY_PKP_ROUNDING: &str = "pkp_rounding";
pub const KEY_ROUNDING_SCALE: &str = "rounding_scale";

/// Every key accepted in `payroll_settings`
pub const PAYROLL_SETTING_KEYS: &[&str] = &[
    KEY_KES_EMPLOYEE_RATE,
    KEY_KES_COMPANY_RATE,
    KEY_KES_SALARY_CAP,
    KEY_JHT_EMPLOYEE_RATE,
    KEY_JHT_COMPANY_RATE,
    KEY_JP_EMPLOYEE_RATE,
    KEY_JP_COMPANY_RATE,
    KEY_JP_SALARY_CAP,
    KEY_JKK_COMPANY_RATE,
    KEY_JKM_COMPANY_RATE,
    KEY_BIAYA_JABATAN_RATE,
    KEY_BIAYA_JABATAN_CAP,
    KEY_PTKP_BASE,
    KEY_PTKP_MARRIED,
    KEY_PTKP_DEPENDENT,
    KEY_PTKP_MAX_DEPENDENTS,
    KEY_BRACKETS,
    KEY_NON_NPWP_SURCHARGE,
    KEY_PKP_ROUNDING,
    KEY_ROUNDING_SCALE,
];

/// Largest accepted `rounding_scale`
const MAX_ROUNDING_SCALE: u32 = 4;

/// One progressive tier: income up to `up_to` (annual, inclusive) is taxed at `rate`.
/// `None` marks the open-ended top tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBracket {
    pub up_to: Option<Decimal>,
    pub rate: Decimal,
}

#[derive(Debug, Deserialize)]
struct BracketSetting {
    up_to: Option<f64>,
    rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollRates {
    pub kes_employee_rate: Decimal,
    pub kes_company_rate: Decimal,
    pub kes_salary_cap: Decimal,
    pub jht_employee_rate: Decimal,
    pub jht_company_rate: Decimal,
    pub jp_employee_rate: Decimal,
    pub jp_company_rate: Decimal,
    pub jp_salary_cap: Decimal,
    pub jkk_company_rate: Decimal,
    pub jkm_company_rate: Decimal,
    pub biaya_jabatan_rate: Decimal,
    pub biaya_jabatan_monthly_cap: Decimal,
    pub ptkp_base: Decimal,
    pub ptkp_married: Decimal,
    pub ptkp_per_dependent: Decimal,
    pub ptkp_max_dependents: u8,
    pub brackets: Vec<TaxBracket>,
    pub non_npwp_surcharge_rate: Decimal,
    pub pkp_rounding: Decimal,
    pub rounding_scale: u32,
}

impl Default for PayrollRates {
    fn default() -> Self {
        Self {
            kes_employee_rate: Decimal::new(1, 2),
            kes_company_rate: Decimal::new(4, 2),
            kes_salary_cap: Decimal::new(12_000_000, 0),
            jht_employee_rate: Decimal::new(2, 2),
            jht_company_rate: Decimal::new(37, 3),
            jp_employee_rate: Decimal::new(1, 2),
            jp_company_rate: Decimal::new(2, 2),
            jp_salary_cap: Decimal::new(10_042_300, 0),
            jkk_company_rate: Decimal::new(24, 4),
            jkm_company_rate: Decimal::new(3, 3),
            biaya_jabatan_rate: Decimal::new(5, 2),
            biaya_jabatan_monthly_cap: Decimal::new(500_000, 0),
            ptkp_base: Decimal::new(54_000_000, 0),
            ptkp_married: Decimal::new(4_500_000, 0),
            ptkp_per_dependent: Decimal::new(4_500_000, 0),
            ptkp_max_dependents: 3,
            brackets: default_brackets(),
            non_npwp_surcharge_rate: Decimal::new(20, 2),
            pkp_rounding: Decimal::new(1000, 0),
            rounding_scale: 0,
        }
    }
}

/// UU HPP tiers: 5% / 15% / 25% / 30% / 35%
pub fn default_brackets() -> Vec<TaxBracket> {
    vec![
        TaxBracket {
            up_to: Some(Decimal::new(60_000_000, 0)),
            rate: Decimal::new(5, 2),
        },
        TaxBracket {
            up_to: Some(Decimal::new(250_000_000, 0)),
            rate: Decimal::new(15, 2),
        },
        TaxBracket {
            up_to: Some(Decimal::new(500_000_000, 0)),
            rate: Decimal::new(25, 2),
        },
        TaxBracket {
            up_to: Some(Decimal::new(5_000_000_000, 0)),
            rate: Decimal::new(30, 2),
        },
        TaxBracket {
            up_to: None,
            rate: Decimal::new(35, 2),
        },
    ]
}

impl PayrollRates {
    /// Build the rate table from a settings map
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let d = Self::default();
        let amount = |key: &str, default: Decimal| setting_or(settings, key, default, parse_amount);
        let rate = |key: &str, default: Decimal| setting_or(settings, key, default, parse_rate);

        Self {
            kes_employee_rate: rate(KEY_KES_EMPLOYEE_RATE, d.kes_employee_rate),
            kes_company_rate: rate(KEY_KES_COMPANY_RATE, d.kes_company_rate),
            kes_salary_cap: amount(KEY_KES_SALARY_CAP, d.kes_salary_cap),
            jht_employee_rate: rate(KEY_JHT_EMPLOYEE_RATE, d.jht_employee_rate),
            jht_company_rate: rate(KEY_JHT_COMPANY_RATE, d.jht_company_rate),
            jp_employee_rate: rate(KEY_JP_EMPLOYEE_RATE, d.jp_employee_rate),
            jp_company_rate: rate(KEY_JP_COMPANY_RATE, d.jp_company_rate),
            jp_salary_cap: amount(KEY_JP_SALARY_CAP, d.jp_salary_cap),
            jkk_company_rate: rate(KEY_JKK_COMPANY_RATE, d.jkk_company_rate),
            jkm_company_rate: rate(KEY_JKM_COMPANY_RATE, d.jkm_company_rate),
            biaya_jabatan_rate: rate(KEY_BIAYA_JABATAN_RATE, d.biaya_jabatan_rate),
            biaya_jabatan_monthly_cap: amount(KEY_BIAYA_JABATAN_CAP, d.biaya_jabatan_monthly_cap),
            ptkp_base: amount(KEY_PTKP_BASE, d.ptkp_base),
            ptkp_married: amount(KEY_PTKP_MARRIED, d.ptkp_married),
            ptkp_per_dependent: amount(KEY_PTKP_DEPENDENT, d.ptkp_per_dependent),
            ptkp_max_dependents: setting_or(
                settings,
                KEY_PTKP_MAX_DEPENDENTS,
                d.ptkp_max_dependents,
                parse_max_dependents,
            ),
            brackets: setting_or(settings, KEY_BRACKETS, d.brackets, parse_brackets),
            non_npwp_surcharge_rate: rate(KEY_NON_NPWP_SURCHARGE, d.non_npwp_surcharge_rate),
            pkp_rounding: amount(KEY_PKP_ROUNDING, d.pkp_rounding),
            rounding_scale: setting_or(
                settings,
                KEY_ROUNDING_SCALE,
                d.rounding_scale,
                parse_rounding_scale,
            ),
        }
    }
}

/// Check a single payroll setting before it is stored
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        KEY_KES_SALARY_CAP | KEY_JP_SALARY_CAP | KEY_BIAYA_JABATAN_CAP | KEY_PTKP_BASE
        | KEY_PTKP_MARRIED | KEY_PTKP_DEPENDENT | KEY_PKP_ROUNDING => {
            parse_amount(value).map(|_| ())
        }
        KEY_PTKP_MAX_DEPENDENTS => parse_max_dependents(value).map(|_| ()),
        KEY_BRACKETS => parse_brackets(value).map(|_| ()),
        KEY_ROUNDING_SCALE => parse_rounding_scale(value).map(|_| ()),
        k if PAYROLL_SETTING_KEYS.contains(&k) => parse_rate(value).map(|_| ()),
        _ => Err(format!("Unknown payroll setting: {key}")),
    }
}

fn setting_or<T>(
    settings: &HashMap<String, String>,
    key: &str,
    default: T,
    parse: fn(&str) -> Result<T, String>,
) -> T {
    match settings.get(key) {
        None => default,
        Some(raw) => parse(raw).unwrap_or_else(|e| {
            tracing::warn!(key, value = %raw, "Invalid payroll setting, using default: {e}");
            default
        }),
    }
}

fn parse_decimal(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("not a number: {e}"))
}

/// Non-negative amount
fn parse_amount(value: &str) -> Result<Decimal, String> {
    let v = parse_decimal(value)?;
    if v < Decimal::ZERO {
        return Err(format!("must not be negative, got {v}"));
    }
    Ok(v)
}

/// Fraction in [0, 1]
fn parse_rate(value: &str) -> Result<Decimal, String> {
    let v = parse_decimal(value)?;
    if v < Decimal::ZERO || v > Decimal::ONE {
        return Err(format!("rate must be between 0 and 1, got {v}"));
    }
    Ok(v)
}

fn parse_max_dependents(value: &str) -> Result<u8, String> {
    value
        .trim()
        .parse::<u8>()
        .map_err(|e| format!("not a small integer: {e}"))
}

fn parse_rounding_scale(value: &str) -> Result<u32, String> {
    let v = value
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("not an integer: {e}"))?;
    if v > MAX_ROUNDING_SCALE {
        return Err(format!("at most {MAX_ROUNDING_SCALE} decimals, got {v}"));
    }
    Ok(v)
}

/// JSON array `[{"up_to": 60000000, "rate": 0.05}, ..., {"up_to": null, "rate": 0.35}]`.
///
/// Tiers must be non-empty, strictly ascending, and only the last may be open-ended.
fn parse_brackets(value: &str) -> Result<Vec<TaxBracket>, String> {
    let raw: Vec<BracketSetting> =
        serde_json::from_str(value).map_err(|e| format!("invalid bracket JSON: {e}"))?;
    if raw.is_empty() {
        return Err("at least one bracket is required".into());
    }

    let mut brackets = Vec::with_capacity(raw.len());
    let mut previous: Option<Decimal> = None;
    for (i, b) in raw.iter().enumerate() {
        let rate = parse_rate(&b.rate.to_string())?;
        let up_to = match b.up_to {
            Some(limit) => {
                let limit = parse_amount(&limit.to_string())?;
                if previous.is_some_and(|p| limit <= p) {
                    return Err(format!("bracket {i} is not above the previous bracket"));
                }
                previous = Some(limit);
                Some(limit)
            }
            None if i + 1 == raw.len() => None,
            None => return Err(format!("only the last bracket may be open-ended (bracket {i})")),
        };
        brackets.push(TaxBracket { up_to, rate });
    }
    Ok(brackets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_settings_give_defaults() {
        assert_eq!(PayrollRates::from_settings(&HashMap::new()), PayrollRates::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let rates = PayrollRates::from_settings(&settings(&[
            (KEY_KES_EMPLOYEE_RATE, "0.02"),
            (KEY_JP_SALARY_CAP, "11000000"),
            (KEY_ROUNDING_SCALE, "2"),
            (
                KEY_BRACKETS,
                r#"[{"up_to": 50000000, "rate": 0.05}, {"up_to": null, "rate": 0.15}]"#,
            ),
        ]));
        assert_eq!(rates.kes_employee_rate, Decimal::new(2, 2));
        assert_eq!(rates.jp_salary_cap, Decimal::new(11_000_000, 0));
        assert_eq!(rates.rounding_scale, 2);
        assert_eq!(rates.brackets.len(), 2);
        assert_eq!(rates.brackets[0].up_to, Some(Decimal::new(50_000_000, 0)));
        assert_eq!(rates.brackets[1].up_to, None);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let rates = PayrollRates::from_settings(&settings(&[
            (KEY_KES_EMPLOYEE_RATE, "one percent"),
            (KEY_JHT_EMPLOYEE_RATE, "2"),
            (KEY_PTKP_BASE, "-1"),
            (KEY_BRACKETS, r#"[{"up_to": null, "rate": 0.1}, {"up_to": 5, "rate": 0.2}]"#),
        ]));
        let d = PayrollRates::default();
        assert_eq!(rates.kes_employee_rate, d.kes_employee_rate);
        assert_eq!(rates.jht_employee_rate, d.jht_employee_rate);
        assert_eq!(rates.ptkp_base, d.ptkp_base);
        assert_eq!(rates.brackets, d.brackets);
    }

    #[test]
    fn test_validate_setting() {
        assert!(validate_setting(KEY_JKK_COMPANY_RATE, "0.0054").is_ok());
        assert!(validate_setting(KEY_JKK_COMPANY_RATE, "1.5").is_err());
        assert!(validate_setting(KEY_PTKP_MAX_DEPENDENTS, "3").is_ok());
        assert!(validate_setting(KEY_ROUNDING_SCALE, "9").is_err());
        assert!(validate_setting(
            KEY_BRACKETS,
            r#"[{"up_to": 100, "rate": 0.1}, {"up_to": 50, "rate": 0.2}]"#
        )
        .is_err());
        assert!(validate_setting("overtime_multiplier", "1.5").is_err());
    }
}
