//! BPJS and PPh21 calculation
//!
//! [`calculate`] is a pure function of (base salary, tax status, NPWP flag,
//! rate table). Every money component is rounded half away from zero to
//! `rates.rounding_scale` decimals as soon as it is computed, so totals are
//! sums of the stored components.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use super::money::{floor_to_multiple, round_money, to_decimal, to_f64};
use super::rates::{PayrollRates, TaxBracket};

/// PTKP status: `TK/n` (single) or `K/n` (married) with n dependents (0..=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxStatus {
    pub married: bool,
    pub dependents: u8,
}

impl TaxStatus {
    pub const MAX_DEPENDENTS: u8 = 3;
}

impl FromStr for TaxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let (prefix, count) = normalized
            .split_once('/')
            .ok_or_else(|| format!("Invalid tax status: {s}"))?;
        let married = match prefix {
            "TK" => false,
            "K" => true,
            _ => return Err(format!("Invalid tax status: {s}")),
        };
        let dependents = count
            .parse::<u8>()
            .ok()
            .filter(|d| *d <= Self::MAX_DEPENDENTS)
            .ok_or_else(|| format!("Invalid tax status: {s}"))?;
        Ok(Self {
            married,
            dependents,
        })
    }
}

impl fmt::Display for TaxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.married { "K" } else { "TK" };
        write!(f, "{prefix}/{}", self.dependents)
    }
}

/// Monthly payslip figures (IDR)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollBreakdown {
    pub base_salary: f64,
    pub bpjs_kesehatan_employee: f64,
    pub bpjs_jht_employee: f64,
    pub bpjs_jp_employee: f64,
    pub bpjs_employee_total: f64,
    pub bpjs_kesehatan_company: f64,
    pub bpjs_jht_company: f64,
    pub bpjs_jp_company: f64,
    pub bpjs_jkk_company: f64,
    pub bpjs_jkm_company: f64,
    pub bpjs_company_total: f64,
    pub biaya_jabatan: f64,
    pub net_annual: f64,
    pub ptkp_annual: f64,
    pub pkp_annual: f64,
    pub pph21_annual: f64,
    pub pph21_monthly: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
}

/// Annual non-taxable income for a status
pub fn ptkp(status: TaxStatus, rates: &PayrollRates) -> Decimal {
    let dependents = status.dependents.min(rates.ptkp_max_dependents);
    let mut total = rates.ptkp_base + rates.ptkp_per_dependent * Decimal::from(dependents);
    if status.married {
        total += rates.ptkp_married;
    }
    total
}

/// Progressive tax on annual taxable income (unrounded).
///
/// Income above the last bounded tier is taxed at the last tier's rate.
pub fn progressive_tax(pkp: Decimal, brackets: &[TaxBracket]) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    let mut last_rate = Decimal::ZERO;

    for bracket in brackets {
        last_rate = bracket.rate;
        match bracket.up_to {
            Some(upper) => {
                if pkp <= lower {
                    return tax;
                }
                tax += (pkp.min(upper) - lower) * bracket.rate;
                lower = upper;
            }
            None => {
                if pkp > lower {
                    tax += (pkp - lower) * bracket.rate;
                }
                return tax;
            }
        }
    }

    if pkp > lower {
        tax += (pkp - lower) * last_rate;
    }
    tax
}

/// Compute the monthly payslip
///
/// ```text
/// net_monthly = gross - biaya_jabatan - JHT(employee) - JP(employee)
/// pkp         = floor((net_monthly * 12 - PTKP), pkp_rounding), at least 0
/// pph21       = progressive(pkp) * (1 + surcharge if no NPWP) / 12
/// net_salary  = gross - BPJS(employee) - pph21
/// ```
pub fn calculate(
    base_salary: f64,
    tax_status: TaxStatus,
    has_npwp: bool,
    rates: &PayrollRates,
) -> PayrollBreakdown {
    let scale = rates.rounding_scale;
    let round = |v: Decimal| round_money(v, scale);
    let gross = to_decimal(base_salary).max(Decimal::ZERO);

    // BPJS
    let kes_base = gross.min(rates.kes_salary_cap);
    let jp_base = gross.min(rates.jp_salary_cap);

    let kes_employee = round(kes_base * rates.kes_employee_rate);
    let jht_employee = round(gross * rates.jht_employee_rate);
    let jp_employee = round(jp_base * rates.jp_employee_rate);
    let employee_total = kes_employee + jht_employee + jp_employee;

    let kes_company = round(kes_base * rates.kes_company_rate);
    let jht_company = round(gross * rates.jht_company_rate);
    let jp_company = round(jp_base * rates.jp_company_rate);
    let jkk_company = round(gross * rates.jkk_company_rate);
    let jkm_company = round(gross * rates.jkm_company_rate);
    let company_total = kes_company + jht_company + jp_company + jkk_company + jkm_company;

    // PPh21
    let biaya_jabatan = round((gross * rates.biaya_jabatan_rate).min(rates.biaya_jabatan_monthly_cap));
    let net_monthly = gross - biaya_jabatan - jht_employee - jp_employee;
    let net_annual = net_monthly * Decimal::from(12);
    let ptkp_annual = ptkp(tax_status, rates);
    let pkp_annual = floor_to_multiple((net_annual - ptkp_annual).max(Decimal::ZERO), rates.pkp_rounding);

    let mut annual_tax = progressive_tax(pkp_annual, &rates.brackets);
    if !has_npwp {
        annual_tax *= Decimal::ONE + rates.non_npwp_surcharge_rate;
    }
    let pph21_annual = round(annual_tax);
    let pph21_monthly = round(pph21_annual / Decimal::from(12));

    let total_deductions = employee_total + pph21_monthly;
    let net_salary = gross - total_deductions;

    PayrollBreakdown {
        base_salary: to_f64(gross),
        bpjs_kesehatan_employee: to_f64(kes_employee),
        bpjs_jht_employee: to_f64(jht_employee),
        bpjs_jp_employee: to_f64(jp_employee),
        bpjs_employee_total: to_f64(employee_total),
        bpjs_kesehatan_company: to_f64(kes_company),
        bpjs_jht_company: to_f64(jht_company),
        bpjs_jp_company: to_f64(jp_company),
        bpjs_jkk_company: to_f64(jkk_company),
        bpjs_jkm_company: to_f64(jkm_company),
        bpjs_company_total: to_f64(company_total),
        biaya_jabatan: to_f64(biaya_jabatan),
        net_annual: to_f64(net_annual),
        ptkp_annual: to_f64(ptkp_annual),
        pkp_annual: to_f64(pkp_annual),
        pph21_annual: to_f64(pph21_annual),
        pph21_monthly: to_f64(pph21_monthly),
        total_deductions: to_f64(total_deductions),
        net_salary: to_f64(net_salary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::rates::default_brackets;

    fn tk0() -> TaxStatus {
        "TK/0".parse().unwrap()
    }

    #[test]
    fn test_tax_status_parse() {
        assert_eq!(
            "K/2".parse::<TaxStatus>().unwrap(),
            TaxStatus {
                married: true,
                dependents: 2
            }
        );
        assert_eq!(" tk/1 ".parse::<TaxStatus>().unwrap().to_string(), "TK/1");
        assert!("K/4".parse::<TaxStatus>().is_err());
        assert!("TK0".parse::<TaxStatus>().is_err());
        assert!("M/0".parse::<TaxStatus>().is_err());
    }

    #[test]
    fn test_ptkp() {
        let rates = PayrollRates::default();
        assert_eq!(ptkp(tk0(), &rates), Decimal::new(54_000_000, 0));
        assert_eq!(
            ptkp("K/3".parse().unwrap(), &rates),
            Decimal::new(72_000_000, 0)
        );
    }

    #[test]
    fn test_progressive_tax_tiers() {
        let brackets = default_brackets();
        assert_eq!(progressive_tax(Decimal::ZERO, &brackets), Decimal::ZERO);
        // 60M * 5%
        assert_eq!(
            progressive_tax(Decimal::new(60_000_000, 0), &brackets),
            Decimal::new(3_000_000, 0)
        );
        // 3M + 28.5M + 62.5M + 30M
        assert_eq!(
            progressive_tax(Decimal::new(600_000_000, 0), &brackets),
            Decimal::new(124_000_000, 0)
        );
        // Above a bounded-only table, the last rate continues
        let bounded = vec![TaxBracket {
            up_to: Some(Decimal::new(100, 0)),
            rate: Decimal::new(1, 1),
        }];
        assert_eq!(progressive_tax(Decimal::new(150, 0), &bounded), Decimal::new(15, 0));
    }

    #[test]
    fn test_calculate_ten_million_single() {
        let b = calculate(10_000_000.0, tk0(), true, &PayrollRates::default());
        assert_eq!(b.bpjs_kesehatan_employee, 100_000.0);
        assert_eq!(b.bpjs_jht_employee, 200_000.0);
        assert_eq!(b.bpjs_jp_employee, 100_000.0);
        assert_eq!(b.bpjs_employee_total, 400_000.0);
        assert_eq!(b.bpjs_company_total, 1_024_000.0);
        assert_eq!(b.biaya_jabatan, 500_000.0);
        assert_eq!(b.net_annual, 110_400_000.0);
        assert_eq!(b.pkp_annual, 56_400_000.0);
        assert_eq!(b.pph21_annual, 2_820_000.0);
        assert_eq!(b.pph21_monthly, 235_000.0);
        assert_eq!(b.total_deductions, 635_000.0);
        assert_eq!(b.net_salary, 9_365_000.0);
    }

    #[test]
    fn test_calculate_without_npwp_adds_surcharge() {
        let b = calculate(10_000_000.0, tk0(), false, &PayrollRates::default());
        assert_eq!(b.pph21_annual, 3_384_000.0);
        assert_eq!(b.pph21_monthly, 282_000.0);
    }

    #[test]
    fn test_calculate_caps_and_married_status() {
        let b = calculate(
            20_000_000.0,
            "K/2".parse().unwrap(),
            true,
            &PayrollRates::default(),
        );
        // Kesehatan capped at 12M, JP capped at 10,042,300
        assert_eq!(b.bpjs_kesehatan_employee, 120_000.0);
        assert_eq!(b.bpjs_jp_employee, 100_423.0);
        assert_eq!(b.biaya_jabatan, 500_000.0);
        assert_eq!(b.ptkp_annual, 67_500_000.0);
        assert_eq!(b.pkp_annual, 160_494_000.0);
        assert_eq!(b.pph21_annual, 18_074_100.0);
        assert_eq!(b.pph21_monthly, 1_506_175.0);
        assert_eq!(b.net_salary, 17_873_402.0);
    }

    #[test]
    fn test_income_below_ptkp_has_no_tax() {
        let b = calculate(4_000_000.0, tk0(), false, &PayrollRates::default());
        assert_eq!(b.pkp_annual, 0.0);
        assert_eq!(b.pph21_monthly, 0.0);
        assert_eq!(b.net_salary, 4_000_000.0 - b.bpjs_employee_total);
    }

    #[test]
    fn test_calculate_is_deterministic() {
        let rates = PayrollRates::default();
        let status = "K/1".parse().unwrap();
        assert_eq!(
            calculate(13_750_000.0, status, true, &rates),
            calculate(13_750_000.0, status, true, &rates)
        );
    }

    #[test]
    fn test_rounding_scale_keeps_cents() {
        let rates = PayrollRates {
            rounding_scale: 2,
            ..PayrollRates::default()
        };
        let b = calculate(10_042_350.0, tk0(), true, &rates);
        // 1% of the 10,042,300 JP cap
        assert_eq!(b.bpjs_jp_employee, 100_423.0);
        // 1% of 10,042,350
        assert_eq!(b.bpjs_kesehatan_employee, 100_423.5);
    }
}
