//! Payroll: BPJS contributions, PPh21 withholding and payslip generation
//!
//! - [`rates`] - settings-driven rate table ([`PayrollRates`])
//! - [`tax`] - pure calculation ([`calculate`])
//! - [`service`] - generation run and status lifecycle

pub mod money;
pub mod rates;
pub mod service;
pub mod tax;

pub use rates::{PayrollRates, TaxBracket};
pub use tax::{PayrollBreakdown, TaxStatus, calculate};
