use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Itemized pay components. Every field has already been normalized to a
/// non-negative two-decimal amount.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowances {
    pub overtime: Decimal,
    pub medical: Decimal,
    pub transportation: Decimal,
    pub other: Decimal,
}

impl Allowances {
    pub fn total(&self) -> Decimal {
        self.overtime + self.medical + self.transportation + self.other
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub tax: Decimal,
    pub insurance: Decimal,
    pub loan: Decimal,
    pub other: Decimal,
}

impl Deductions {
    pub fn total(&self) -> Decimal {
        self.tax + self.insurance + self.loan + self.other
    }
}

/// Itemized net: basic + Σallowances − Σdeductions. The result may be
/// negative when deductions exceed earnings; that is legal pay data.
pub fn net_salary(basic: Decimal, allowances: &Allowances, deductions: &Deductions) -> Decimal {
    basic + allowances.total() - deductions.total()
}

/// Simple-record net: gross − total deduction.
pub fn simple_net(gross: Decimal, total_deduction: Decimal) -> Decimal {
    gross - total_deduction
}
