use super::*;

#[derive(Debug, Deserialize)]
pub(super) struct CreatePayroll {
    pub(super) employee: Uuid,
    pub(super) month: i16,
    pub(super) year: i32,
    #[serde(default)]
    pub(super) basic_salary: RawAmount,
    #[serde(default)]
    pub(super) allowances: AllowancesInput,
    #[serde(default)]
    pub(super) deductions: DeductionsInput,
    #[serde(default)]
    pub(super) status: Option<PayrollStatus>,
    #[serde(default)]
    pub(super) payment_date: Option<DateTimeWithTimeZone>,
    #[serde(default)]
    pub(super) payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub(super) comments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UpdatePayroll {
    pub(super) month: Option<i16>,
    pub(super) year: Option<i32>,
    #[serde(default)]
    pub(super) basic_salary: RawAmount,
    pub(super) allowances: Option<AllowancesInput>,
    pub(super) deductions: Option<DeductionsInput>,
    pub(super) status: Option<PayrollStatus>,
    pub(super) payment_date: Option<DateTimeWithTimeZone>,
    pub(super) payment_method: Option<PaymentMethod>,
    pub(super) comments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AllowancesInput {
    #[serde(default)]
    pub(super) overtime: RawAmount,
    #[serde(default)]
    pub(super) medical: RawAmount,
    #[serde(default)]
    pub(super) transportation: RawAmount,
    #[serde(default)]
    pub(super) other: RawAmount,
}

impl AllowancesInput {
    pub(super) fn normalize(&self) -> Result<Allowances, ApiError> {
        Ok(Allowances {
            overtime: self.overtime.optional("overtime allowance")?,
            medical: self.medical.optional("medical allowance")?,
            transportation: self.transportation.optional("transportation allowance")?,
            other: self.other.optional("other allowance")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct DeductionsInput {
    #[serde(default)]
    pub(super) tax: RawAmount,
    #[serde(default)]
    pub(super) insurance: RawAmount,
    #[serde(default)]
    pub(super) loan: RawAmount,
    #[serde(default)]
    pub(super) other: RawAmount,
}

impl DeductionsInput {
    pub(super) fn normalize(&self) -> Result<Deductions, ApiError> {
        Ok(Deductions {
            tax: self.tax.optional("tax deduction")?,
            insurance: self.insurance.optional("insurance deduction")?,
            loan: self.loan.optional("loan deduction")?,
            other: self.other.optional("other deduction")?,
        })
    }
}
