use std::collections::{BTreeMap, HashMap};

use chrono::Datelike as _;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::{employee, payroll_record, salary_record};

use super::calc::{self, Allowances, Deductions};

/// How many positions the categorical headcount report keeps.
pub const TOP_POSITIONS: usize = 10;

/// A pay record flattened for aggregation. Records without a derivable
/// period fall out of time-based buckets but still count in the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayLine {
    /// (year, month), month in 1..=12.
    pub period: Option<(i32, u8)>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub gross: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: u64,
    pub total_gross: Decimal,
    pub total_allowances: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
    /// Share of the grand total, in percent. Zero when the grand total is
    /// zero; the original left that division unguarded in places.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub key: String,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub groups: Vec<Group>,
    /// Count over every input line, grouped or not.
    pub count: u64,
    pub grand_total_net: Decimal,
    pub average_net: Decimal,
}

/// Time series keyed "YYYY-MM", chronologically ascending.
pub fn by_month(lines: &[PayLine]) -> Report {
    let mut buckets: BTreeMap<(i32, u8), GroupStats> = BTreeMap::new();

    for line in lines {
        if let Some(period) = line.period {
            accumulate(buckets.entry(period).or_default(), line);
        }
    }

    let groups = buckets
        .into_iter()
        .map(|((year, month), stats)| Group { key: format!("{year}-{month:02}"), stats })
        .collect();

    finish(groups, lines, Basis::Net)
}

/// Categorical series keyed by department code, descending by count.
pub fn by_department(lines: &[PayLine]) -> Report {
    let groups = categorical(lines, |line| line.department.as_deref());
    finish(groups, lines, Basis::Net)
}

/// Top-`n` positions by headcount. Percentages here are headcount shares,
/// matching how the position report has always been presented.
pub fn top_positions(lines: &[PayLine], n: usize) -> Report {
    let mut groups = categorical(lines, |line| line.position.as_deref());
    groups.truncate(n);
    finish(groups, lines, Basis::Count)
}

fn categorical<'a>(lines: &'a [PayLine], key: impl Fn(&'a PayLine) -> Option<&'a str>) -> Vec<Group> {
    let mut buckets: HashMap<&str, GroupStats> = HashMap::new();

    for line in lines {
        if let Some(key) = key(line) {
            accumulate(buckets.entry(key).or_default(), line);
        }
    }

    let mut groups = buckets
        .into_iter()
        .map(|(key, stats)| Group { key: key.to_string(), stats })
        .collect::<Vec<_>>();

    // Key is the tiebreak so permuting the input cannot reorder the output.
    groups.sort_by(|a, b| b.stats.count.cmp(&a.stats.count).then_with(|| a.key.cmp(&b.key)));

    groups
}

fn accumulate(stats: &mut GroupStats, line: &PayLine) {
    stats.count += 1;
    stats.total_gross += line.gross;
    stats.total_allowances += line.allowances;
    stats.total_deductions += line.deductions;
    stats.total_net += line.net;
}

enum Basis {
    Net,
    Count,
}

fn finish(mut groups: Vec<Group>, lines: &[PayLine], basis: Basis) -> Report {
    let count = lines.len() as u64;
    let grand_total_net: Decimal = lines.iter().map(|line| line.net).sum();

    let average_net = if count == 0 {
        Decimal::ZERO
    } else {
        super::normalize::round(grand_total_net / Decimal::from(count))
    };

    for group in &mut groups {
        group.stats.percentage = match basis {
            Basis::Net => share(group.stats.total_net, grand_total_net),
            Basis::Count => share(Decimal::from(group.stats.count), Decimal::from(count)),
        };
    }

    Report { groups, count, grand_total_net, average_net }
}

/// `part / whole × 100`, defined as zero for an empty whole.
pub fn share(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        super::normalize::round(part / whole * Decimal::ONE_HUNDRED)
    }
}

impl From<&payroll_record::Model> for PayLine {
    fn from(record: &payroll_record::Model) -> Self {
        let allowances = Allowances {
            overtime: record.allowance_overtime,
            medical: record.allowance_medical,
            transportation: record.allowance_transportation,
            other: record.allowance_other,
        };
        let deductions = Deductions {
            tax: record.deduction_tax,
            insurance: record.deduction_insurance,
            loan: record.deduction_loan,
            other: record.deduction_other,
        };

        Self {
            period: Some((record.year, record.month as u8)),
            department: None,
            position: None,
            gross: record.basic_salary,
            allowances: allowances.total(),
            deductions: deductions.total(),
            // The stored net is only a cache; always re-derive.
            net: calc::net_salary(record.basic_salary, &allowances, &deductions),
        }
    }
}

impl From<&salary_record::Model> for PayLine {
    fn from(record: &salary_record::Model) -> Self {
        // The month column is free-form text. Prefer it when it parses to a
        // calendar month, otherwise fall back to the creation date.
        let period = record
            .month
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|month| (1..=12).contains(month))
            .map(|month| (record.created_at.year(), month))
            .or_else(|| Some((record.created_at.year(), record.created_at.month() as u8)));

        Self {
            period,
            department: None,
            position: None,
            gross: record.gross_salary,
            allowances: Decimal::ZERO,
            deductions: record.total_deduction,
            net: calc::simple_net(record.gross_salary, record.total_deduction),
        }
    }
}

impl From<&employee::Model> for PayLine {
    fn from(employee: &employee::Model) -> Self {
        Self {
            period: None,
            department: Some(employee.department_code.clone()),
            position: Some(employee.position.clone()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone as _};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::entity::sea_orm_active_enums::{PaymentMethod, PayrollStatus};

    use super::*;

    fn line(period: Option<(i32, u8)>, net: Decimal) -> PayLine {
        PayLine {
            period,
            gross: net,
            net,
            ..Default::default()
        }
    }

    #[test]
    fn test_by_month_single_group() {
        let lines = vec![
            line(Some((2024, 12)), dec!(1000)),
            line(Some((2024, 12)), dec!(1500)),
            line(Some((2024, 12)), dec!(2500)),
        ];

        let report = by_month(&lines);

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].key, "2024-12");
        assert_eq!(report.groups[0].stats.count, 3);
        assert_eq!(report.groups[0].stats.total_net, dec!(5000));
        assert_eq!(report.groups[0].stats.percentage, dec!(100));
        assert_eq!(report.grand_total_net, dec!(5000));
        assert_eq!(report.average_net, dec!(1666.67));
    }

    #[test]
    fn test_by_month_is_chronological() {
        let lines = vec![
            line(Some((2025, 1)), dec!(10)),
            line(Some((2024, 12)), dec!(20)),
            line(Some((2024, 2)), dec!(30)),
        ];

        let report = by_month(&lines);
        let keys = report.groups.iter().map(|g| g.key.as_str()).collect::<Vec<_>>();

        assert_eq!(keys, ["2024-02", "2024-12", "2025-01"]);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let mut lines = vec![
            line(Some((2024, 1)), dec!(100)),
            line(Some((2024, 2)), dec!(200)),
            line(Some((2024, 2)), dec!(300)),
            line(None, dec!(50)),
        ];

        let forward = by_month(&lines);
        lines.reverse();
        let backward = by_month(&lines);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_undated_lines_stay_in_the_summary() {
        let lines = vec![
            line(Some((2024, 3)), dec!(100)),
            line(None, dec!(900)),
        ];

        let report = by_month(&lines);

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.count, 2);
        assert_eq!(report.grand_total_net, dec!(1000));
        // The grouped line holds 10% of a grand total it does not exhaust.
        assert_eq!(report.groups[0].stats.percentage, dec!(10));
    }

    #[test]
    fn test_percentages_sum_to_one_hundred() {
        let lines = vec![
            line(Some((2024, 1)), dec!(333)),
            line(Some((2024, 2)), dec!(333)),
            line(Some((2024, 3)), dec!(334)),
        ];

        let report = by_month(&lines);
        let total: Decimal = report.groups.iter().map(|g| g.stats.percentage).sum();

        assert!((total - dec!(100)).abs() <= dec!(0.02), "sum was {total}");
    }

    #[test]
    fn test_zero_grand_total_yields_zero_shares() {
        let lines = vec![
            line(Some((2024, 1)), dec!(0)),
            line(Some((2024, 2)), dec!(0)),
        ];

        let report = by_month(&lines);

        assert_eq!(report.grand_total_net, Decimal::ZERO);
        assert_eq!(report.average_net, Decimal::ZERO);
        assert!(report.groups.iter().all(|g| g.stats.percentage.is_zero()));
    }

    #[test]
    fn test_by_department_sorts_by_count_descending() {
        let dept = |code: &str, net| PayLine {
            department: Some(code.to_string()),
            net,
            ..Default::default()
        };
        let lines = vec![
            dept("FIN", dec!(100)),
            dept("ENG", dec!(200)),
            dept("ENG", dec!(300)),
            dept("HR", dec!(400)),
        ];

        let report = by_department(&lines);
        let keys = report.groups.iter().map(|g| g.key.as_str()).collect::<Vec<_>>();

        // Count first, then key, so the single-member groups tie-break stably.
        assert_eq!(keys, ["ENG", "FIN", "HR"]);
        assert_eq!(report.groups[0].stats.total_net, dec!(500));
        assert_eq!(report.groups[0].stats.percentage, dec!(50));
    }

    #[test]
    fn test_top_positions_truncates_and_uses_headcount_shares() {
        let mut lines = Vec::new();
        for i in 0..12 {
            for _ in 0..=i {
                lines.push(PayLine {
                    position: Some(format!("position-{i:02}")),
                    ..Default::default()
                });
            }
        }

        let report = top_positions(&lines, TOP_POSITIONS);

        assert_eq!(report.groups.len(), TOP_POSITIONS);
        assert_eq!(report.groups[0].key, "position-11");
        assert_eq!(report.groups[0].stats.count, 12);
        // 12 of 78 lines.
        assert_eq!(report.groups[0].stats.percentage, dec!(15.38));
    }

    #[test]
    fn test_payroll_line_recomputes_net_and_ignores_the_cache() {
        let record = payroll_record::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_id: Uuid::new_v4(),
            month: 12,
            year: 2024,
            basic_salary: dec!(2000),
            allowance_overtime: dec!(100),
            allowance_medical: dec!(50),
            allowance_transportation: dec!(0),
            allowance_other: dec!(0),
            deduction_tax: dec!(200),
            deduction_insurance: dec!(50),
            deduction_loan: dec!(0),
            deduction_other: dec!(0),
            // Deliberately stale cache.
            net_salary: dec!(999999),
            status: PayrollStatus::Pending,
            payment_date: None,
            payment_method: PaymentMethod::BankTransfer,
            comments: None,
            created_by: None,
        };

        let line = PayLine::from(&record);

        assert_eq!(line.period, Some((2024, 12)));
        assert_eq!(line.net, dec!(1900));
    }

    #[test]
    fn test_salary_line_parses_month_and_falls_back_to_created_at() {
        let base = salary_record::Model {
            id: Uuid::new_v4(),
            created_at: Local.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap().into(),
            updated_at: Local::now().into(),
            employee_number: "EMP001".to_string(),
            month: "3".to_string(),
            gross_salary: dec!(1000),
            total_deduction: dec!(1200),
            net_salary: dec!(0),
        };

        let parsed = PayLine::from(&base);
        assert_eq!(parsed.period, Some((2024, 3)));
        assert_eq!(parsed.net, dec!(-200));

        let fallback = PayLine::from(&salary_record::Model {
            month: "March-ish".to_string(),
            ..base
        });
        assert_eq!(fallback.period, Some((2024, 7)));
    }
}
