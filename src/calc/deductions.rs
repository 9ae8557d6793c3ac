//! Deductions aggregation and net pay.

use rust_decimal::Decimal;

use crate::models::{CashAdjustment, CashAdvance, DeductionBreakdown, Employee};
use crate::money;

/// Cash adjustments that reduce pay.
pub fn cash_adjustment_deductions(adjustments: &[CashAdjustment]) -> Decimal {
    money::sum(adjustments.iter().filter(|a| a.is_deduction).map(|a| a.amount))
}

pub fn cash_advances_total(advances: &[CashAdvance]) -> Decimal {
    money::sum(advances.iter().map(|a| a.amount))
}

/// Itemized deductions at full precision, with `total` filled in.
pub fn build_breakdown(
    employee: &Employee,
    cash_advances: &[CashAdvance],
    cash_adjustments: &[CashAdjustment],
    late: Decimal,
    undertime: Decimal,
) -> DeductionBreakdown {
    let mut breakdown = DeductionBreakdown {
        cash_advance: cash_advances_total(cash_advances),
        late,
        undertime,
        cash_adjustment: cash_adjustment_deductions(cash_adjustments),
        ..Default::default()
    };

    for assignment in employee.deduction_benefits() {
        *breakdown.category_mut(assignment.benefit.category()) += assignment.amount;
    }

    breakdown.total = breakdown.itemized_sum();
    breakdown
}

/// Round every item, then total the rounded items.
pub fn round_breakdown(breakdown: &DeductionBreakdown) -> DeductionBreakdown {
    let mut rounded = DeductionBreakdown {
        cash_advance: money::round(breakdown.cash_advance),
        sss: money::round(breakdown.sss),
        phic: money::round(breakdown.phic),
        pagibig: money::round(breakdown.pagibig),
        sss_loan: money::round(breakdown.sss_loan),
        savings: money::round(breakdown.savings),
        salary_deposit: money::round(breakdown.salary_deposit),
        other: money::round(breakdown.other),
        late: money::round(breakdown.late),
        undertime: money::round(breakdown.undertime),
        cash_adjustment: money::round(breakdown.cash_adjustment),
        total: Decimal::ZERO,
    };
    rounded.total = rounded.itemized_sum();
    rounded
}

pub fn net_pay(gross_pay: Decimal, breakdown: &DeductionBreakdown) -> Decimal {
    gross_pay - breakdown.total
}
