//! Earnings aggregation into gross pay.

use rust_decimal::Decimal;

use crate::models::{Allowance, CashAdjustment, Employee, Trip, Utilization};
use crate::money;

/// Independently computed earning components.
///
/// Components are commutative addends; a source with no records contributes zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Earnings {
    pub basic_pay: Decimal,
    pub trips_pay: Decimal,
    pub holidays_pay: Decimal,
    pub overtime_pay: Decimal,
    pub sunday_amount: Decimal,
    /// Non-deduction benefits (allowance, COLA).
    pub benefits_pay: Decimal,
    pub utilizations_pay: Decimal,
    pub allowances_pay: Decimal,
    pub cash_adjustment_pay: Decimal,
}

impl Earnings {
    pub fn gross(&self) -> Decimal {
        self.basic_pay
            + self.trips_pay
            + self.holidays_pay
            + self.overtime_pay
            + self.sunday_amount
            + self.benefits_pay
            + self.utilizations_pay
            + self.allowances_pay
            + self.cash_adjustment_pay
    }

    /// Every component rounded to presentation precision.
    pub fn rounded(&self) -> Self {
        Self {
            basic_pay: money::round(self.basic_pay),
            trips_pay: money::round(self.trips_pay),
            holidays_pay: money::round(self.holidays_pay),
            overtime_pay: money::round(self.overtime_pay),
            sunday_amount: money::round(self.sunday_amount),
            benefits_pay: money::round(self.benefits_pay),
            utilizations_pay: money::round(self.utilizations_pay),
            allowances_pay: money::round(self.allowances_pay),
            cash_adjustment_pay: money::round(self.cash_adjustment_pay),
        }
    }
}

/// Basic pay from days worked.
pub fn basic_pay(days_worked: Decimal, daily_rate: Decimal) -> Decimal {
    days_worked * daily_rate
}

/// Basic pay from minutes at the hourly rate.
pub fn hourly_basic_pay(minutes: i64, daily_rate: Decimal) -> Decimal {
    money::minutes_value(daily_rate, minutes)
}

pub fn trips_pay(trips: &[Trip]) -> Decimal {
    money::sum(trips.iter().map(Trip::amount))
}

/// Regular hours at the hourly rate plus overtime hours at 1.25x.
pub fn utilization_pay(utilization: &Utilization) -> Decimal {
    let regular = utilization.hours * utilization.per_hour;
    let overtime = utilization.overtime_hours.unwrap_or(Decimal::ZERO) * utilization.per_hour * money::OVERTIME_MULTIPLIER;
    regular + overtime
}

pub fn utilizations_pay(utilizations: &[Utilization]) -> Decimal {
    money::sum(utilizations.iter().map(utilization_pay))
}

pub fn allowances_pay(allowances: &[Allowance]) -> Decimal {
    money::sum(allowances.iter().map(|a| a.amount))
}

/// Non-deduction benefit amounts assigned to the employee.
pub fn earning_benefits_pay(employee: &Employee) -> Decimal {
    money::sum(employee.earning_benefits().map(|d| d.amount))
}

/// Cash adjustments that add to pay.
pub fn cash_adjustment_additions(adjustments: &[CashAdjustment]) -> Decimal {
    money::sum(adjustments.iter().filter(|a| !a.is_deduction).map(|a| a.amount))
}
