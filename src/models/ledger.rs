//! Ancillary pay ledger entries: trips, holidays, cash movements, allowances, utilizations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::EmployeeId;

/// Trip paid per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub per_trip: Decimal,
    #[serde(default = "default_trip_no")]
    pub trip_no: u32,
}

fn default_trip_no() -> u32 {
    1
}

impl Trip {
    /// Earnings contribution: rate times number of trips.
    pub fn amount(&self) -> Decimal {
        self.per_trip * Decimal::from(self.trip_no)
    }
}

/// Company or government holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default)]
    pub name: String,
    /// Free-form type tag, e.g. "RH", "SNH", "SWH".
    pub kind: String,
}

/// Cash advance; always deducted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashAdvance {
    pub employee_id: EmployeeId,
    pub amount: Decimal,
    pub requested_on: NaiveDate,
}

/// Signed cash adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashAdjustment {
    pub employee_id: EmployeeId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub is_deduction: bool,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Equipment or vehicle utilization paid by the hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilization {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub per_hour: Decimal,
    #[serde(default)]
    pub overtime_hours: Option<Decimal>,
}
