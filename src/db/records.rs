//! `RecordStore` over the `app` schema.
//!
//! Punch columns are selected as text and parsed as local wall-clock time, so any
//! timezone suffix the driver renders is discarded rather than converted.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::*;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{
    Allowance, AttendanceRecord, Benefit, CashAdjustment, CashAdvance, DeductionCategory, Employee, EmployeeDeduction,
    EmployeeId, Holiday, PaidLeave, StaffType, Trip, Utilization,
};
use crate::period::DateRange;
use crate::store::RecordStore;
use crate::timeutil::parse_wall_clock;

#[derive(Debug, FromQueryResult)]
struct EmployeeRow {
    id: i32,
    full_name: String,
    designation: Option<String>,
    daily_rate: Decimal,
    staff_type: String,
    is_admin: bool,
    is_active: bool,
}

#[derive(Debug, FromQueryResult)]
struct DeductionRow {
    benefit_name: String,
    is_deduction: bool,
    category: Option<String>,
    amount: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct AttendanceRow {
    employee_id: i32,
    work_date: NaiveDate,
    am_in: Option<String>,
    am_out: Option<String>,
    pm_in: Option<String>,
    pm_out: Option<String>,
    ot_in: Option<String>,
    ot_out: Option<String>,
    leave_type: Option<String>,
    leave_fraction: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct TripRow {
    employee_id: i32,
    trip_date: NaiveDate,
    per_trip: Decimal,
    trip_no: Option<i32>,
}

#[derive(Debug, FromQueryResult)]
struct HolidayRow {
    holiday_date: NaiveDate,
    name: Option<String>,
    holiday_type: String,
}

#[derive(Debug, FromQueryResult)]
struct CashAdvanceRow {
    employee_id: i32,
    amount: Decimal,
    requested_on: NaiveDate,
}

#[derive(Debug, FromQueryResult)]
struct CashAdjustmentRow {
    employee_id: i32,
    amount: Decimal,
    adjustment_date: NaiveDate,
    is_deduction: bool,
    note: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct AllowanceRow {
    employee_id: i32,
    allowance_date: NaiveDate,
    amount: Decimal,
    description: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct UtilizationRow {
    employee_id: i32,
    utilization_date: NaiveDate,
    hours: Decimal,
    per_hour: Decimal,
    overtime_hours: Option<Decimal>,
}

impl EmployeeRow {
    fn into_employee(self, deductions: Vec<DeductionRow>) -> Result<Employee> {
        let staff_type: StaffType = self.staff_type.parse()?;
        let deductions = deductions
            .into_iter()
            .map(|row| EmployeeDeduction {
                benefit: Benefit {
                    category: row.category.as_deref().and_then(|c| match c.parse::<DeductionCategory>() {
                        Ok(category) => Some(category),
                        Err(e) => {
                            debug!(employee_id = self.id, benefit = %row.benefit_name, "{e}, inferring from name");
                            None
                        }
                    }),
                    name: row.benefit_name,
                    is_deduction: row.is_deduction,
                },
                amount: row.amount,
            })
            .collect();

        Ok(Employee {
            id: self.id,
            full_name: self.full_name,
            designation: self.designation,
            daily_rate: self.daily_rate,
            staff_type,
            is_admin: self.is_admin,
            is_active: self.is_active,
            deductions,
        })
    }
}

/// Parse one punch column; malformed values become a missing punch.
fn punch(employee_id: i32, date: NaiveDate, column: &str, raw: Option<String>) -> Option<NaiveTime> {
    let raw = raw?;
    let parsed = parse_wall_clock(&raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        debug!(employee_id, %date, column, raw = %raw, "Unparseable punch treated as missing");
    }
    parsed
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        let (id, date) = (row.employee_id, row.work_date);
        Self {
            employee_id: id,
            date,
            am_in: punch(id, date, "am_in", row.am_in),
            am_out: punch(id, date, "am_out", row.am_out),
            pm_in: punch(id, date, "pm_in", row.pm_in),
            pm_out: punch(id, date, "pm_out", row.pm_out),
            overtime_in: punch(id, date, "ot_in", row.ot_in),
            overtime_out: punch(id, date, "ot_out", row.ot_out),
            leave: row.leave_type.map(|leave_type| PaidLeave {
                leave_type,
                fraction: row.leave_fraction.unwrap_or(Decimal::ONE),
            }),
        }
    }
}

impl Trip {
    /// A missing trip count means one trip. Negative counts are dropped.
    fn try_from_row(row: TripRow) -> Option<Self> {
        let trip_no = row.trip_no.unwrap_or(1);
        let Ok(trip_no) = u32::try_from(trip_no) else {
            warn!(
                employee_id = row.employee_id,
                date = %row.trip_date,
                trip_no,
                "Negative trip count, skipping trip"
            );
            return None;
        };

        Some(Trip {
            employee_id: row.employee_id,
            date: row.trip_date,
            per_trip: row.per_trip,
            trip_no,
        })
    }
}

fn statement(sql: &str, values: impl IntoIterator<Item = Value>) -> Statement {
    Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
}

/// Record store backed by a PostgreSQL connection pool.
#[derive(Debug)]
pub struct PgRecordStore {
    db: DatabaseConnection,
}

impl PgRecordStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
        let row = EmployeeRow::find_by_statement(statement(
            r#"
            SELECT id, full_name, designation, daily_rate, staff_type, is_admin, is_active
            FROM app.employees
            WHERE id = $1
            "#,
            [id.into()],
        ))
        .one(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let deductions = DeductionRow::find_by_statement(statement(
            r#"
            SELECT b.name AS benefit_name, b.is_deduction, b.category, ed.amount
            FROM app.employee_deductions ed
            JOIN app.benefits b ON b.id = ed.benefit_id
            WHERE ed.employee_id = $1
            ORDER BY b.name
            "#,
            [id.into()],
        ))
        .all(&self.db)
        .await?;

        row.into_employee(deductions).map(Some)
    }

    async fn active_employee_ids(&self) -> Result<Vec<EmployeeId>> {
        let rows = self
            .db
            .query_all(statement(
                "SELECT id FROM app.employees WHERE is_active ORDER BY full_name, id",
                [],
            ))
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get::<i32>("", "id")?);
        }
        Ok(ids)
    }

    async fn attendance(&self, employee_id: EmployeeId, range: DateRange) -> Result<Vec<AttendanceRecord>> {
        let rows = AttendanceRow::find_by_statement(statement(
            r#"
            SELECT
                employee_id,
                work_date,
                am_in::text AS am_in,
                am_out::text AS am_out,
                pm_in::text AS pm_in,
                pm_out::text AS pm_out,
                ot_in::text AS ot_in,
                ot_out::text AS ot_out,
                leave_type,
                leave_fraction
            FROM app.attendance
            WHERE employee_id = $1 AND work_date BETWEEN $2 AND $3
            ORDER BY work_date
            "#,
            [employee_id.into(), range.start.into(), range.end.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    async fn trips(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Trip>> {
        let rows = TripRow::find_by_statement(statement(
            r#"
            SELECT employee_id, trip_date, per_trip, trip_no
            FROM app.trips
            WHERE ($1::int4 IS NULL OR employee_id = $1) AND trip_date BETWEEN $2 AND $3
            ORDER BY trip_date, employee_id
            "#,
            [employee_id.into(), range.start.into(), range.end.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows.into_iter().filter_map(Trip::try_from_row).collect())
    }

    async fn holidays(&self, range: DateRange) -> Result<Vec<Holiday>> {
        let rows = HolidayRow::find_by_statement(statement(
            r#"
            SELECT holiday_date, name, holiday_type
            FROM app.holidays
            WHERE holiday_date BETWEEN $1 AND $2
            ORDER BY holiday_date
            "#,
            [range.start.into(), range.end.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Holiday {
                date: row.holiday_date,
                name: row.name.unwrap_or_default(),
                kind: row.holiday_type,
            })
            .collect())
    }

    async fn cash_advances(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<CashAdvance>> {
        let rows = CashAdvanceRow::find_by_statement(statement(
            r#"
            SELECT employee_id, amount, requested_on
            FROM app.cash_advances
            WHERE ($1::int4 IS NULL OR employee_id = $1) AND requested_on BETWEEN $2 AND $3
            ORDER BY requested_on, employee_id
            "#,
            [employee_id.into(), range.start.into(), range.end.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CashAdvance {
                employee_id: row.employee_id,
                amount: row.amount,
                requested_on: row.requested_on,
            })
            .collect())
    }

    async fn cash_adjustments(
        &self,
        employee_id: Option<EmployeeId>,
        range: DateRange,
    ) -> Result<Vec<CashAdjustment>> {
        let rows = CashAdjustmentRow::find_by_statement(statement(
            r#"
            SELECT employee_id, amount, adjustment_date, is_deduction, note
            FROM app.cash_adjustments
            WHERE ($1::int4 IS NULL OR employee_id = $1) AND adjustment_date BETWEEN $2 AND $3
            ORDER BY adjustment_date, employee_id
            "#,
            [employee_id.into(), range.start.into(), range.end.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CashAdjustment {
                employee_id: row.employee_id,
                amount: row.amount,
                date: row.adjustment_date,
                is_deduction: row.is_deduction,
                note: row.note,
            })
            .collect())
    }

    async fn allowances(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Allowance>> {
        let rows = AllowanceRow::find_by_statement(statement(
            r#"
            SELECT employee_id, allowance_date, amount, description
            FROM app.allowances
            WHERE ($1::int4 IS NULL OR employee_id = $1) AND allowance_date BETWEEN $2 AND $3
            ORDER BY allowance_date, employee_id
            "#,
            [employee_id.into(), range.start.into(), range.end.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Allowance {
                employee_id: row.employee_id,
                date: row.allowance_date,
                amount: row.amount,
                description: row.description,
            })
            .collect())
    }

    async fn utilizations(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Utilization>> {
        let rows = UtilizationRow::find_by_statement(statement(
            r#"
            SELECT employee_id, utilization_date, hours, per_hour, overtime_hours
            FROM app.utilizations
            WHERE ($1::int4 IS NULL OR employee_id = $1) AND utilization_date BETWEEN $2 AND $3
            ORDER BY utilization_date, employee_id
            "#,
            [employee_id.into(), range.start.into(), range.end.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Utilization {
                employee_id: row.employee_id,
                date: row.utilization_date,
                hours: row.hours,
                per_hour: row.per_hour,
                overtime_hours: row.overtime_hours,
            })
            .collect())
    }
}
