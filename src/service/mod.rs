//! Payroll service orchestration.
//!
//! Fetches records through a `RecordStore`, hands them to the calculators and caches the
//! results.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cache::PayrollCache;
use crate::calc::{EmployeeSources, PayrollPath, PayrollPolicy, compute_payslip, compute_row};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::models::{
    AnnualPayroll, Employee, EmployeeId, EmployeeSummary, Holiday, MonthlyPayroll, PayrollRow, PayrollTotals,
    Payslip, SourceKind, StaffType,
};
use crate::period::{DateRange, PayPeriod};
use crate::store::RecordStore;

/// Default bound on employees computed at once in a batch.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Progress of a batch request, logged as it advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Idle,
    Fetching,
    Categorizing,
    Computing,
    Aggregating,
    Done,
}

impl fmt::Display for BatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Categorizing => "categorizing",
            Self::Computing => "computing",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Holidays for a range, and whether the fetch fell back to empty.
struct HolidaySet {
    holidays: Vec<Holiday>,
    failed: bool,
}

/// Computes payroll rows, payslips, monthly tables and annual summaries.
pub struct PayrollService {
    store: Arc<dyn RecordStore>,
    cache: Arc<PayrollCache>,
    policy: PayrollPolicy,
    max_concurrent: usize,
}

impl PayrollService {
    /// Create a service with a fresh cache and default limits.
    pub fn new(store: Arc<dyn RecordStore>, policy: PayrollPolicy) -> Self {
        Self {
            store,
            cache: Arc::new(PayrollCache::default()),
            policy,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Create a service using the cache TTL, batch limit and policies from config.
    pub fn from_config(store: Arc<dyn RecordStore>, config: &AppConfig) -> Self {
        Self::new(store, config.policy.clone())
            .with_cache(Arc::new(PayrollCache::new(Duration::from_secs(config.cache.ttl_secs))))
            .with_max_concurrent(config.batch.max_concurrent_employees)
    }

    /// Use a shared cache.
    pub fn with_cache(mut self, cache: Arc<PayrollCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Payroll row for one employee and month on the monthly-summary path.
    pub async fn compute_employee_payroll(&self, employee_id: EmployeeId, period: PayPeriod) -> Result<PayrollRow> {
        if let Some(row) = self.cache.row(employee_id, period) {
            debug!(employee_id, %period, "Payroll row served from cache");
            return Ok(row);
        }

        let employee = self.require_employee(employee_id).await?;
        let holidays = self.fetch_holidays(period.range()).await;
        Ok(self.compute_and_store_row(&employee, period, &holidays).await)
    }

    /// Printed payslip for one employee and month. Always computed fresh.
    pub async fn compute_payslip(&self, employee_id: EmployeeId, period: PayPeriod) -> Result<Payslip> {
        let employee = self.require_employee(employee_id).await?;
        let range = period.range();
        let (holidays, sources) = tokio::join!(self.fetch_holidays(range), self.fetch_sources(employee_id, range));
        let sources = with_holiday_fallback(sources, &holidays);

        Ok(compute_payslip(&employee, period, &sources, &holidays.holidays, &self.policy))
    }

    /// Payroll table for every active employee in a month.
    pub async fn compute_monthly_payroll(&self, period: PayPeriod) -> Result<MonthlyPayroll> {
        if let Some(payroll) = self.cache.monthly(period) {
            debug!(%period, "Monthly payroll served from cache");
            return Ok(payroll);
        }

        let start = std::time::Instant::now();
        let range = period.range();
        log_stage(period, BatchStage::Idle);

        log_stage(period, BatchStage::Fetching);
        let ids = self.store.active_employee_ids().await?;
        let lookups: Vec<(EmployeeId, Result<Option<Employee>>)> = stream::iter(ids)
            .map(|id| async move { (id, self.store.employee(id).await) })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut employees = Vec::with_capacity(lookups.len());
        let mut skipped = Vec::new();
        for (id, lookup) in lookups {
            match lookup {
                Ok(Some(employee)) => employees.push(employee),
                Ok(None) => {
                    warn!(employee_id = id, %period, "Employee not found, skipping");
                    skipped.push(id);
                }
                Err(e) => {
                    warn!(employee_id = id, %period, error = %e, "Employee lookup failed, skipping");
                    skipped.push(id);
                }
            }
        }
        let holidays = self.fetch_holidays(range).await;

        log_stage(period, BatchStage::Categorizing);
        let field_count = employees.iter().filter(|e| e.is_field_staff()).count();
        info!(
            "{period}: {} employees ({field_count} field, {} office), {} skipped",
            employees.len(),
            employees.len() - field_count,
            skipped.len()
        );

        log_stage(period, BatchStage::Computing);
        let holidays = &holidays;
        let rows: Vec<PayrollRow> = stream::iter(employees.iter())
            .map(|employee| self.cached_row(employee, period, holidays))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        log_stage(period, BatchStage::Aggregating);
        let by_type = |staff_type: StaffType| {
            PayrollTotals::from_rows(rows.iter().filter(|r| r.employee.staff_type == staff_type))
        };
        let payroll = MonthlyPayroll {
            period,
            totals: PayrollTotals::from_rows(&rows),
            field_totals: by_type(StaffType::Field),
            office_totals: by_type(StaffType::Office),
            rows,
            skipped,
        };
        if payroll.rows.iter().any(PayrollRow::used_fallback) {
            warn!(%period, "Monthly payroll used fallback sources, not caching");
        } else {
            self.cache.store_monthly(&payroll);
        }

        log_stage(period, BatchStage::Done);
        info!(
            "Monthly payroll {period} complete: {} rows, net {} (took {:.1}s)",
            payroll.rows.len(),
            payroll.totals.net_pay,
            start.elapsed().as_secs_f64()
        );

        Ok(payroll)
    }

    /// Twelve monthly rows for one employee, fetched as one year.
    pub async fn compute_annual_payroll(&self, employee_id: EmployeeId, year: i32) -> Result<AnnualPayroll> {
        let range = DateRange::year(year)?;
        let periods = PayPeriod::months_of(year)?;

        if let Some(payroll) = self.cache.annual(employee_id, year) {
            debug!(employee_id, year, "Annual payroll served from cache");
            return Ok(payroll);
        }

        let employee = self.require_employee(employee_id).await?;
        let (holidays, sources) = tokio::join!(self.fetch_holidays(range), self.fetch_sources(employee_id, range));
        let sources = with_holiday_fallback(sources, &holidays);

        let months: Vec<PayrollRow> = periods
            .into_iter()
            .map(|period| {
                let row = compute_row(
                    &employee,
                    period,
                    &sources.within(period.range()),
                    &holidays.holidays,
                    PayrollPath::MonthlySummary,
                    &self.policy,
                );
                self.store_row(&row);
                row
            })
            .collect();

        let payroll = AnnualPayroll {
            employee: EmployeeSummary::from(&employee),
            year,
            totals: PayrollTotals::from_rows(&months),
            months,
        };
        if !payroll.months.iter().any(PayrollRow::used_fallback) {
            self.cache.store_annual(&payroll);
        }

        info!(employee_id, year, net = %payroll.totals.net_pay, "Annual payroll complete");
        Ok(payroll)
    }

    /// Drop cached results for an employee, a period, both, or everything.
    pub fn invalidate_cache(&self, employee_id: Option<EmployeeId>, period: Option<PayPeriod>) {
        self.cache.invalidate(employee_id, period);
        info!(?employee_id, period = ?period.map(|p| p.to_string()), "Payroll cache invalidated");
    }

    async fn require_employee(&self, employee_id: EmployeeId) -> Result<Employee> {
        self.store
            .employee(employee_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {employee_id}")))
    }

    async fn cached_row(&self, employee: &Employee, period: PayPeriod, holidays: &HolidaySet) -> PayrollRow {
        match self.cache.row(employee.id, period) {
            Some(row) => row,
            None => self.compute_and_store_row(employee, period, holidays).await,
        }
    }

    async fn compute_and_store_row(&self, employee: &Employee, period: PayPeriod, holidays: &HolidaySet) -> PayrollRow {
        let sources = self.fetch_sources(employee.id, period.range()).await;
        let sources = with_holiday_fallback(sources, holidays);
        let row = compute_row(
            employee,
            period,
            &sources,
            &holidays.holidays,
            PayrollPath::MonthlySummary,
            &self.policy,
        );
        self.store_row(&row);
        row
    }

    /// Rows built from a failed fetch are returned but never cached.
    fn store_row(&self, row: &PayrollRow) {
        if row.used_fallback() {
            debug!(employee_id = row.employee.id, period = %row.period, "Row used fallback sources, not caching");
            return;
        }
        self.cache.store_row(row);
    }

    async fn fetch_holidays(&self, range: DateRange) -> HolidaySet {
        match self.store.holidays(range).await {
            Ok(holidays) => HolidaySet {
                holidays,
                failed: false,
            },
            Err(e) => {
                warn!(%range, error = %e, "Holiday fetch failed, continuing without holidays");
                HolidaySet {
                    holidays: Vec::new(),
                    failed: true,
                }
            }
        }
    }

    /// Fetch one employee's per-source records concurrently.
    async fn fetch_sources(&self, employee_id: EmployeeId, range: DateRange) -> EmployeeSources {
        let id = Some(employee_id);
        let (attendance, trips, cash_advances, cash_adjustments, allowances, utilizations) = tokio::join!(
            self.store.attendance(employee_id, range),
            self.store.trips(id, range),
            self.store.cash_advances(id, range),
            self.store.cash_adjustments(id, range),
            self.store.allowances(id, range),
            self.store.utilizations(id, range),
        );

        let mut fallback = Vec::new();
        let attendance = or_empty(attendance, SourceKind::Attendance, employee_id, &mut fallback);

        EmployeeSources {
            attendance: self.policy.synthetic_attendance.apply(employee_id, attendance),
            trips: or_empty(trips, SourceKind::Trips, employee_id, &mut fallback),
            cash_advances: or_empty(cash_advances, SourceKind::CashAdvances, employee_id, &mut fallback),
            cash_adjustments: or_empty(cash_adjustments, SourceKind::CashAdjustments, employee_id, &mut fallback),
            allowances: or_empty(allowances, SourceKind::Allowances, employee_id, &mut fallback),
            utilizations: or_empty(utilizations, SourceKind::Utilizations, employee_id, &mut fallback),
            fallback,
        }
    }
}

fn log_stage(period: PayPeriod, stage: BatchStage) {
    info!(%period, %stage, "Monthly payroll stage");
}

/// Unwrap a source fetch, substituting an empty collection on failure.
fn or_empty<T>(
    result: Result<Vec<T>>,
    source: SourceKind,
    employee_id: EmployeeId,
    fallback: &mut Vec<SourceKind>,
) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            warn!(employee_id, %source, error = %e, "Source fetch failed, using empty collection");
            fallback.push(source);
            Vec::new()
        }
    }
}

fn with_holiday_fallback(mut sources: EmployeeSources, holidays: &HolidaySet) -> EmployeeSources {
    if holidays.failed {
        sources.fallback.push(SourceKind::Holidays);
    }
    sources
}

#[cfg(test)]
mod tests;
