//! Record store abstraction consumed by the payroll service.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Allowance, AttendanceRecord, CashAdjustment, CashAdvance, Employee, EmployeeId, Holiday, Trip, Utilization,
};
use crate::period::DateRange;

pub use memory::{MemoryData, MemoryStore};

/// Source of employees, attendance and pay ledgers.
///
/// Ledger queries take an optional employee id; `None` means every employee.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Employee with deduction assignments, or `None` when unknown.
    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>>;

    /// Active employee ids in directory order.
    async fn active_employee_ids(&self) -> Result<Vec<EmployeeId>>;

    async fn attendance(&self, employee_id: EmployeeId, range: DateRange) -> Result<Vec<AttendanceRecord>>;

    async fn trips(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Trip>>;

    async fn holidays(&self, range: DateRange) -> Result<Vec<Holiday>>;

    async fn cash_advances(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<CashAdvance>>;

    async fn cash_adjustments(&self, employee_id: Option<EmployeeId>, range: DateRange)
    -> Result<Vec<CashAdjustment>>;

    async fn allowances(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Allowance>>;

    async fn utilizations(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Utilization>>;
}
