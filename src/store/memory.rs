//! In-memory record store, loadable from a JSON fixture.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{
    Allowance, AttendanceRecord, CashAdjustment, CashAdvance, Employee, EmployeeId, Holiday, SourceKind, Trip,
    Utilization,
};
use crate::period::DateRange;

/// Everything a `MemoryStore` serves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryData {
    pub employees: Vec<Employee>,
    /// Directory order; defaults to the active employees as listed.
    pub directory: Option<Vec<EmployeeId>>,
    pub attendance: Vec<AttendanceRecord>,
    pub trips: Vec<Trip>,
    pub holidays: Vec<Holiday>,
    pub cash_advances: Vec<CashAdvance>,
    pub cash_adjustments: Vec<CashAdjustment>,
    pub allowances: Vec<Allowance>,
    pub utilizations: Vec<Utilization>,
}

/// Record store backed by vectors.
///
/// Individual sources can be made to fail, and every query is counted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: MemoryData,
    failing: Mutex<HashSet<SourceKind>>,
    directory_failing: AtomicBool,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new(data: MemoryData) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    /// Load a JSON fixture file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let data: MemoryData = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded fixture {:?}: {} employees, {} attendance records",
            path,
            data.employees.len(),
            data.attendance.len()
        );
        Ok(Self::new(data))
    }

    /// Make every query for `source` fail until cleared.
    pub fn fail_source(&self, source: SourceKind) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(source);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
        self.directory_failing.store(false, Ordering::SeqCst);
    }

    /// Make the employee directory query fail.
    pub fn fail_directory(&self) {
        self.directory_failing.store(true, Ordering::SeqCst);
    }

    /// Number of queries served so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn begin(&self, source: SourceKind) -> Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(&source))
            .unwrap_or(false);
        if failing {
            return Err(AppError::store(format!("{source} unavailable")));
        }
        Ok(())
    }

    fn select<T: Clone>(
        items: &[T],
        employee_id: Option<EmployeeId>,
        range: DateRange,
        key: impl Fn(&T) -> (EmployeeId, NaiveDate),
    ) -> Vec<T> {
        items
            .iter()
            .filter(|item| {
                let (owner, date) = key(item);
                employee_id.is_none_or(|id| id == owner) && range.contains(date)
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.data.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn active_employee_ids(&self) -> Result<Vec<EmployeeId>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.directory_failing.load(Ordering::SeqCst) {
            return Err(AppError::store("employee directory unavailable"));
        }
        if let Some(directory) = &self.data.directory {
            return Ok(directory.clone());
        }
        Ok(self
            .data
            .employees
            .iter()
            .filter(|e| e.is_active)
            .map(|e| e.id)
            .collect())
    }

    async fn attendance(&self, employee_id: EmployeeId, range: DateRange) -> Result<Vec<AttendanceRecord>> {
        self.begin(SourceKind::Attendance)?;
        let mut records = Self::select(&self.data.attendance, Some(employee_id), range, |r| (r.employee_id, r.date));
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    async fn trips(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Trip>> {
        self.begin(SourceKind::Trips)?;
        Ok(Self::select(&self.data.trips, employee_id, range, |t| (t.employee_id, t.date)))
    }

    async fn holidays(&self, range: DateRange) -> Result<Vec<Holiday>> {
        self.begin(SourceKind::Holidays)?;
        Ok(self
            .data
            .holidays
            .iter()
            .filter(|h| range.contains(h.date))
            .cloned()
            .collect())
    }

    async fn cash_advances(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<CashAdvance>> {
        self.begin(SourceKind::CashAdvances)?;
        Ok(Self::select(&self.data.cash_advances, employee_id, range, |a| {
            (a.employee_id, a.requested_on)
        }))
    }

    async fn cash_adjustments(
        &self,
        employee_id: Option<EmployeeId>,
        range: DateRange,
    ) -> Result<Vec<CashAdjustment>> {
        self.begin(SourceKind::CashAdjustments)?;
        Ok(Self::select(&self.data.cash_adjustments, employee_id, range, |a| {
            (a.employee_id, a.date)
        }))
    }

    async fn allowances(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Allowance>> {
        self.begin(SourceKind::Allowances)?;
        Ok(Self::select(&self.data.allowances, employee_id, range, |a| (a.employee_id, a.date)))
    }

    async fn utilizations(&self, employee_id: Option<EmployeeId>, range: DateRange) -> Result<Vec<Utilization>> {
        self.begin(SourceKind::Utilizations)?;
        Ok(Self::select(&self.data.utilizations, employee_id, range, |u| (u.employee_id, u.date)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PayPeriod;

    const FIXTURE: &str = r#"{
        "employees": [
            {"id": 1, "full_name": "Ana Cruz", "daily_rate": "800", "staff_type": "office"},
            {"id": 2, "full_name": "Ben Reyes", "daily_rate": "650", "staff_type": "field", "is_active": false}
        ],
        "attendance": [
            {"employee_id": 1, "date": "2024-05-07", "am_in": "08:00:00", "am_out": "12:00:00"},
            {"employee_id": 1, "date": "2024-05-06", "pm_in": "13:00:00", "pm_out": "17:00:00"},
            {"employee_id": 1, "date": "2024-06-03", "am_in": "08:00:00"}
        ],
        "trips": [
            {"employee_id": 1, "date": "2024-05-08", "per_trip": "150"},
            {"employee_id": 2, "date": "2024-05-08", "per_trip": "150", "trip_no": 3}
        ],
        "holidays": [{"date": "2024-05-01", "name": "Labor Day", "kind": "RH"}]
    }"#;

    fn store() -> MemoryStore {
        MemoryStore::new(serde_json::from_str(FIXTURE).unwrap())
    }

    fn may() -> DateRange {
        PayPeriod::new(2024, 5).unwrap().range()
    }

    #[tokio::test]
    async fn test_fixture_queries() {
        let store = store();
        assert_eq!(store.active_employee_ids().await.unwrap(), vec![1]);
        assert!(store.employee(2).await.unwrap().is_some());
        assert!(store.employee(99).await.unwrap().is_none());

        let attendance = store.attendance(1, may()).await.unwrap();
        assert_eq!(attendance.len(), 2);
        assert!(attendance[0].date < attendance[1].date);

        assert_eq!(store.trips(None, may()).await.unwrap().len(), 2);
        assert_eq!(store.trips(Some(2), may()).await.unwrap()[0].trip_no, 3);
        assert_eq!(store.holidays(may()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection_and_counter() {
        let store = store();
        store.fail_source(SourceKind::Trips);
        assert!(store.trips(Some(1), may()).await.is_err());
        assert!(store.holidays(may()).await.is_ok());
        assert_eq!(store.query_count(), 2);

        store.fail_directory();
        assert!(store.active_employee_ids().await.is_err());

        store.clear_failures();
        assert!(store.trips(Some(1), may()).await.is_ok());
        assert!(store.active_employee_ids().await.is_ok());
    }
}
