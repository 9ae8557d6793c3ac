//! Time-bounded result cache for computed payroll.
//!
//! Entries expire a fixed interval after insertion. Expiry is measured with the tokio
//! clock so paused-time tests can advance past it.

use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::models::{AnnualPayroll, EmployeeId, MonthlyPayroll, PayrollRow};
use crate::period::PayPeriod;

/// Default freshness window (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Concurrent map whose entries expire after a fixed TTL. Last write wins.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh value for `key`. Expired entries are evicted on access.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key)
            && entry.expires_at > now
        {
            return Some(entry.value.clone());
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop every entry whose key matches.
    pub fn remove_where(&self, mut matches: impl FnMut(&K) -> bool) {
        self.entries.retain(|key, _| !matches(key));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cached payroll results keyed by employee, period and year.
pub struct PayrollCache {
    rows: TtlCache<(EmployeeId, PayPeriod), PayrollRow>,
    months: TtlCache<PayPeriod, MonthlyPayroll>,
    years: TtlCache<(EmployeeId, i32), AnnualPayroll>,
}

impl Default for PayrollCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl PayrollCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            rows: TtlCache::new(ttl),
            months: TtlCache::new(ttl),
            years: TtlCache::new(ttl),
        }
    }

    pub fn row(&self, employee_id: EmployeeId, period: PayPeriod) -> Option<PayrollRow> {
        self.rows.get(&(employee_id, period))
    }

    pub fn store_row(&self, row: &PayrollRow) {
        self.rows.insert((row.employee.id, row.period), row.clone());
    }

    pub fn monthly(&self, period: PayPeriod) -> Option<MonthlyPayroll> {
        self.months.get(&period)
    }

    pub fn store_monthly(&self, payroll: &MonthlyPayroll) {
        self.months.insert(payroll.period, payroll.clone());
    }

    pub fn annual(&self, employee_id: EmployeeId, year: i32) -> Option<AnnualPayroll> {
        self.years.get(&(employee_id, year))
    }

    pub fn store_annual(&self, payroll: &AnnualPayroll) {
        self.years.insert((payroll.employee.id, payroll.year), payroll.clone());
    }

    /// Drop entries for an employee, a period, both, or everything.
    ///
    /// Monthly batches contain every employee, so any invalidation touching their period
    /// drops them as well.
    pub fn invalidate(&self, employee_id: Option<EmployeeId>, period: Option<PayPeriod>) {
        if employee_id.is_none() && period.is_none() {
            self.rows.clear();
            self.months.clear();
            self.years.clear();
            tracing::debug!("Cleared payroll cache");
            return;
        }

        let employee_matches = |id: EmployeeId| employee_id.is_none_or(|e| e == id);
        let period_matches = |p: PayPeriod| period.is_none_or(|q| q == p);

        self.rows
            .remove_where(|(id, p)| employee_matches(*id) && period_matches(*p));
        self.months.remove_where(|p| period_matches(*p));
        self.years
            .remove_where(|(id, year)| employee_matches(*id) && period.is_none_or(|q| q.year() == *year));

        tracing::debug!(?employee_id, ?period, "Invalidated payroll cache");
    }
}
