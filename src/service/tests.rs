//! Tests for the payroll service against an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use super::*;
use crate::calc::policy::SyntheticAttendanceRule;
use crate::models::{AttendanceRecord, Trip};
use crate::store::{MemoryData, MemoryStore};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn may(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn period() -> PayPeriod {
    PayPeriod::new(2024, 5).unwrap()
}

fn employee(id: EmployeeId, staff_type: StaffType, rate: i64) -> Employee {
    Employee {
        id,
        full_name: format!("Employee {id}"),
        designation: None,
        daily_rate: Decimal::from(rate),
        staff_type,
        is_admin: false,
        is_active: true,
        deductions: vec![],
    }
}

/// Office employee 1 at 800 and field employee 2 at 650, one Monday each.
fn sample_data() -> MemoryData {
    MemoryData {
        employees: vec![employee(1, StaffType::Office, 800), employee(2, StaffType::Field, 650)],
        attendance: vec![
            AttendanceRecord::new(1, may(6))
                .with_am(t(8, 0), t(12, 0))
                .with_pm(t(13, 0), t(17, 10)),
            AttendanceRecord::new(2, may(6))
                .with_am(t(7, 0), t(11, 30))
                .with_pm(t(13, 0), t(16, 0)),
        ],
        trips: vec![Trip {
            employee_id: 2,
            date: may(8),
            per_trip: Decimal::from(100),
            trip_no: 2,
        }],
        ..Default::default()
    }
}

fn service_with(data: MemoryData, policy: PayrollPolicy) -> (Arc<MemoryStore>, PayrollService) {
    let store = Arc::new(MemoryStore::new(data));
    let service = PayrollService::new(store.clone(), policy);
    (store, service)
}

fn build_service(data: MemoryData) -> (Arc<MemoryStore>, PayrollService) {
    service_with(data, PayrollPolicy::default())
}

#[tokio::test]
async fn test_office_employee_row() {
    let (_, service) = build_service(sample_data());
    let row = service.compute_employee_payroll(1, period()).await.unwrap();

    assert_eq!(row.days_worked, Decimal::ONE);
    assert_eq!(row.hours_worked, Decimal::from(8));
    assert_eq!(row.basic_pay, Decimal::from(800));
    assert_eq!(row.net_pay, Decimal::from(800));
    assert!(row.fallback_sources.is_empty());
}

#[tokio::test]
async fn test_field_employee_row() {
    let (_, service) = build_service(sample_data());
    let row = service.compute_employee_payroll(2, period()).await.unwrap();

    assert_eq!(row.days_worked, Decimal::ONE);
    assert_eq!(row.hours_worked, Decimal::new(75, 1));
    assert_eq!(row.basic_pay, Decimal::from(650));
    assert_eq!(row.trips_pay, Decimal::from(200));
    assert_eq!(row.gross_pay, Decimal::from(850));
    assert_eq!(row.undertime_minutes, 0);
}

#[tokio::test]
async fn test_missing_employee_is_not_found() {
    let (_, service) = build_service(sample_data());
    let err = service.compute_employee_payroll(99, period()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service.compute_payslip(99, period()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_invalid_year_rejected() {
    let (_, service) = build_service(sample_data());
    let err = service.compute_annual_payroll(1, 10_000).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidPeriod(_)));
}

#[tokio::test]
async fn test_failed_source_falls_back_to_empty() {
    let (store, service) = build_service(sample_data());
    store.fail_source(SourceKind::Trips);

    let row = service.compute_employee_payroll(2, period()).await.unwrap();
    assert_eq!(row.trips_pay, Decimal::ZERO);
    assert_eq!(row.gross_pay, Decimal::from(650));
    assert_eq!(row.fallback_sources, vec![SourceKind::Trips]);
}

#[tokio::test]
async fn test_fallback_row_not_cached_after_recovery() {
    let (store, service) = build_service(sample_data());
    store.fail_source(SourceKind::Trips);
    let degraded = service.compute_employee_payroll(2, period()).await.unwrap();
    assert_eq!(degraded.trips_pay, Decimal::ZERO);

    store.clear_failures();
    let row = service.compute_employee_payroll(2, period()).await.unwrap();
    assert!(row.fallback_sources.is_empty());
    assert_eq!(row.trips_pay, Decimal::from(200));
}

#[tokio::test]
async fn test_fallback_monthly_payroll_not_cached() {
    let (store, service) = build_service(sample_data());
    store.fail_source(SourceKind::Holidays);
    let degraded = service.compute_monthly_payroll(period()).await.unwrap();
    assert!(degraded.rows.iter().all(PayrollRow::used_fallback));

    store.clear_failures();
    let payroll = service.compute_monthly_payroll(period()).await.unwrap();
    assert!(payroll.rows.iter().all(|row| row.fallback_sources.is_empty()));
}

#[tokio::test]
async fn test_failed_attendance_yields_zero_days() {
    let (store, service) = build_service(sample_data());
    store.fail_source(SourceKind::Attendance);

    let row = service.compute_employee_payroll(1, period()).await.unwrap();
    assert_eq!(row.days_worked, Decimal::ZERO);
    assert_eq!(row.net_pay, Decimal::ZERO);
    assert!(row.used_fallback());
}

#[tokio::test]
async fn test_monthly_payroll_totals_by_staff_type() {
    let (_, service) = build_service(sample_data());
    let payroll = service.compute_monthly_payroll(period()).await.unwrap();

    let ids: Vec<_> = payroll.rows.iter().map(|r| r.employee.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(payroll.skipped.is_empty());

    assert_eq!(payroll.totals.employees, 2);
    assert_eq!(payroll.field_totals.employees, 1);
    assert_eq!(payroll.office_totals.employees, 1);
    assert_eq!(payroll.totals.gross_pay, Decimal::from(1650));
    assert_eq!(
        payroll.field_totals.net_pay + payroll.office_totals.net_pay,
        payroll.totals.net_pay
    );
    for row in &payroll.rows {
        assert_eq!(row.gross_pay - row.deductions.total, row.net_pay);
    }
}

#[tokio::test]
async fn test_monthly_payroll_skips_missing_employee() {
    let mut data = sample_data();
    data.directory = Some(vec![2, 99, 1]);
    let (_, service) = build_service(data);

    let payroll = service.compute_monthly_payroll(period()).await.unwrap();
    let ids: Vec<_> = payroll.rows.iter().map(|r| r.employee.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(payroll.skipped, vec![99]);
}

#[tokio::test]
async fn test_directory_failure_fails_batch() {
    let (store, service) = build_service(sample_data());
    store.fail_directory();
    assert!(service.compute_monthly_payroll(period()).await.is_err());
}

#[tokio::test]
async fn test_holiday_failure_marks_every_row() {
    let (store, service) = build_service(sample_data());
    store.fail_source(SourceKind::Holidays);

    let payroll = service.compute_monthly_payroll(period()).await.unwrap();
    assert_eq!(payroll.rows.len(), 2);
    for row in &payroll.rows {
        assert!(row.fallback_sources.contains(&SourceKind::Holidays));
    }
}

#[tokio::test]
async fn test_holiday_pay_in_batch() {
    let mut data = sample_data();
    data.holidays = vec![Holiday {
        date: may(1),
        name: "Labor Day".to_string(),
        kind: "RH".to_string(),
    }];
    let (_, service) = build_service(data);

    let payroll = service.compute_monthly_payroll(period()).await.unwrap();
    assert_eq!(payroll.rows[0].holidays_pay, Decimal::from(1600));
    assert_eq!(payroll.rows[1].holidays_pay, Decimal::from(1300));
}

#[tokio::test]
async fn test_cache_hit_short_circuits_fetches() {
    let (store, service) = build_service(sample_data());

    let first = service.compute_monthly_payroll(period()).await.unwrap();
    let queries = store.query_count();
    let second = service.compute_monthly_payroll(period()).await.unwrap();

    assert_eq!(store.query_count(), queries);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_batch_reuses_cached_rows() {
    let (store, service) = build_service(sample_data());
    service.compute_employee_payroll(1, period()).await.unwrap();
    service.compute_employee_payroll(2, period()).await.unwrap();

    let before = store.query_count();
    service.compute_monthly_payroll(period()).await.unwrap();
    // Directory, two lookups and holidays; no per-employee sources.
    assert_eq!(store.query_count() - before, 4);
}

#[tokio::test(start_paused = true)]
async fn test_cache_expires_after_ttl() {
    let (store, service) = build_service(sample_data());

    service.compute_employee_payroll(1, period()).await.unwrap();
    let queries = store.query_count();

    tokio::time::advance(Duration::from_secs(299)).await;
    service.compute_employee_payroll(1, period()).await.unwrap();
    assert_eq!(store.query_count(), queries);

    tokio::time::advance(Duration::from_secs(2)).await;
    service.compute_employee_payroll(1, period()).await.unwrap();
    assert!(store.query_count() > queries);
}

#[tokio::test]
async fn test_invalidate_cache_forces_recompute() {
    let (store, service) = build_service(sample_data());

    let before = service.compute_employee_payroll(1, period()).await.unwrap();
    service.invalidate_cache(Some(1), None);
    let queries = store.query_count();

    let after = service.compute_employee_payroll(1, period()).await.unwrap();
    assert!(store.query_count() > queries);
    assert_eq!(before, after);

    // Employee 2 was never cached under employee 1's invalidation.
    service.compute_employee_payroll(2, period()).await.unwrap();
    let queries = store.query_count();
    service.invalidate_cache(Some(1), Some(period()));
    service.compute_employee_payroll(2, period()).await.unwrap();
    assert_eq!(store.query_count(), queries);
}

#[tokio::test]
async fn test_bounded_concurrency_keeps_directory_order() {
    let mut data = sample_data();
    data.employees.push(employee(3, StaffType::Office, 500));
    data.directory = Some(vec![3, 1, 2]);

    let (_, sequential) = build_service(data.clone());
    let sequential = sequential.with_max_concurrent(1);
    let (_, parallel) = build_service(data);

    let a = sequential.compute_monthly_payroll(period()).await.unwrap();
    let b = parallel.compute_monthly_payroll(period()).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.rows[0].employee.id, 3);
}

#[tokio::test]
async fn test_annual_payroll_matches_monthly_rows() {
    let mut data = sample_data();
    data.attendance.push(
        AttendanceRecord::new(2, NaiveDate::from_ymd_opt(2024, 11, 4).unwrap()).with_am(t(7, 0), t(11, 0)),
    );
    let (store, service) = build_service(data.clone());

    let annual = service.compute_annual_payroll(2, 2024).await.unwrap();
    assert_eq!(annual.months.len(), 12);
    assert_eq!(annual.months[4].gross_pay, Decimal::from(850));
    assert_eq!(annual.months[10].days_worked, Decimal::new(5, 1));
    assert_eq!(annual.totals.gross_pay, Decimal::from(850) + Decimal::from(325));

    let (_, fresh) = build_service(data);
    let may_row = fresh.compute_employee_payroll(2, period()).await.unwrap();
    assert_eq!(annual.months[4], may_row);

    let queries = store.query_count();
    service.compute_annual_payroll(2, 2024).await.unwrap();
    assert_eq!(store.query_count(), queries);
}

#[tokio::test]
async fn test_payslip_uses_daily_print_path() {
    let (store, service) = build_service(sample_data());

    let payslip = service.compute_payslip(2, period()).await.unwrap();
    // 450 minutes at 650 per 480 minutes
    assert_eq!(payslip.row.basic_pay, Decimal::new(60938, 2));
    assert_eq!(payslip.row.undertime_minutes, 80);
    assert_eq!(payslip.days.len(), 1);

    let queries = store.query_count();
    service.compute_payslip(2, period()).await.unwrap();
    assert!(store.query_count() > queries);
}

#[tokio::test]
async fn test_synthetic_attendance_policy() {
    let mut data = sample_data();
    let mut partial = AttendanceRecord::new(1, may(7));
    partial.am_in = Some(t(9, 0));
    data.attendance.push(partial);

    let mut policy = PayrollPolicy::default();
    policy.synthetic_attendance.rules.push(SyntheticAttendanceRule {
        employee_id: 1,
        note: None,
    });
    let (_, service) = service_with(data.clone(), policy);
    let row = service.compute_employee_payroll(1, period()).await.unwrap();
    assert_eq!(row.days_worked, Decimal::TWO);
    assert_eq!(row.basic_pay, Decimal::from(1600));

    let (_, plain) = build_service(data);
    let row = plain.compute_employee_payroll(1, period()).await.unwrap();
    assert_eq!(row.days_worked, Decimal::ONE);
}
