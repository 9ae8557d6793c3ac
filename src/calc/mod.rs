//! Pure payroll calculators.
//!
//! Nothing in here performs I/O; the service fetches records and hands them over.

pub mod deductions;
pub mod earnings;
pub mod holiday;
pub mod lateness;
pub mod minutes;
pub mod overtime;
pub mod policy;
pub mod row;
pub mod sunday;

pub use policy::{PayrollPath, PayrollPolicy};
pub use row::{EmployeeSources, compute_payslip, compute_row};
