//! Employees and their benefit assignments.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Employee identifier in the record store.
pub type EmployeeId = i32;

/// How an employee's working time is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffType {
    /// Elapsed punch time, no fixed session windows.
    Field,
    /// Fixed AM/PM session windows.
    Office,
}

impl fmt::Display for StaffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => f.write_str("field"),
            Self::Office => f.write_str("office"),
        }
    }
}

impl FromStr for StaffType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "field" => Ok(Self::Field),
            "office" => Ok(Self::Office),
            other => Err(AppError::parse(format!("unknown staff type '{other}'"))),
        }
    }
}

/// Employee with pay rate and benefit assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    #[serde(default)]
    pub designation: Option<String>,
    pub daily_rate: Decimal,
    pub staff_type: StaffType,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub deductions: Vec<EmployeeDeduction>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    pub fn is_field_staff(&self) -> bool {
        self.staff_type == StaffType::Field
    }

    /// Benefit assignments that reduce pay.
    pub fn deduction_benefits(&self) -> impl Iterator<Item = &EmployeeDeduction> {
        self.deductions.iter().filter(|d| d.benefit.is_deduction)
    }

    /// Benefit assignments added to pay (allowance, COLA).
    pub fn earning_benefits(&self) -> impl Iterator<Item = &EmployeeDeduction> {
        self.deductions.iter().filter(|d| !d.benefit.is_deduction)
    }
}

/// Benefit definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benefit {
    pub name: String,
    pub is_deduction: bool,
    /// Explicit category; inferred from the name when absent.
    #[serde(default)]
    pub category: Option<DeductionCategory>,
}

impl Benefit {
    /// Effective deduction category.
    pub fn category(&self) -> DeductionCategory {
        self.category
            .unwrap_or_else(|| DeductionCategory::infer_from_name(&self.name))
    }
}

/// A benefit assigned to an employee with its amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDeduction {
    pub benefit: Benefit,
    pub amount: Decimal,
}

/// Bucket a deduction benefit is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionCategory {
    Sss,
    SssLoan,
    Phic,
    Pagibig,
    Savings,
    SalaryDeposit,
    Other,
}

impl DeductionCategory {
    /// Infer a category from a benefit name for records that carry no explicit tag.
    pub fn infer_from_name(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("sss") {
            if name.contains("loan") { Self::SssLoan } else { Self::Sss }
        } else if name.contains("phic") || name.contains("philhealth") {
            Self::Phic
        } else if name.contains("pag-ibig") || name.contains("pagibig") {
            Self::Pagibig
        } else if name.contains("saving") {
            Self::Savings
        } else if name.contains("salary") && name.contains("deposit") {
            Self::SalaryDeposit
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sss => "sss",
            Self::SssLoan => "sss_loan",
            Self::Phic => "phic",
            Self::Pagibig => "pagibig",
            Self::Savings => "savings",
            Self::SalaryDeposit => "salary_deposit",
            Self::Other => "other",
        }
    }
}

impl FromStr for DeductionCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sss" => Ok(Self::Sss),
            "sss_loan" => Ok(Self::SssLoan),
            "phic" => Ok(Self::Phic),
            "pagibig" => Ok(Self::Pagibig),
            "savings" => Ok(Self::Savings),
            "salary_deposit" => Ok(Self::SalaryDeposit),
            "other" => Ok(Self::Other),
            other => Err(AppError::parse(format!("unknown deduction category '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_category_from_name() {
        let cases = [
            ("SSS Contribution", DeductionCategory::Sss),
            ("SSS Salary Loan", DeductionCategory::SssLoan),
            ("PHIC", DeductionCategory::Phic),
            ("PhilHealth", DeductionCategory::Phic),
            ("Pag-IBIG Fund", DeductionCategory::Pagibig),
            ("pagibig", DeductionCategory::Pagibig),
            ("Company Savings", DeductionCategory::Savings),
            ("Salary Deposit", DeductionCategory::SalaryDeposit),
            ("Uniform", DeductionCategory::Other),
        ];
        for (name, expected) in cases {
            assert_eq!(DeductionCategory::infer_from_name(name), expected, "{name}");
        }
    }

    #[test]
    fn test_explicit_category_wins() {
        let benefit = Benefit {
            name: "SSS".to_string(),
            is_deduction: true,
            category: Some(DeductionCategory::Savings),
        };
        assert_eq!(benefit.category(), DeductionCategory::Savings);
    }

    #[test]
    fn test_category_round_trip_str() {
        for category in [
            DeductionCategory::Sss,
            DeductionCategory::SssLoan,
            DeductionCategory::SalaryDeposit,
            DeductionCategory::Other,
        ] {
            assert_eq!(category.as_str().parse::<DeductionCategory>().unwrap(), category);
        }
        assert!("bonus".parse::<DeductionCategory>().is_err());
        assert_eq!(" Field ".parse::<StaffType>().unwrap(), StaffType::Field);
        assert!("contractor".parse::<StaffType>().is_err());
    }

    #[test]
    fn test_benefit_split() {
        let benefit = |name: &str, is_deduction| EmployeeDeduction {
            benefit: Benefit {
                name: name.to_string(),
                is_deduction,
                category: None,
            },
            amount: Decimal::from(100),
        };
        let employee = Employee {
            id: 1,
            full_name: "Test".to_string(),
            designation: None,
            daily_rate: Decimal::from(500),
            staff_type: StaffType::Office,
            is_admin: false,
            is_active: true,
            deductions: vec![benefit("SSS", true), benefit("COLA", false)],
        };
        assert_eq!(employee.deduction_benefits().count(), 1);
        assert_eq!(employee.earning_benefits().next().unwrap().benefit.name, "COLA");
        assert!(!employee.is_field_staff());
    }
}
