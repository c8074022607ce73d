use chrono::NaiveDate;
use serde::Serialize;

/// Canonical employee record. Every instance that leaves the validator has all
/// required fields non-empty and correctly typed; raw source elements that
/// fail mapping or validation never become one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Present in the source by contract; empty is allowed.
    pub job_title: String,
    /// Normalized to digits and separators. Extension-style values are dropped.
    pub phone_number: Option<String>,
    pub hire_date: NaiveDate,
    pub department: Option<String>,
    pub years_of_experience: Option<u32>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Seniority band derived from experience, when the source reported it.
    pub fn designation(&self) -> Option<&'static str> {
        self.years_of_experience.map(|years| match years {
            0..=2 => "System Engineer",
            3..=4 => "Data Engineer",
            5..=9 => "Senior Data Engineer",
            _ => "Lead",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(years: Option<u32>) -> Employee {
        Employee {
            employee_id: "7".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            job_title: "Engineer".to_string(),
            phone_number: None,
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 15).expect("valid date"),
            department: None,
            years_of_experience: years,
        }
    }

    #[test]
    fn full_name_joins_first_and_last() {
        assert_eq!(employee(None).full_name(), "Ann Lee");
    }

    #[test]
    fn designation_bands_follow_experience() {
        assert_eq!(employee(None).designation(), None);
        assert_eq!(employee(Some(0)).designation(), Some("System Engineer"));
        assert_eq!(employee(Some(2)).designation(), Some("System Engineer"));
        assert_eq!(employee(Some(3)).designation(), Some("Data Engineer"));
        assert_eq!(employee(Some(4)).designation(), Some("Data Engineer"));
        assert_eq!(employee(Some(5)).designation(), Some("Senior Data Engineer"));
        assert_eq!(employee(Some(9)).designation(), Some("Senior Data Engineer"));
        assert_eq!(employee(Some(10)).designation(), Some("Lead"));
    }
}
