use super::record::Employee;
use chrono::NaiveDate;
use std::fmt;

/// Minimum digits for a usable phone number once separators are ignored.
const MIN_PHONE_DIGITS: usize = 7;

/// First constraint a record violated. Checks run in a fixed order so the
/// reported reason is deterministic: email shape, hire date sanity, phone
/// format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationFailure {}

/// Re-checks format constraints the mapper does not guarantee. `today` is the
/// evaluation date for hire-date sanity, injected so runs are deterministic.
pub fn validate(employee: Employee, today: NaiveDate) -> Result<Employee, ValidationFailure> {
    if !email_shape_ok(&employee.email) {
        return Err(ValidationFailure {
            field: "email",
            reason: format!("'{}' does not look like local@domain", employee.email),
        });
    }

    if employee.hire_date > today {
        return Err(ValidationFailure {
            field: "hire_date",
            reason: format!("{} is in the future", employee.hire_date),
        });
    }

    if let Some(phone) = employee.phone_number.as_deref() {
        if !phone_shape_ok(phone) {
            return Err(ValidationFailure {
                field: "phone_number",
                reason: format!("'{phone}' is not a normalized phone number"),
            });
        }
    }

    Ok(employee)
}

fn email_shape_ok(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.') && !domain.contains('@')
}

fn phone_shape_ok(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    digits >= MIN_PHONE_DIGITS
        && phone
            .chars()
            .all(|ch| ch.is_ascii_digit() || "+-.() ".contains(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).expect("valid date")
    }

    fn employee(email: &str, hire_date: NaiveDate, phone: Option<&str>) -> Employee {
        Employee {
            employee_id: "1".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            job_title: "Eng".to_string(),
            phone_number: phone.map(str::to_string),
            hire_date,
            department: None,
            years_of_experience: None,
        }
    }

    fn past_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 15).expect("valid date")
    }

    #[test]
    fn accepts_well_formed_record() {
        let employee = employee("ann@x.com", past_date(), Some("555-1212"));
        assert!(validate(employee, today()).is_ok());
    }

    #[test]
    fn rejects_malformed_email_shapes() {
        for email in ["annx.com", "@x.com", "ann@", "ann@nodot", "ann @x.com", "a@b@c.com"] {
            let failure = validate(employee(email, past_date(), None), today())
                .expect_err("email rejected");
            assert_eq!(failure.field, "email", "email {email}");
        }
    }

    #[test]
    fn rejects_future_hire_date() {
        let future = today().succ_opt().expect("valid date");
        let failure =
            validate(employee("ann@x.com", future, None), today()).expect_err("date rejected");
        assert_eq!(failure.field, "hire_date");
    }

    #[test]
    fn hire_date_today_is_allowed() {
        assert!(validate(employee("ann@x.com", today(), None), today()).is_ok());
    }

    #[test]
    fn rejects_short_or_lettered_phone() {
        for phone in ["555", "call me 555-1212"] {
            let failure = validate(employee("ann@x.com", past_date(), Some(phone)), today())
                .expect_err("phone rejected");
            assert_eq!(failure.field, "phone_number", "phone {phone}");
        }
    }

    #[test]
    fn missing_phone_is_fine() {
        assert!(validate(employee("ann@x.com", past_date(), None), today()).is_ok());
    }

    #[test]
    fn email_failure_wins_over_later_checks() {
        let future = today().succ_opt().expect("valid date");
        let failure = validate(employee("broken", future, Some("1")), today())
            .expect_err("first check reports");
        assert_eq!(failure.field, "email");
    }
}
