use crate::error::AppError;
use crate::pipeline::record::Employee;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Flat row handed to the warehouse loader. Derived columns are materialized
/// here so the loader never recomputes them.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    employee_id: &'a str,
    full_name: String,
    email: &'a str,
    job_title: &'a str,
    phone_number: Option<&'a str>,
    hire_date: NaiveDate,
    department: Option<&'a str>,
    years_of_experience: Option<u32>,
    designation: Option<&'static str>,
}

impl<'a> ExportRow<'a> {
    fn from_employee(employee: &'a Employee) -> Self {
        Self {
            employee_id: &employee.employee_id,
            full_name: employee.full_name(),
            email: &employee.email,
            job_title: &employee.job_title,
            phone_number: employee.phone_number.as_deref(),
            hire_date: employee.hire_date,
            department: employee.department.as_deref(),
            years_of_experience: employee.years_of_experience,
            designation: employee.designation(),
        }
    }
}

/// Writes validated records as CSV rows, header included.
pub fn write_csv<W: Write>(writer: W, records: &[Employee]) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(ExportRow::from_employee(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file<P: AsRef<Path>>(path: P, records: &[Employee]) -> Result<(), AppError> {
    let file = std::fs::File::create(path)?;
    write_csv(file, records)
}
