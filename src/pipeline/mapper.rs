use super::record::Employee;
use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Canonical field -> accepted source key aliases, probed in order against
/// normalized keys. Centralizing the table keeps per-field branching out of
/// the mapping code.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("employee_id", &["employee_id", "id", "emp_id", "employee id"]),
    ("first_name", &["first_name", "firstname", "given_name"]),
    ("last_name", &["last_name", "lastname", "surname", "family_name"]),
    ("email", &["email", "email_address", "e-mail"]),
    ("job_title", &["job_title", "title", "position", "role"]),
    ("phone_number", &["phone_number", "phone", "telephone", "mobile"]),
    ("hire_date", &["hire_date", "hired_on", "start_date", "date_of_joining"]),
    ("department", &["department", "dept"]),
    (
        "years_of_experience",
        &["years_of_experience", "experience_years", "experience"],
    ),
];

/// A required field could not be located or coerced. Mapping never partially
/// constructs an [`Employee`]; the orchestrator pairs this with the original
/// source element when recording the rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingFailure {
    pub missing_fields: BTreeSet<&'static str>,
}

impl fmt::Display for MappingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.missing_fields.iter().copied().collect();
        write!(f, "missing required fields: {}", fields.join(", "))
    }
}

impl std::error::Error for MappingFailure {}

/// Converts one generic source element into an [`Employee`].
pub fn map(source: &Map<String, Value>) -> Result<Employee, MappingFailure> {
    let index: BTreeMap<String, &Value> = source
        .iter()
        .map(|(key, value)| (normalize_key(key), value))
        .collect();

    let employee_id = coerce_first(&index, "employee_id", coerce_id);
    let first_name = coerce_first(&index, "first_name", coerce_string);
    let last_name = coerce_first(&index, "last_name", coerce_string);
    let email = coerce_first(&index, "email", coerce_string);
    let hire_date = coerce_first(&index, "hire_date", coerce_date);

    // Optional, but the source contract requires the key to exist. Empty and
    // null are allowed; a present non-textual value is uncoercible.
    let job_title = find_first(&index, "job_title").and_then(coerce_optional_text);

    match (employee_id, first_name, last_name, email, hire_date, job_title) {
        (
            Some(employee_id),
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(hire_date),
            Some(job_title),
        ) => Ok(Employee {
            employee_id,
            first_name,
            last_name,
            email,
            job_title,
            phone_number: coerce_first(&index, "phone_number", coerce_phone),
            hire_date,
            department: coerce_first(&index, "department", coerce_string),
            years_of_experience: coerce_first(&index, "years_of_experience", coerce_experience),
        }),
        (employee_id, first_name, last_name, email, hire_date, job_title) => {
            let mut missing_fields = BTreeSet::new();
            if employee_id.is_none() {
                missing_fields.insert("employee_id");
            }
            if first_name.is_none() {
                missing_fields.insert("first_name");
            }
            if last_name.is_none() {
                missing_fields.insert("last_name");
            }
            if email.is_none() {
                missing_fields.insert("email");
            }
            if hire_date.is_none() {
                missing_fields.insert("hire_date");
            }
            if job_title.is_none() {
                missing_fields.insert("job_title");
            }
            Err(MappingFailure { missing_fields })
        }
    }
}

fn aliases_for(field: &str) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(canonical, _)| *canonical == field)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

fn find_first<'a>(index: &BTreeMap<String, &'a Value>, field: &str) -> Option<&'a Value> {
    aliases_for(field)
        .iter()
        .find_map(|alias| index.get(*alias).copied())
}

fn coerce_first<T>(
    index: &BTreeMap<String, &Value>,
    field: &str,
    coerce: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    aliases_for(field)
        .iter()
        .find_map(|alias| index.get(*alias).and_then(|value| coerce(value)))
}

fn normalize_key(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.trim().to_ascii_lowercase()
}

/// Text that may legitimately be blank. Null and empty map to an empty
/// string; any other non-string value is rejected.
fn coerce_optional_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(raw) => Some(raw.trim().to_string()),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// IDs arrive as strings or integers; anything else is uncoercible.
fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => coerce_string(value),
        Value::Number(number) => number
            .as_i64()
            .map(|id| id.to_string())
            .or_else(|| number.as_u64().map(|id| id.to_string())),
        _ => None,
    }
}

/// Invalid dates are rejected, never coerced to a fallback.
fn coerce_date(value: &Value) -> Option<NaiveDate> {
    coerce_string(value).as_deref().and_then(parse_date)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.date_naive());
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    None
}

/// Keeps digits and common separators. Extension-style numbers (an `x` in the
/// value) are treated as unusable and dropped.
fn coerce_phone(value: &Value) -> Option<String> {
    let raw = coerce_string(value)?;
    if raw.to_ascii_lowercase().contains('x') {
        return None;
    }

    let normalized: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || "+-.() ".contains(*ch))
        .collect();
    let normalized = normalized.trim().to_string();
    normalized
        .chars()
        .any(|ch| ch.is_ascii_digit())
        .then_some(normalized)
}

fn coerce_experience(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|years| u32::try_from(years).ok()),
        Value::String(raw) => raw.trim().parse::<u32>().ok(),
        _ => None,
    }
}
