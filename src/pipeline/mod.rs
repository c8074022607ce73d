pub mod fetcher;
pub mod mapper;
pub mod parser;
pub mod record;
pub mod validator;

use chrono::{Local, NaiveDate};
use fetcher::{fetch_with_retries, Fetch, FetchFailure, FetchSuccess};
use mapper::MappingFailure;
use parser::ParseFailure;
use record::Employee;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{error, info};
use validator::ValidationFailure;

use crate::config::SourceConfig;

/// Terminal disposition of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every source element became an [`Employee`].
    Success,
    /// The payload fetched and parsed, but some records were rejected.
    Partial,
    /// Fetch or parse failed; no records were produced.
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Partial => write!(f, "partial"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Why a source element was rejected instead of becoming a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    Mapping(MappingFailure),
    Validation(ValidationFailure),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::Mapping(failure) => failure.fmt(f),
            RejectionReason::Validation(failure) => failure.fmt(f),
        }
    }
}

/// A source element retained with the reason it was rejected, for downstream
/// observability.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub source: Value,
    pub reason: RejectionReason,
}

/// Terminal failure that aborted the run before any record was produced.
#[derive(Debug)]
pub enum PipelineFailure {
    Fetch(FetchFailure),
    Parse(ParseFailure),
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineFailure::Fetch(failure) => failure.fmt(f),
            PipelineFailure::Parse(failure) => failure.fmt(f),
        }
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineFailure::Fetch(failure) => Some(failure),
            PipelineFailure::Parse(failure) => Some(failure),
        }
    }
}

/// Everything one run produced, owned by the caller. The pipeline itself
/// holds no state across invocations.
#[derive(Debug)]
pub struct PipelineResult {
    pub records: Vec<Employee>,
    pub rejections: Vec<Rejection>,
    pub outcome: Outcome,
    pub failure: Option<PipelineFailure>,
    /// Fetch round trips made, including the successful or final failing one.
    pub attempts: u32,
    pub elapsed: Duration,
}

impl PipelineResult {
    fn failed(failure: PipelineFailure, attempts: u32, elapsed: Duration) -> Self {
        Self {
            records: Vec::new(),
            rejections: Vec::new(),
            outcome: Outcome::Failed,
            failure: Some(failure),
            attempts,
            elapsed,
        }
    }
}

enum Step {
    Fetching,
    Parsing(FetchSuccess),
    MappingValidating {
        attempts: u32,
        elements: Vec<Map<String, Value>>,
    },
}

/// Sequences fetch, parse, map and validate for a single endpoint.
pub struct Pipeline<F: Fetch> {
    fetcher: F,
    config: SourceConfig,
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(fetcher: F, config: SourceConfig) -> Self {
        Self { fetcher, config }
    }

    /// Runs the pipeline once, evaluating date sanity against today.
    pub async fn run(&self) -> PipelineResult {
        self.run_at(Local::now().date_naive()).await
    }

    /// Runs the pipeline once with an explicit evaluation date. Identical
    /// input always yields the same record/rejection split.
    pub async fn run_at(&self, today: NaiveDate) -> PipelineResult {
        let started = Instant::now();
        let mut step = Step::Fetching;

        loop {
            step = match step {
                Step::Fetching => match fetch_with_retries(&self.fetcher, &self.config).await {
                    Ok(payload) => Step::Parsing(payload),
                    Err(failure) => {
                        error!(
                            kind = %failure.kind,
                            attempts = failure.attempts,
                            url = %self.config.url,
                            "fetch failed"
                        );
                        let attempts = failure.attempts;
                        info!(
                            valid = 0usize,
                            rejected = 0usize,
                            outcome = %Outcome::Failed,
                            attempts,
                            "pipeline run complete"
                        );
                        return PipelineResult::failed(
                            PipelineFailure::Fetch(failure),
                            attempts,
                            started.elapsed(),
                        );
                    }
                },
                Step::Parsing(payload) => match parser::parse(&payload.body) {
                    Ok(elements) => Step::MappingValidating {
                        attempts: payload.attempts,
                        elements,
                    },
                    Err(failure) => {
                        error!(%failure, attempts = payload.attempts, "parse failed");
                        info!(
                            valid = 0usize,
                            rejected = 0usize,
                            outcome = %Outcome::Failed,
                            attempts = payload.attempts,
                            "pipeline run complete"
                        );
                        return PipelineResult::failed(
                            PipelineFailure::Parse(failure),
                            payload.attempts,
                            started.elapsed(),
                        );
                    }
                },
                Step::MappingValidating { attempts, elements } => {
                    let (records, rejections) = map_and_validate(elements, today);
                    let outcome = if rejections.is_empty() {
                        Outcome::Success
                    } else {
                        Outcome::Partial
                    };
                    info!(
                        valid = records.len(),
                        rejected = rejections.len(),
                        %outcome,
                        attempts,
                        "pipeline run complete"
                    );
                    return PipelineResult {
                        records,
                        rejections,
                        outcome,
                        failure: None,
                        attempts,
                        elapsed: started.elapsed(),
                    };
                }
            };
        }
    }
}

/// Per-element failures become rejections; they never abort the run.
fn map_and_validate(
    elements: Vec<Map<String, Value>>,
    today: NaiveDate,
) -> (Vec<Employee>, Vec<Rejection>) {
    let mut records = Vec::new();
    let mut rejections = Vec::new();

    for element in elements {
        match mapper::map(&element) {
            Ok(employee) => match validator::validate(employee, today) {
                Ok(employee) => records.push(employee),
                Err(failure) => rejections.push(Rejection {
                    source: Value::Object(element),
                    reason: RejectionReason::Validation(failure),
                }),
            },
            Err(failure) => rejections.push(Rejection {
                source: Value::Object(element),
                reason: RejectionReason::Mapping(failure),
            }),
        }
    }

    (records, rejections)
}
