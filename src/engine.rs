//! The two top-level algorithms (RECORD, CLASSIFY) and the `Engine` facade a
//! host process drives: a single `execute(argv)` entry point that decodes a
//! flat positional argument vector and returns a flat result, the same shape
//! the reference host used to invoke its atomic script.

use crate::args::Cursor;
use crate::candidate_index::CandidateIndex;
use crate::command::{self, ClassifyQuery, ClassifyRequest, Command, RecordRequest};
use crate::config::Configuration;
use crate::error::{ArgumentError, EngineError};
use crate::frequency::FrequencyStore;
use crate::limits::RuntimeLimits;
use crate::ordered::InsertionOrderedMap;
use crate::signature::Signature;
use crate::similarity;
use crate::storage::Storage;
use serde_derive::Serialize;
use tracing::{info, instrument};

/// A single query's score against a candidate, or the wire sentinel when
/// either side of the comparison is an empty signature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Value(f64),
    Sentinel,
}

impl serde::Serialize for Score {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Score::Value(v) => serializer.serialize_f64(*v),
            Score::Sentinel => serializer.serialize_i64(-1),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Recorded,
    Classified(Vec<(String, Vec<Score>)>),
}

pub struct Engine<S: Storage> {
    storage: S,
    limits: RuntimeLimits,
}

impl<S: Storage> Engine<S> {
    pub fn new(storage: S, limits: RuntimeLimits) -> Self {
        Self { storage, limits }
    }

    /// Parses `argv` as `<scope> <bands> <window> <retention> <timestamp>
    /// <RECORD|CLASSIFY> <command-specific tail...>` and runs the selected
    /// command to completion. Every error path is logged at `error` level
    /// before it reaches the caller, so an operator gets a structured log
    /// line even when the return value is all the caller inspects.
    #[instrument(skip(self, argv), fields(scope))]
    pub fn execute(&self, argv: &[String]) -> Result<Output, EngineError> {
        let result = self.execute_inner(argv);
        if let Err(ref err) = result {
            log_error(err);
        }
        result
    }

    fn execute_inner(&self, argv: &[String]) -> Result<Output, EngineError> {
        let mut cursor = Cursor::new(argv);
        let configuration = decode_configuration(&mut cursor, &self.limits)?;
        tracing::Span::current().record("scope", configuration.scope.as_str());

        let command = command::decode_command(&mut cursor, configuration.bands)?;
        cursor.expect_exhausted()?;

        let output = match command {
            Command::Record(requests) => {
                validate_record_batch(&requests, &self.limits)?;
                info!(count = requests.len(), "RECORD");
                self.record(&configuration, requests)?;
                Output::Recorded
            }
            Command::Classify(request) => {
                validate_classify_batch(&request, &self.limits)?;
                info!(
                    count = request.queries.len(),
                    strict = request.strict,
                    "CLASSIFY"
                );
                Output::Classified(self.classify(&configuration, request)?)
            }
        };
        Ok(output)
    }

    fn record(
        &self,
        configuration: &Configuration,
        requests: Vec<RecordRequest>,
    ) -> Result<(), EngineError> {
        let frequency_store = FrequencyStore::new(&self.storage, configuration);
        let candidate_index = CandidateIndex::new(&self.storage, configuration);

        for request in requests {
            frequency_store
                .add(&request.feature_index, &request.item_key, &request.signature)
                .map_err(EngineError::from)?;
            candidate_index
                .insert_signature(&request.feature_index, &request.item_key, &request.signature)
                .map_err(EngineError::from)?;
        }
        Ok(())
    }

    fn classify(
        &self,
        configuration: &Configuration,
        request: ClassifyRequest,
    ) -> Result<Vec<(String, Vec<Score>)>, EngineError> {
        let candidate_index = CandidateIndex::new(&self.storage, configuration);
        let frequency_store = FrequencyStore::new(&self.storage, configuration);

        // Stage 1: candidate collection. `per_query` holds each query's own
        // collision tally, in first-seen order; `items` merges first-seen
        // order across all queries for the final emission order.
        let mut per_query: Vec<std::collections::HashMap<String, u16>> =
            Vec::with_capacity(request.queries.len());
        let mut items: InsertionOrderedMap<()> = InsertionOrderedMap::new();
        for query in &request.queries {
            let candidates = candidate_index
                .query(&query.feature_index, &query.signature)
                .map_err(EngineError::from)?;
            let mut tallies = std::collections::HashMap::with_capacity(candidates.len());
            for (item, collisions) in candidates {
                items.entry_or(&item, ());
                tallies.insert(item, collisions);
            }
            per_query.push(tallies);
        }

        // Stage 2: filter.
        let surviving: Vec<&str> = items
            .keys_in_order()
            .filter(|item| passes_filter(item, &request, &per_query))
            .collect();

        // Stage 3 + 4: score and emit, in the filtered, first-seen order.
        let mut results = Vec::with_capacity(surviving.len());
        'items: for item in surviving {
            let mut scores = Vec::with_capacity(request.queries.len());
            for query in &request.queries {
                let candidate_signature = frequency_store.get(&query.feature_index, item)?;
                match score_query(query, &candidate_signature, request.strict) {
                    Some(score) => scores.push(score),
                    None => continue 'items,
                }
            }
            results.push((item.to_string(), scores));
        }
        Ok(results)
    }
}

/// Lenient: at least one query's threshold is met. Strict: every query's
/// threshold is met. Absent `(item, feature_index)` tallies count as zero
/// collisions.
fn passes_filter(
    item: &str,
    request: &ClassifyRequest,
    per_query: &[std::collections::HashMap<String, u16>],
) -> bool {
    let meets = |idx: usize, query: &ClassifyQuery| {
        let collisions = per_query[idx].get(item).copied().unwrap_or(0);
        (collisions as i64) >= query.threshold
    };
    if request.strict {
        request
            .queries
            .iter()
            .enumerate()
            .all(|(idx, query)| meets(idx, query))
    } else {
        request
            .queries
            .iter()
            .enumerate()
            .any(|(idx, query)| meets(idx, query))
    }
}

/// Scores one query against a candidate's stored signature for the same
/// feature index. Returns `None` only under STRICT when emptiness mismatches
/// between query and candidate, which rejects the whole item.
fn score_query(query: &ClassifyQuery, candidate: &Signature, strict: bool) -> Option<Score> {
    let query_empty = query.signature.is_empty();
    let candidate_empty = candidate.is_empty();

    if strict {
        if query_empty != candidate_empty {
            return None;
        }
        if query_empty {
            return Some(Score::Sentinel);
        }
        return Some(Score::Value(similarity::score(&query.signature, candidate)));
    }

    if query_empty || candidate_empty {
        return Some(Score::Sentinel);
    }
    Some(Score::Value(similarity::score(&query.signature, candidate)))
}

fn decode_configuration(
    cursor: &mut Cursor,
    limits: &RuntimeLimits,
) -> Result<Configuration, ArgumentError> {
    use crate::args::{scalar_int, scalar_string, tuple5};

    let (scope, bands, window, retention, timestamp) = tuple5(
        cursor,
        scalar_string,
        scalar_int,
        scalar_int,
        scalar_int,
        scalar_int,
    )?;
    Configuration::new(scope, bands, window, retention, timestamp, limits)
}

fn validate_record_batch(
    requests: &[RecordRequest],
    limits: &RuntimeLimits,
) -> Result<(), ArgumentError> {
    if requests.len() > limits.max_requests_per_record {
        return Err(ArgumentError::TooManyRecordRequests {
            count: requests.len(),
            max: limits.max_requests_per_record,
        });
    }
    Ok(())
}

fn validate_classify_batch(
    request: &ClassifyRequest,
    limits: &RuntimeLimits,
) -> Result<(), ArgumentError> {
    if request.queries.len() > limits.max_queries_per_classify {
        return Err(ArgumentError::TooManyClassifyQueries {
            count: request.queries.len(),
            max: limits.max_queries_per_classify,
        });
    }
    Ok(())
}

/// Logs an `error`-level event carrying `err`'s `Display` text and, for
/// `ArgumentError`, the cursor position it failed at. `StorageError`'s
/// `Display` never includes a key (only the failing operation name), so
/// nothing here can leak an item key into the log stream.
fn log_error(err: &EngineError) {
    match err {
        EngineError::Argument(arg_err) => match argument_error_position(arg_err) {
            Some(position) => {
                tracing::error!(error = %err, position, "command failed");
            }
            None => tracing::error!(error = %err, "command failed"),
        },
        _ => tracing::error!(error = %err, "command failed"),
    }
}

fn argument_error_position(err: &ArgumentError) -> Option<usize> {
    match err {
        ArgumentError::UnexpectedEnd(pos)
        | ArgumentError::NotAnInteger(pos, _)
        | ArgumentError::UnknownCommand(pos, _)
        | ArgumentError::TrailingTokens(pos)
        | ArgumentError::BucketOutOfRange(pos, _) => Some(*pos),
        ArgumentError::InvalidBandCount(_)
        | ArgumentError::InvalidWindow(_)
        | ArgumentError::InvalidRetention(_)
        | ArgumentError::TooManyBands { .. }
        | ArgumentError::TooManyRecordRequests { .. }
        | ArgumentError::TooManyClassifyQueries { .. } => None,
    }
}
