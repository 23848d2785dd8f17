//! Executes a single case against a single adapter.
//!
//! The flow for one case:
//!
//! 1. produce the original value
//! 2. serialize it (a failure is a fault), then apply the raw-bytes check and any tamper
//! 3. decode inside a [`DisposeScope`], which disposes the decoder exactly once on every
//!    exit path, including unwinding
//! 4. combine the decode and dispose results into an [`AdapterResult`]; when both fail
//!    the deserialize error stays primary
//! 5. judge the result against the case's [`Expectation`]
//!
//! Panics raised by the adapter are caught and reported as [`Fault::Panic`], except a
//! panic in `dispose`, which becomes a [`DisposeError`] so it cannot displace a
//! deserialize failure. Panics raised by the case's own closures (value factories,
//! tamper, raw-bytes check) end that case as [`Fault::InvalidCase`].

use crate::compare;
use crate::{
    CaseInput, CaseResult, ConformanceCase, Decoder, DeserializeError, DisposeError,
    Expectation, Fault, FormatAdapter, Mismatch, Outcome, Shape, Value,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// What one decode attempt produced, before any expectation is applied.
#[derive(Clone, Debug, PartialEq)]
pub enum AdapterResult {
    Success(Value),
    DeserializeFailure(DeserializeError),
    /// Decoding succeeded but releasing the decoder failed.
    DisposeFailure(Value, DisposeError),
    /// Both failed. `deserialize` is the operative cause.
    Both {
        deserialize: DeserializeError,
        dispose: DisposeError,
    },
}

impl AdapterResult {
    fn from_parts(
        decoded: Result<Value, DeserializeError>,
        disposed: Result<(), DisposeError>,
    ) -> Self {
        match (decoded, disposed) {
            (Ok(value), Ok(())) => AdapterResult::Success(value),
            (Ok(value), Err(dispose)) => AdapterResult::DisposeFailure(value, dispose),
            (Err(deserialize), Ok(())) => AdapterResult::DeserializeFailure(deserialize),
            (Err(deserialize), Err(dispose)) => AdapterResult::Both {
                deserialize,
                dispose,
            },
        }
    }

    /// The deserialize failure, if any.
    #[must_use]
    pub fn primary_error(&self) -> Option<&DeserializeError> {
        match self {
            AdapterResult::DeserializeFailure(err) | AdapterResult::Both { deserialize: err, .. } => {
                Some(err)
            }
            _ => None,
        }
    }

    /// The dispose failure, if any.
    #[must_use]
    pub fn dispose_error(&self) -> Option<&DisposeError> {
        match self {
            AdapterResult::DisposeFailure(_, err) | AdapterResult::Both { dispose: err, .. } => {
                Some(err)
            }
            _ => None,
        }
    }
}

/// Owns a decoder and guarantees `dispose` runs exactly once.
///
/// [`DisposeScope::dispose`] consumes the scope and reports the result. If the scope is
/// dropped without that call (a panic unwinding through the runner), `Drop` disposes and
/// logs any failure.
pub struct DisposeScope<'a> {
    decoder: Box<dyn Decoder + 'a>,
    disposed: bool,
}

impl<'a> DisposeScope<'a> {
    pub fn new(decoder: Box<dyn Decoder + 'a>) -> Self {
        DisposeScope {
            decoder,
            disposed: false,
        }
    }

    pub fn deserialize(&mut self, shape: &Shape) -> Result<Value, DeserializeError> {
        self.decoder.deserialize(shape)
    }

    pub fn dispose(mut self) -> Result<(), DisposeError> {
        self.disposed = true;
        self.decoder.dispose()
    }
}

impl Drop for DisposeScope<'_> {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Err(err) = self.decoder.dispose() {
            warn!(error = %err, "dispose failed during early exit");
        }
    }
}

/// Decodes `bytes` as `shape`, disposing the decoder whatever happens.
///
/// # Errors
///
/// Returns [`Fault::Panic`] if the adapter panics while opening the decoder or while
/// decoding. The decoder is still disposed in that case. A panic in `dispose` is
/// reported as a [`DisposeError`], secondary to any deserialize failure.
pub fn attempt<A>(adapter: &A, bytes: &[u8], shape: &Shape) -> Result<AdapterResult, Fault>
where
    A: FormatAdapter + ?Sized,
{
    let mut scope = DisposeScope::new(guard(|| adapter.decoder(bytes))?);
    let decoded = catch(|| scope.deserialize(shape));
    let disposed = catch(move || scope.dispose())
        .unwrap_or_else(|msg| Err(DisposeError::new(format!("dispose panicked: {}", msg))));
    match decoded {
        Ok(decoded) => Ok(AdapterResult::from_parts(decoded, disposed)),
        Err(msg) => {
            if let Err(dispose) = &disposed {
                warn!(error = %dispose, "dispose failed after decoder panic");
            }
            Err(Fault::Panic(msg))
        }
    }
}

/// Runs `case` against `adapter`.
///
/// Never panics on adapter misbehavior; every outcome is data in the returned
/// [`CaseResult`].
pub fn run_case<A>(case: &ConformanceCase, adapter: &A) -> CaseResult
where
    A: FormatAdapter + ?Sized,
{
    debug!(case = case.id(), adapter = adapter.name(), "running case");
    let result = execute(case, adapter);
    debug!(
        case = case.id(),
        adapter = adapter.name(),
        outcome = result.outcome().label(),
        "case finished"
    );
    result
}

fn execute<A>(case: &ConformanceCase, adapter: &A) -> CaseResult
where
    A: FormatAdapter + ?Sized,
{
    let id = case.id();
    let original = match case_guard("value factory", || case.original()) {
        Ok(original) => original,
        Err(fault) => return CaseResult::new(id, Outcome::Error(fault)),
    };

    if *case.expectation() == Expectation::MustPreserveNullDistinction && !original.contains_null()
    {
        return CaseResult::new(
            id,
            Outcome::Error(Fault::InvalidCase(
                "null-distinction case has no null in its original value".to_string(),
            )),
        );
    }

    let bytes = match case.input() {
        CaseInput::Encoded(bytes) => bytes.clone(),
        CaseInput::Generated | CaseInput::Tampered(_) => {
            let bytes = match guard(|| adapter.serialize(&original)) {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(err)) => return CaseResult::new(id, Outcome::Error(Fault::Serialize(err))),
                Err(fault) => return CaseResult::new(id, Outcome::Error(fault)),
            };
            if let Some(check) = case.raw_check() {
                let matched = match case_guard("raw-bytes check", || check.matches(&bytes)) {
                    Ok(matched) => matched,
                    Err(fault) => return CaseResult::new(id, Outcome::Error(fault)),
                };
                if !matched {
                    let mismatch = Mismatch::RawBytes {
                        check: check.label().to_string(),
                        excerpt: excerpt(&bytes),
                    };
                    return CaseResult::new(id, Outcome::Fail(mismatch));
                }
            }
            match case.input() {
                CaseInput::Tampered(tamper) => match case_guard("tamper", || tamper(bytes)) {
                    Ok(bytes) => bytes,
                    Err(fault) => return CaseResult::new(id, Outcome::Error(fault)),
                },
                _ => bytes,
            }
        }
    };

    let result = match attempt(adapter, &bytes, case.shape()) {
        Ok(result) => result,
        Err(fault) => return CaseResult::new(id, Outcome::Error(fault)),
    };

    if let (Some(primary), Some(dispose)) = (result.primary_error(), result.dispose_error()) {
        warn!(
            case = id,
            adapter = adapter.name(),
            error = %primary,
            suppressed = %dispose,
            "deserialization failed; dispose failure kept as secondary"
        );
    }

    judge(case, result)
}

fn judge(case: &ConformanceCase, result: AdapterResult) -> CaseResult {
    let id = case.id();
    let secondary = result.dispose_error().cloned();

    let outcome = match (case.expectation(), result) {
        (Expectation::MustFailWith(expected), AdapterResult::Success(value))
        | (Expectation::MustFailWith(expected), AdapterResult::DisposeFailure(value, _)) => {
            Outcome::Fail(Mismatch::UnexpectedSuccess {
                expected: *expected,
                decoded: value.to_string(),
            })
        }
        (Expectation::MustFailWith(expected), AdapterResult::DeserializeFailure(actual))
        | (Expectation::MustFailWith(expected), AdapterResult::Both { deserialize: actual, .. }) => {
            if actual.kind() == *expected {
                Outcome::Pass
            } else {
                Outcome::Fail(Mismatch::WrongErrorKind {
                    expected: *expected,
                    actual,
                })
            }
        }
        (_, AdapterResult::Success(value)) => {
            match case_guard("expected value factory", || case.expected_value()) {
                Ok(expected) => match compare::diff(&expected, &value) {
                    None => Outcome::Pass,
                    Some(diff) => Outcome::Fail(Mismatch::Structural(diff)),
                },
                Err(fault) => Outcome::Error(fault),
            }
        }
        (_, AdapterResult::DisposeFailure(_, dispose)) => Outcome::Error(Fault::Dispose(dispose)),
        (_, AdapterResult::DeserializeFailure(cause)) => {
            Outcome::Error(Fault::deserialize(cause, None))
        }
        (_, AdapterResult::Both {
            deserialize,
            dispose,
        }) => Outcome::Error(Fault::deserialize(deserialize, Some(dispose))),
    };

    CaseResult::new(id, outcome).with_secondary(secondary)
}

fn catch<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Adapter code: a panic is the adapter's fault.
fn guard<T>(f: impl FnOnce() -> T) -> Result<T, Fault> {
    catch(f).map_err(Fault::Panic)
}

/// Case code: a panic means the case itself is broken.
fn case_guard<T>(what: &str, f: impl FnOnce() -> T) -> Result<T, Fault> {
    catch(f).map_err(|msg| Fault::InvalidCase(format!("{} panicked: {}", what, msg)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn excerpt(bytes: &[u8]) -> String {
    const LIMIT: usize = 64;
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(LIMIT)]);
    if bytes.len() > LIMIT {
        format!("{:?}...", text)
    } else {
        format!("{:?}", text)
    }
}
