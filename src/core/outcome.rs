//! Tagged result for steps that can end without doing anything.

use std::fmt;

/// Outcome of a sync step.
///
/// Only `Done` carries data. `AlreadyProcessed` and `NoSheetForPeriod`
/// mean there was nothing to do and are not errors. `Failed` is a remote
/// error that was caught and logged rather than propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    AlreadyProcessed(String),
    NoSheetForPeriod(String),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self.into_done() {
            Ok(value) => Outcome::Done(f(value)),
            Err(other) => other,
        }
    }

    /// Split off the `Done` value, re-tagging anything else so it can be
    /// returned from a step with a different payload type.
    pub fn into_done<U>(self) -> Result<T, Outcome<U>> {
        match self {
            Outcome::Done(value) => Ok(value),
            Outcome::AlreadyProcessed(info) => Err(Outcome::AlreadyProcessed(info)),
            Outcome::NoSheetForPeriod(info) => Err(Outcome::NoSheetForPeriod(info)),
            Outcome::Failed(reason) => Err(Outcome::Failed(reason)),
        }
    }
}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done(_) => write!(f, "done"),
            Outcome::AlreadyProcessed(info) => write!(f, "{}", info),
            Outcome::NoSheetForPeriod(info) => write!(f, "{}", info),
            Outcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_done_retags_sentinels() {
        let outcome: Outcome<String> = Outcome::NoSheetForPeriod("no sheet".to_string());
        let retagged: Result<String, Outcome<u32>> = outcome.into_done();
        assert_eq!(
            retagged,
            Err(Outcome::NoSheetForPeriod("no sheet".to_string()))
        );

        let outcome: Outcome<String> = Outcome::Done("id".to_string());
        assert_eq!(outcome.into_done::<u32>(), Ok("id".to_string()));
    }

    #[test]
    fn test_map_and_display() {
        let outcome = Outcome::Done(2).map(|n| n * 2);
        assert_eq!(outcome, Outcome::Done(4));
        assert!(outcome.is_done());

        let outcome: Outcome<i32> = Outcome::Failed("boom".to_string());
        assert_eq!(outcome.clone().map(|n| n + 1), Outcome::Failed("boom".to_string()));
        assert_eq!(outcome.to_string(), "failed: boom");
        assert_eq!(outcome.done(), None);

        let outcome: Outcome<()> =
            Outcome::AlreadyProcessed("Data till 2024/11/22 already exists".to_string());
        assert_eq!(outcome.to_string(), "Data till 2024/11/22 already exists");
    }
}
