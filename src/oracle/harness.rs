use super::{TestCase, compare};
use crate::common::Result;
use crate::dispatch::Dispatcher;
use rayon::prelude::*;

/// Runs one test body under several dispatchers and compares the results.
///
/// The first dispatcher is the reference; every other variant is compared
/// against it.
#[derive(Debug, Clone)]
pub struct Harness {
    variants: Vec<Dispatcher>,
}

/// Aggregated result of a [`Harness::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOutcome {
    pub passed: bool,
    /// Diagnostic blocks in variant order.
    pub diagnostics: String,
    /// Architecture label of each variant, reference first.
    pub labels: Vec<String>,
}

impl Harness {
    pub fn new(variants: Vec<Dispatcher>) -> Self {
        Self { variants }
    }

    /// Scalar reference plus every capability level this host can run.
    pub fn host() -> Self {
        Self::new(Dispatcher::variants())
    }

    pub fn variants(&self) -> &[Dispatcher] {
        &self.variants
    }

    /// Capture `test` once per variant, then compare each capture with the
    /// reference.
    ///
    /// A variant whose test body fails is reported as fatal for that variant.
    pub fn run<F>(&self, name: &str, file: &str, test: F) -> HarnessOutcome
    where
        F: Fn(&Dispatcher, &mut TestCase) -> Result<()> + Sync,
    {
        let labels: Vec<String> = self.variants.iter().map(Dispatcher::label).collect();

        let cases: Vec<Result<TestCase>> = self
            .variants
            .par_iter()
            .map(|dispatcher| {
                let mut case = TestCase::new(name, file);
                test(dispatcher, &mut case)?;
                Ok(case)
            })
            .collect();

        let Some(reference) = cases.first() else {
            return HarnessOutcome {
                passed: true,
                diagnostics: String::new(),
                labels,
            };
        };

        let results: Vec<(bool, String)> = match reference {
            Err(err) => vec![(false, format!("FATAL: [{}] {name}: {err}\n", labels[0]))],
            Ok(reference) => cases[1..]
                .par_iter()
                .zip(&labels[1..])
                .map(|(case, label)| match case {
                    Ok(case) => {
                        let mut diagnostics = String::new();
                        let ok = compare(reference, &labels[0], case, label, &mut diagnostics);
                        (ok, diagnostics)
                    }
                    Err(err) => (false, format!("FATAL: [{label}] {name}: {err}\n")),
                })
                .collect(),
        };

        let passed = results.iter().all(|(ok, _)| *ok);
        if !passed {
            log::debug!("Test `{name}` diverged across [{}]", labels.join(", "));
        }

        HarnessOutcome {
            passed,
            diagnostics: results.into_iter().map(|(_, text)| text).collect(),
            labels,
        }
    }
}
