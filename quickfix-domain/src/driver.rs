use crate::classify::{Params, Shape, classify};
use crate::error::{ErrorList, QuickFixError, Unresolved};
use crate::fixers::{self, Fixer};
use crate::locate::{enclosing_chain, find_file};
use quickfix_types::{Diagnostic, NodeId, Oracle, Package};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, debug_span, info};

pub const DEFAULT_MAX_TRIES: usize = 10;

/// A classified diagnostic waiting to be applied.
#[derive(Debug, Clone)]
pub struct Fix {
    pub diagnostic: Diagnostic,
    pub file: NodeId,
    pub chain: Vec<NodeId>,
    pub shape: Shape,
    pub params: Params,
}

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Oracle calls made.
    pub passes: usize,
    pub applied: BTreeMap<Shape, usize>,
}

impl PassReport {
    pub fn total_applied(&self) -> usize {
        self.applied.values().sum()
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pass(es), {} fix(es)",
            self.passes,
            self.total_applied()
        )?;
        if !self.applied.is_empty() {
            let parts: Vec<String> = self
                .applied
                .iter()
                .map(|(shape, n)| format!("{shape}: {n}"))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

struct PassOutcome {
    found_error: bool,
    unhandled: Vec<Unresolved>,
}

/// The fix-point driver.
///
/// Each pass asks the oracle for diagnostics, classifies all of them, and
/// only then applies the resulting fixes, so no edit can disturb a position
/// that is still to be looked up. Passes repeat until the oracle reports
/// nothing or `max_tries` passes have run.
pub struct QuickFixer<O> {
    oracle: O,
    fixers: Vec<Box<dyn Fixer>>,
    max_tries: usize,
}

impl<O: Oracle> QuickFixer<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            fixers: fixers::builtin_fixers(),
            max_tries: DEFAULT_MAX_TRIES,
        }
    }

    pub fn with_fixers(oracle: O, fixers: Vec<Box<dyn Fixer>>) -> Self {
        Self {
            oracle,
            fixers,
            max_tries: DEFAULT_MAX_TRIES,
        }
    }

    pub fn max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Rewrite `package` until it checks cleanly.
    ///
    /// Fails with the unresolved diagnostics of the last pass when the budget
    /// runs out. A last pass that found diagnostics but fixed all of them
    /// still counts as success.
    pub fn quick_fix(&self, package: &mut Package) -> Result<PassReport, QuickFixError> {
        let mut report = PassReport::default();
        let mut unhandled = Vec::new();

        for pass in 1..=self.max_tries {
            let span = debug_span!("pass", pass);
            let _enter = span.enter();

            let outcome = self.pass(package, &mut report);
            report.passes = pass;
            unhandled = outcome.unhandled;
            if !outcome.found_error {
                info!(package = %package.name, passes = pass, fixes = report.total_applied(), "converged");
                return Ok(report);
            }
        }

        if unhandled.is_empty() {
            return Ok(report);
        }
        info!(
            package = %package.name,
            passes = report.passes,
            unresolved = unhandled.len(),
            "budget exhausted"
        );
        Err(QuickFixError::Unresolved(ErrorList(unhandled)))
    }

    fn pass(&self, package: &mut Package, report: &mut PassReport) -> PassOutcome {
        let diagnostics = self.oracle.check(package);
        debug!(diagnostics = diagnostics.len(), "checked");

        let mut fixes = Vec::new();
        let mut unhandled = Vec::new();
        let found_error = !diagnostics.is_empty();

        for diagnostic in diagnostics {
            let Some(file) = find_file(package, diagnostic.pos) else {
                unhandled.push(Unresolved::Unlocated { diagnostic });
                continue;
            };
            let Some((shape, params)) = classify(&diagnostic.message) else {
                let position = package.position(diagnostic.pos);
                unhandled.push(Unresolved::Unrecognized {
                    diagnostic,
                    position,
                });
                continue;
            };
            let chain = enclosing_chain(&package.ast, file, diagnostic.pos);
            fixes.push(Fix {
                diagnostic,
                file,
                chain,
                shape,
                params,
            });
        }

        for fix in fixes {
            let applied = match self.fixers.iter().find(|f| f.shape() == fix.shape) {
                Some(fixer) => fixer.apply(&mut package.ast, &fix.chain, &fix.params),
                None => {
                    let position = package.position(fix.diagnostic.pos);
                    unhandled.push(Unresolved::Unrecognized {
                        diagnostic: fix.diagnostic,
                        position,
                    });
                    continue;
                }
            };
            match applied {
                Ok(()) => {
                    debug!(shape = %fix.shape, message = %fix.diagnostic.message, "applied");
                    *report.applied.entry(fix.shape).or_default() += 1;
                }
                Err(reason) => {
                    debug!(shape = %fix.shape, %reason, "fix failed");
                    let position = package.position(fix.diagnostic.pos);
                    unhandled.push(Unresolved::FixFailed {
                        diagnostic: fix.diagnostic,
                        position,
                        reason,
                    });
                }
            }
        }

        PassOutcome {
            found_error,
            unhandled,
        }
    }
}
