//! Rule chain execution shared by every strategy.

use std::borrow::Cow;
use std::ops::ControlFlow;

use serde_json::Value;

use crate::accessor::Resolved;
use crate::definition::FieldDefinition;
use crate::error::{codes, ValidationError, ValidationErrors};
use crate::path::render_location;
use crate::plugin::{HoistedValidator, Outcome};

/// The first failing rule of a chain.
pub(crate) enum Failure<'c> {
    Invalid {
        rule: &'c HoistedValidator,
        message: Option<Cow<'static, str>>,
    },
    Fault {
        rule: &'c HoistedValidator,
        reason: String,
    },
}

impl Failure<'_> {
    pub(crate) fn into_error(self, value: Option<&Value>, path: String) -> ValidationError {
        match self {
            Failure::Invalid { rule, message } => {
                let message = message.unwrap_or_else(|| rule.error_message(value, &path));
                ValidationError::new(path, rule.code_cow(), message)
            }
            Failure::Fault { rule, reason } => ValidationError::new(
                path,
                codes::RULE_FAULT,
                format!("Rule `{}` failed: {reason}", rule.code()),
            ),
        }
    }
}

/// Runs a chain against one value and returns its first failure.
///
/// An `optional` rule accepts an absent value and a `nullable` rule a null
/// one, ending the chain early. Rules flagged `skip_for_undefined` or
/// `skip_for_null` are not run for such values.
pub(crate) fn run_chain<'c>(
    chain: &'c [HoistedValidator],
    value: Option<&Value>,
    root: &Value,
) -> Option<Failure<'c>> {
    for rule in chain {
        let flags = rule.flags();
        match value {
            None if flags.optional => return None,
            Some(Value::Null) if flags.nullable => return None,
            None if flags.skip_for_undefined => continue,
            Some(Value::Null) if flags.skip_for_null => continue,
            _ => {}
        }
        match rule.check(value, root) {
            Outcome::Valid => {}
            Outcome::Invalid { message } => return Some(Failure::Invalid { rule, message }),
            Outcome::Fault { reason } => return Some(Failure::Fault { rule, reason }),
        }
    }
    None
}

/// Where failures go during one run.
///
/// Without a buffer the run only answers "valid or not" and stops at the
/// first failure.
pub(crate) struct Report<'e> {
    errors: Option<&'e mut ValidationErrors>,
    abort_early: bool,
    failed: bool,
}

impl<'e> Report<'e> {
    pub(crate) const fn collect(errors: &'e mut ValidationErrors, abort_early: bool) -> Self {
        Self {
            errors: Some(errors),
            abort_early,
            failed: false,
        }
    }

    pub(crate) const fn verdict() -> Self {
        Self {
            errors: None,
            abort_early: true,
            failed: false,
        }
    }

    pub(crate) const fn failed(&self) -> bool {
        self.failed
    }

    /// Records a failure; the path is rendered only when errors are kept.
    pub(crate) fn record(
        &mut self,
        failure: Failure<'_>,
        value: Option<&Value>,
        path: impl FnOnce() -> String,
    ) -> ControlFlow<()> {
        self.failed = true;
        match self.errors.as_deref_mut() {
            None => ControlFlow::Break(()),
            Some(errors) => {
                errors.add(failure.into_error(value, path()));
                if self.abort_early {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }
}

/// Checks a field at every location it resolved to.
///
/// Each element of a wildcard field is checked on its own; the field stops
/// at the first failing element only when the report aborts early.
pub(crate) fn check_locations<'r, 'a: 'r, I>(
    definition: &FieldDefinition,
    locations: I,
    root: &Value,
    report: &mut Report<'_>,
) -> ControlFlow<()>
where
    I: IntoIterator<Item = &'r Resolved<'a>>,
{
    let requires_parent_object = definition.metadata().requires_parent_object;
    for resolved in locations {
        if requires_parent_object && !resolved.parent_is_object {
            continue;
        }
        if let Some(failure) = run_chain(definition.rule_chain(), resolved.value, root) {
            report.record(failure, resolved.value, || render_location(&resolved.location))?;
        }
    }
    ControlFlow::Continue(())
}
