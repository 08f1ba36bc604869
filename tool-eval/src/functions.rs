//! The closed namespace of callable functions and named constants.

use std::collections::BTreeSet;

/// Known functions with their fixed arities and implementations.
///
/// This table is the entire callable surface of the evaluator; nothing
/// outside it can ever be invoked.
const FUNCTIONS: &[(&str, usize, fn(&[f64]) -> f64)] = &[
    ("sqrt", 1, |a| a[0].sqrt()),
    ("pow", 2, |a| a[0].powf(a[1])),
    ("abs", 1, |a| a[0].abs()),
    ("sin", 1, |a| a[0].sin()),
    ("cos", 1, |a| a[0].cos()),
    ("tan", 1, |a| a[0].tan()),
    ("log", 1, |a| a[0].ln()),
    ("log10", 1, |a| a[0].log10()),
    ("floor", 1, |a| a[0].floor()),
    ("ceil", 1, |a| a[0].ceil()),
    ("round", 1, |a| a[0].round()),
    ("min", 2, |a| a[0].min(a[1])),
    ("max", 2, |a| a[0].max(a[1])),
];

/// Resolves a named constant.
pub(crate) fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

/// The set of functions enabled for one evaluator instance.
///
/// Deployments may restrict the built-in whitelist further via
/// configuration; they can never widen it.
#[derive(Debug, Clone)]
pub struct FunctionSet {
    enabled: BTreeSet<&'static str>,
}

impl FunctionSet {
    /// Enables every built-in function.
    #[must_use]
    pub fn all() -> Self {
        Self {
            enabled: FUNCTIONS.iter().map(|(name, _, _)| *name).collect(),
        }
    }

    /// Enables only the named subset of the built-in functions.
    ///
    /// Names that are not built in are ignored; the namespace stays closed.
    #[must_use]
    pub fn restricted<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: BTreeSet<String> =
            names.into_iter().map(|n| n.as_ref().to_string()).collect();
        Self {
            enabled: FUNCTIONS
                .iter()
                .map(|(name, _, _)| *name)
                .filter(|name| requested.contains(*name))
                .collect(),
        }
    }

    /// Returns `true` when the named function is callable.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// Returns the fixed arity of an enabled function.
    #[must_use]
    pub fn arity(&self, name: &str) -> Option<usize> {
        if !self.enabled.contains(name) {
            return None;
        }
        FUNCTIONS
            .iter()
            .find(|(fname, _, _)| *fname == name)
            .map(|(_, arity, _)| *arity)
    }

    /// Applies an enabled function to pre-evaluated arguments.
    ///
    /// Callers must have validated the name and arity via [`Self::arity`].
    pub(crate) fn apply(&self, name: &str, args: &[f64]) -> Option<f64> {
        if !self.enabled.contains(name) {
            return None;
        }
        FUNCTIONS
            .iter()
            .find(|(fname, arity, _)| *fname == name && *arity == args.len())
            .map(|(_, _, f)| f(args))
    }

    /// Returns the enabled function names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.enabled.iter().copied().collect()
    }
}

impl Default for FunctionSet {
    fn default() -> Self {
        Self::all()
    }
}
