//! Tree-walking evaluation.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EvalError, EvalResult};
use crate::functions::{FunctionSet, constant};
use crate::parser::Parser;
use crate::token::tokenize;

/// Evaluates an expression with the full built-in function whitelist.
///
/// # Errors
///
/// Returns [`EvalError::InvalidExpression`], [`EvalError::DivisionByZero`],
/// or [`EvalError::UnknownIdentifier`]; no other failure mode exists.
pub fn evaluate(input: &str) -> EvalResult<f64> {
    Evaluator::default().evaluate(input)
}

/// A stateless expression evaluator over a fixed function whitelist.
///
/// Evaluators are pure functions of their input: the same expression always
/// yields the same result, and nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    functions: FunctionSet,
}

impl Evaluator {
    /// Creates an evaluator restricted to the supplied function set.
    #[must_use]
    pub fn new(functions: FunctionSet) -> Self {
        Self { functions }
    }

    /// Returns the function whitelist in effect.
    #[must_use]
    pub fn functions(&self) -> &FunctionSet {
        &self.functions
    }

    /// Parses and evaluates one expression.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidExpression`] for malformed syntax or a
    /// non-finite result, [`EvalError::DivisionByZero`] for `/` or `%` with a
    /// zero divisor, and [`EvalError::UnknownIdentifier`] for any name
    /// outside the whitelist.
    pub fn evaluate(&self, input: &str) -> EvalResult<f64> {
        let tokens = tokenize(input)?;
        let expr = Parser::new(tokens, input.len()).parse()?;
        let value = self.fold(&expr)?;

        if !value.is_finite() {
            return Err(EvalError::invalid(
                0,
                "expression does not evaluate to a finite number",
            ));
        }

        Ok(value)
    }

    fn fold(&self, expr: &Expr) -> EvalResult<f64> {
        match expr {
            Expr::Number(value) => Ok(*value),
            Expr::Identifier { name, .. } => constant(name).ok_or_else(|| {
                EvalError::UnknownIdentifier { name: name.clone() }
            }),
            Expr::Unary { op: UnaryOp::Neg, operand } => Ok(-self.fold(operand)?),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.fold(lhs)?;
                let rhs = self.fold(rhs)?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Pow => Ok(lhs.powf(rhs)),
                    BinaryOp::Div => {
                        if rhs == 0.0 {
                            Err(EvalError::DivisionByZero)
                        } else {
                            Ok(lhs / rhs)
                        }
                    }
                    BinaryOp::Rem => {
                        if rhs == 0.0 {
                            Err(EvalError::DivisionByZero)
                        } else {
                            Ok(lhs % rhs)
                        }
                    }
                }
            }
            Expr::Call { name, position, args } => {
                let Some(arity) = self.functions.arity(name) else {
                    return Err(EvalError::UnknownIdentifier { name: name.clone() });
                };
                if args.len() != arity {
                    return Err(EvalError::invalid(
                        *position,
                        format!(
                            "`{name}` expects {arity} argument(s), got {}",
                            args.len()
                        ),
                    ));
                }

                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.fold(arg)?);
                }

                self.functions
                    .apply(name, &values)
                    .ok_or_else(|| EvalError::UnknownIdentifier { name: name.clone() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(input: &str, expected: f64) {
        let value = evaluate(input).unwrap_or_else(|err| panic!("`{input}` failed: {err}"));
        assert!(
            (value - expected).abs() < 1e-9,
            "`{input}` = {value}, expected {expected}"
        );
    }

    #[test]
    fn arithmetic_with_precedence() {
        assert_close("2 + 2 * 3", 8.0);
        assert_close("(2 + 2) * 3", 12.0);
        assert_close("10 % 3", 1.0);
        assert_close("2 ^ 3 ^ 2", 512.0);
        assert_close("-2 ^ 2", -4.0);
        assert_close("7 / 2", 3.5);
    }

    #[test]
    fn whitelisted_functions_and_constants() {
        assert_close("sqrt(16) + pow(2, 3)", 12.0);
        assert_close("abs(-5)", 5.0);
        assert_close("floor(2.9) + ceil(2.1)", 5.0);
        assert_close("round(2.5)", 3.0);
        assert_close("min(3, 7) + max(3, 7)", 10.0);
        assert_close("cos(0) + sin(0)", 1.0);
        assert_close("pi", std::f64::consts::PI);
        assert_close("e", std::f64::consts::E);
        assert_close("log(e)", 1.0);
        assert_close("log10(1000)", 3.0);
    }

    #[test]
    fn division_by_zero_is_structured() {
        assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("5 % 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1 / (2 - 2)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn host_symbols_are_never_resolved() {
        assert!(matches!(
            evaluate("__builtins__"),
            Err(EvalError::UnknownIdentifier { .. })
        ));
        assert!(matches!(
            evaluate("os"),
            Err(EvalError::UnknownIdentifier { .. })
        ));
        // Two identifiers in a row fail parsing before evaluation.
        assert!(matches!(
            evaluate("import os"),
            Err(EvalError::InvalidExpression { .. })
        ));
        assert!(matches!(
            evaluate("exec(1)"),
            Err(EvalError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn wrong_arity_is_invalid_with_position() {
        let err = evaluate("1 + sqrt(1, 2)").unwrap_err();
        assert!(matches!(err, EvalError::InvalidExpression { position: 4, .. }));
    }

    #[test]
    fn restricted_set_rejects_disabled_functions() {
        let evaluator = Evaluator::new(FunctionSet::restricted(["sqrt"]));
        assert!((evaluator.evaluate("sqrt(9)").unwrap() - 3.0).abs() < 1e-9);
        assert!(matches!(
            evaluator.evaluate("pow(2, 3)"),
            Err(EvalError::UnknownIdentifier { name }) if name == "pow"
        ));
    }

    #[test]
    fn non_finite_results_are_rejected() {
        assert!(matches!(
            evaluate("pow(10, 10000)"),
            Err(EvalError::InvalidExpression { .. })
        ));
        assert!(matches!(
            evaluate("sqrt(0 - 1)"),
            Err(EvalError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let first = evaluate("sqrt(2) * pi");
        let second = evaluate("sqrt(2) * pi");
        assert_eq!(first, second);
    }
}
