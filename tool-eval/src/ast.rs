//! Ephemeral parse tree for one evaluation.

/// Binary operators, in source form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^` (right-associative)
    Pow,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Leading `-`
    Neg,
}

/// A node of the expression tree.
///
/// Trees are owned by a single evaluation and never cached or shared across
/// calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Named constant reference (`pi`, `e`, or an unknown identifier that
    /// evaluation will reject).
    Identifier {
        /// Identifier text.
        name: String,
        /// Byte offset of the identifier in the source.
        position: usize,
    },
    /// Unary operator application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// Operand subtree.
        operand: Box<Expr>,
    },
    /// Binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Whitelisted function call.
    Call {
        /// Function name as written.
        name: String,
        /// Byte offset of the call in the source.
        position: usize,
        /// Argument subtrees.
        args: Vec<Expr>,
    },
}
