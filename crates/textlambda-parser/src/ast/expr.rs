//! Typed expression tree.
//!
//! Every node carries its resolved static type; conversions chosen by the
//! parser (numeric promotion, boxing for concatenation, nullable lifting)
//! appear as explicit [`ExprKind::Cast`] nodes. Children are owned, so the
//! tree is acyclic and immutable once built.

use textlambda_core::{DataType, Span, Value};
use textlambda_registry::{ConstructorRef, MemberRef, MethodRef};

use super::ops::{BinaryOp, TypeTestOp, UnaryOp};

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: DataType,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: DataType, span: Span) -> Self {
        Self { kind, ty, span }
    }

    pub fn literal(value: Value, ty: DataType, span: Span) -> Self {
        Self::new(ExprKind::Literal(value), ty, span)
    }

    /// Wrap in a conversion to `ty`; a no-op when the type already matches.
    pub fn cast_to(self, ty: &DataType) -> Expr {
        if self.ty == *ty {
            return self;
        }
        let span = self.span;
        Expr::new(
            ExprKind::Cast {
                operand: Box::new(self),
            },
            ty.clone(),
            span,
        )
    }

    /// The constant value, for literal nodes.
    pub fn as_literal(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Number of nodes in the tree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children().map(Expr::node_count).sum::<usize>()
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> impl Iterator<Item = &Expr> {
        let mut out: Vec<&Expr> = Vec::new();
        match &self.kind {
            ExprKind::Literal(_)
            | ExprKind::Parameter { .. }
            | ExprKind::TypeOf(_)
            | ExprKind::SizeOf(_) => {}
            ExprKind::Unary { operand, .. }
            | ExprKind::Cast { operand }
            | ExprKind::TypeTest { operand, .. } => out.push(operand),
            ExprKind::Binary { left, right, .. } | ExprKind::NullCoalesce { left, right } => {
                out.push(left);
                out.push(right);
            }
            ExprKind::Conditional {
                test,
                then_branch,
                else_branch,
            } => out.extend([&**test, &**then_branch, &**else_branch]),
            ExprKind::Call { target, args, .. } => {
                out.extend(target.as_deref());
                out.extend(args);
            }
            ExprKind::Member { target, .. } => out.extend(target.as_deref()),
            ExprKind::Index { target, index } => out.extend([&**target, &**index]),
            ExprKind::New {
                args, initializer, ..
            } => {
                out.extend(args);
                match initializer {
                    Some(Initializer::Members(members)) => {
                        out.extend(members.iter().map(|(_, value)| value))
                    }
                    Some(Initializer::Collection(items)) => {
                        out.extend(items.iter().map(|(_, value)| value))
                    }
                    None => {}
                }
            }
            ExprKind::NewArray { init, .. } => match init {
                ArrayInit::Length(length) => out.push(length),
                ArrayInit::Items(items) => out.extend(items),
            },
        }
        out.into_iter()
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Value),
    /// A lambda parameter, by position in the parameter list.
    Parameter { ordinal: usize, name: String },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Both operands already have the operator's operand type.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `left ?? right`; `left` is evaluated once and converted to the node
    /// type when it is not null.
    NullCoalesce { left: Box<Expr>, right: Box<Expr> },
    /// Method call; `target` is `None` for static methods. Indexers lower to
    /// a call of the default member's getter.
    Call {
        target: Option<Box<Expr>>,
        method: MethodRef,
        args: Vec<Expr>,
    },
    /// Property or field read; `target` is `None` for static members.
    Member {
        target: Option<Box<Expr>>,
        member: MemberRef,
    },
    /// Array element read.
    Index { target: Box<Expr>, index: Box<Expr> },
    New {
        constructor: ConstructorRef,
        args: Vec<Expr>,
        initializer: Option<Initializer>,
    },
    NewArray { element: DataType, init: ArrayInit },
    /// Conversion of `operand` to the node type.
    Cast { operand: Box<Expr> },
    TypeOf(DataType),
    SizeOf(DataType),
    TypeTest {
        op: TypeTestOp,
        operand: Box<Expr>,
        target: DataType,
    },
}

/// The `{ ... }` following `new T(...)`.
#[derive(Debug, Clone)]
pub enum Initializer {
    /// `{ Name = value, ... }`, assigned through each member's setter.
    Members(Vec<(MemberRef, Expr)>),
    /// `{ a, b, ... }`, each passed to the resolved `Add` overload.
    Collection(Vec<(MethodRef, Expr)>),
}

#[derive(Debug, Clone)]
pub enum ArrayInit {
    /// `new T[n]`, default-filled.
    Length(Box<Expr>),
    /// `new T[] { a, b }`.
    Items(Vec<Expr>),
}
