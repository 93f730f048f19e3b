//! Branch conditions.
//!
//! A [`Cond`] is either a single comparison ([`SimpleCond`]) or an alternating sequence of
//! conditions and connectives ([`CompoundCond`]). Negation applies De Morgan's laws
//! recursively and is an involution: negating twice yields an equal condition.

use std::{borrow::Cow, fmt};

use crate::{
    ir::{
        expr::Expr,
        op::{CmpOp, Logic},
        render::Diagnostic,
    },
    Result,
};

/// A comparison `lhs op rhs`.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{CmpOp, Expr, SimpleCond};
///
/// let cond = SimpleCond::new(Expr::addr("a"), CmpOp::Eq, Expr::addr("b"));
/// assert_eq!(cond.negate().to_string(), "(a != b)");
/// assert_eq!(cond.negate().negate(), cond);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleCond {
    /// Left operand
    pub lhs: Expr,
    /// Comparison
    pub op: CmpOp,
    /// Right operand
    pub rhs: Expr,
}

impl SimpleCond {
    /// Creates a comparison.
    #[must_use]
    pub fn new(lhs: Expr, op: CmpOp, rhs: Expr) -> Self {
        SimpleCond { lhs, op, rhs }
    }

    /// Returns the complementary comparison over the same operands.
    #[must_use]
    pub fn negate(&self) -> Self {
        SimpleCond {
            lhs: self.lhs.clone(),
            op: self.op.negate(),
            rhs: self.rhs.clone(),
        }
    }

    /// Returns the equivalent comparison with the operands swapped.
    #[must_use]
    pub fn swapped(&self) -> Self {
        SimpleCond {
            lhs: self.rhs.clone(),
            op: self.op.swapped(),
            rhs: self.lhs.clone(),
        }
    }
}

impl fmt::Display for SimpleCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.lhs, self.op, self.rhs)
    }
}

/// One element of a compound condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CondItem {
    /// A nested condition
    Cond(Cond),
    /// A connective between the neighbouring conditions
    Logic(Logic),
}

impl fmt::Display for CondItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondItem::Cond(cond) => write!(f, "{cond}"),
            CondItem::Logic(logic) => write!(f, "{logic}"),
        }
    }
}

/// A sequence `c1 L1 c2 L2 ... cn` of conditions joined by connectives.
///
/// The sequence has odd length, conditions at even positions and connectives at odd
/// positions. The constructors enforce this, so every value of this type is well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundCond {
    items: Vec<CondItem>,
}

impl CompoundCond {
    /// Creates a compound condition from alternating items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if `items` is empty, has even
    /// length, or does not alternate between conditions and connectives.
    pub fn new(items: Vec<CondItem>) -> Result<Self> {
        if items.len() % 2 == 0 {
            return Err(malformed_error!(
                "Compound condition needs an odd number of items, got {}",
                items.len()
            ));
        }
        for (i, item) in items.iter().enumerate() {
            let ok = match item {
                CondItem::Cond(_) => i % 2 == 0,
                CondItem::Logic(_) => i % 2 == 1,
            };
            if !ok {
                return Err(malformed_error!(
                    "Compound condition items do not alternate at position {}",
                    i
                ));
            }
        }
        Ok(CompoundCond { items })
    }

    /// Creates `lhs logic rhs`.
    #[must_use]
    pub fn pair(lhs: Cond, logic: Logic, rhs: Cond) -> Self {
        CompoundCond {
            items: vec![
                CondItem::Cond(lhs),
                CondItem::Logic(logic),
                CondItem::Cond(rhs),
            ],
        }
    }

    /// Extends the sequence with `logic cond`.
    pub fn append(&mut self, logic: Logic, cond: Cond) {
        self.items.push(CondItem::Logic(logic));
        self.items.push(CondItem::Cond(cond));
    }

    /// Returns the alternating items.
    #[must_use]
    pub fn items(&self) -> &[CondItem] {
        &self.items
    }

    /// Applies De Morgan's laws: every condition and every connective is negated.
    #[must_use]
    pub fn negate(&self) -> Self {
        CompoundCond {
            items: self
                .items
                .iter()
                .map(|item| match item {
                    CondItem::Cond(cond) => CondItem::Cond(cond.negate()),
                    CondItem::Logic(logic) => CondItem::Logic(logic.negate()),
                })
                .collect(),
        }
    }
}

impl fmt::Display for CompoundCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str(")")
    }
}

/// A branch condition.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{CmpOp, CompoundCond, Cond, Expr, Logic, SimpleCond};
///
/// let a = Cond::from(SimpleCond::new(Expr::reg("r1"), CmpOp::Lt, Expr::value(4)));
/// let b = Cond::from(SimpleCond::new(Expr::reg("r2"), CmpOp::Eq, Expr::value(0)));
/// let both = Cond::from(CompoundCond::pair(a, Logic::And, b));
///
/// assert_eq!(both.to_string(), "(($r1 < 0x4) && ($r2 == 0x0))");
/// assert_eq!(both.negate().to_string(), "(($r1 >= 0x4) || ($r2 != 0x0))");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cond {
    /// A single comparison
    Simple(SimpleCond),
    /// A sequence of conditions joined by connectives
    Compound(CompoundCond),
}

impl Cond {
    /// Returns the logical complement of this condition.
    #[must_use]
    pub fn negate(&self) -> Self {
        match self {
            Cond::Simple(cond) => Cond::Simple(cond.negate()),
            Cond::Compound(cond) => Cond::Compound(cond.negate()),
        }
    }

    /// Returns the condition as an item sequence: a simple condition yields a one-item
    /// sequence containing itself, a compound condition yields its own items.
    #[must_use]
    pub fn flatten(&self) -> Cow<'_, [CondItem]> {
        match self {
            Cond::Simple(_) => Cow::Owned(vec![CondItem::Cond(self.clone())]),
            Cond::Compound(cond) => Cow::Borrowed(cond.items()),
        }
    }

    /// Collects every operand expression, left to right.
    #[must_use]
    pub fn exprs(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        self.collect_exprs(&mut out);
        out
    }

    fn collect_exprs<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            Cond::Simple(cond) => {
                out.push(&cond.lhs);
                out.push(&cond.rhs);
            }
            Cond::Compound(cond) => {
                for item in cond.items() {
                    if let CondItem::Cond(inner) = item {
                        inner.collect_exprs(out);
                    }
                }
            }
        }
    }

    /// Returns the diagnostic rendering adapter (`SCond(...)` / `CCond(...)`).
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_, Cond> {
        Diagnostic(self)
    }
}

impl From<SimpleCond> for Cond {
    fn from(cond: SimpleCond) -> Self {
        Cond::Simple(cond)
    }
}

impl From<CompoundCond> for Cond {
    fn from(cond: CompoundCond) -> Self {
        Cond::Compound(cond)
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::Simple(cond) => write!(f, "{cond}"),
            Cond::Compound(cond) => write!(f, "{cond}"),
        }
    }
}

impl fmt::Display for Diagnostic<'_, Cond> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Cond::Simple(cond) => write!(f, "SCond{cond}"),
            Cond::Compound(cond) => write!(f, "CCond{cond}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn simple(lhs: &str, op: CmpOp, rhs: i64) -> Cond {
        SimpleCond::new(Expr::reg(lhs), op, Expr::value(rhs)).into()
    }

    #[test]
    fn test_simple_negate_renders() {
        let cond = SimpleCond::new(Expr::addr("a"), CmpOp::Eq, Expr::addr("b"));
        assert_eq!(cond.to_string(), "(a == b)");
        assert_eq!(cond.negate().to_string(), "(a != b)");
    }

    #[test]
    fn test_negate_is_involution() {
        let cond = Cond::from(CompoundCond::pair(
            simple("r1", CmpOp::Lt, 1),
            Logic::Or,
            CompoundCond::pair(
                simple("r2", CmpOp::Ge, 2),
                Logic::And,
                simple("r3", CmpOp::Ne, 3),
            )
            .into(),
        ));
        assert_eq!(cond.negate().negate(), cond);
        assert_ne!(cond.negate(), cond);
    }

    #[test]
    fn test_compound_de_morgan() {
        let cond = Cond::from(CompoundCond::pair(
            simple("a", CmpOp::Eq, 0),
            Logic::And,
            simple("b", CmpOp::Gt, 1),
        ));
        let expected = Cond::from(CompoundCond::pair(
            simple("a", CmpOp::Ne, 0),
            Logic::Or,
            simple("b", CmpOp::Le, 1),
        ));
        assert_eq!(cond.negate(), expected);
    }

    #[test]
    fn test_swapped() {
        let cond = SimpleCond::new(Expr::reg("r1"), CmpOp::Lt, Expr::value(4));
        assert_eq!(cond.swapped().to_string(), "(0x4 > $r1)");
    }

    #[test]
    fn test_compound_rejects_bad_shape() {
        let c = CondItem::Cond(simple("r1", CmpOp::Eq, 0));
        let l = CondItem::Logic(Logic::And);

        assert!(matches!(
            CompoundCond::new(vec![]),
            Err(Error::Malformed { .. })
        ));
        assert!(CompoundCond::new(vec![c.clone(), l.clone()]).is_err());
        assert!(CompoundCond::new(vec![l.clone(), c.clone(), l.clone()]).is_err());
        assert!(CompoundCond::new(vec![c.clone(), c.clone(), c.clone()]).is_err());
        assert!(CompoundCond::new(vec![c.clone(), l, c.clone()]).is_ok());
        assert!(CompoundCond::new(vec![c]).is_ok());
    }

    #[test]
    fn test_append() {
        let mut cond = CompoundCond::pair(
            simple("r1", CmpOp::Eq, 0),
            Logic::And,
            simple("r2", CmpOp::Eq, 0),
        );
        cond.append(Logic::Or, simple("r3", CmpOp::Eq, 0));
        assert_eq!(cond.items().len(), 5);
        assert_eq!(
            cond.to_string(),
            "(($r1 == 0x0) && ($r2 == 0x0) || ($r3 == 0x0))"
        );
    }

    #[test]
    fn test_flatten() {
        let s = simple("r1", CmpOp::Eq, 0);
        assert_eq!(s.flatten().as_ref(), &[CondItem::Cond(s.clone())]);

        let c = Cond::from(CompoundCond::pair(s.clone(), Logic::Or, s.clone()));
        let flat = c.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[1], CondItem::Logic(Logic::Or));
    }

    #[test]
    fn test_exprs() {
        let c = Cond::from(CompoundCond::pair(
            simple("r1", CmpOp::Eq, 0),
            Logic::Or,
            simple("r2", CmpOp::Eq, 1),
        ));
        let exprs = c.exprs();
        assert_eq!(
            exprs,
            vec![
                &Expr::reg("r1"),
                &Expr::value(0),
                &Expr::reg("r2"),
                &Expr::value(1)
            ]
        );
    }

    #[test]
    fn test_diagnostic() {
        let s = simple("r1", CmpOp::Eq, 0);
        assert_eq!(s.diagnostic().to_string(), "SCond($r1 == 0x0)");
        let c = Cond::from(CompoundCond::pair(s.clone(), Logic::And, s));
        assert_eq!(
            c.diagnostic().to_string(),
            "CCond(($r1 == 0x0) && ($r1 == 0x0))"
        );
    }
}
