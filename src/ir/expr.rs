//! Operand expressions.
//!
//! An [`Expr`] is one of five variants (see [`ExprKind`]): a register, an immediate value,
//! a symbolic address, a memory reference or a synthetic function reference injected by a
//! transformation. Every expression additionally carries a free-form `comment` that is
//! prefixed to both renderings and used by passes to mark provenance.
//!
//! # Equality
//!
//! Equality and hashing are structural and variant-tagged. The comment is not part of the
//! value and neither is the display radix of a [`Value`]: `0x10` and `16` are the same
//! constant. A register named `foo` never equals the address `foo`.
//!
//! # Ordering
//!
//! Only registers and memory references are ordered. Registers compare by the natural
//! order of their names, memory references by `(base, offset)`. A register and a memory
//! reference compare by variant name. All other pairings have no order and
//! [`Expr::try_cmp`] reports them as [`Error::Unordered`]; [`PartialOrd`] returns `None`
//! for exactly the same pairs.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use strum::IntoStaticStr;

use crate::{ir::render::Diagnostic, utils::natural_cmp, Error, Result};

/// Display base of an immediate [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Radix {
    /// `0x1f`
    #[default]
    Hex,
    /// `31`
    Dec,
}

/// An immediate constant.
///
/// The radix is a rendering hint only and is ignored by equality and hashing.
#[derive(Debug, Clone, Copy)]
pub struct Value {
    /// The numeric value
    pub value: i64,
    /// The base used when rendering
    pub radix: Radix,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.radix {
            Radix::Hex => write_hex(f, self.value),
            Radix::Dec => write!(f, "{}", self.value),
        }
    }
}

/// Writes `value` as `0x..`, with a leading `-` for negative values.
fn write_hex(f: &mut fmt::Formatter<'_>, value: i64) -> fmt::Result {
    if value < 0 {
        write!(f, "-0x{:x}", value.unsigned_abs())
    } else {
        write!(f, "0x{value:x}")
    }
}

/// A dereference of `base + offset` as an element of type `ty`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemRef {
    /// Element type tag, e.g. `u32`
    pub ty: String,
    /// Base address expression
    pub base: Box<Expr>,
    /// Byte offset added to the base
    pub offset: i64,
}

impl fmt::Display for MemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset.cmp(&0) {
            Ordering::Equal => write!(f, "*({}*){}", self.ty, self.base),
            Ordering::Greater => write!(f, "*({}*)({} + 0x{:x})", self.ty, self.base, self.offset),
            Ordering::Less => write!(
                f,
                "*({}*)({} - 0x{:x})",
                self.ty,
                self.base,
                self.offset.unsigned_abs()
            ),
        }
    }
}

/// The variant of an [`Expr`].
///
/// The static string of each variant (via [`IntoStaticStr`]) is its variant name, used for
/// the register/memory fallback order and in error messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum ExprKind {
    /// A machine or virtual register
    #[strum(serialize = "Register")]
    Reg(String),
    /// An immediate constant
    #[strum(serialize = "Value")]
    Value(Value),
    /// An unresolved, symbolic location
    #[strum(serialize = "Address")]
    Addr(String),
    /// A memory dereference
    #[strum(serialize = "MemoryRef")]
    Mem(MemRef),
    /// A call target injected by a transformation, not a real operand
    #[strum(serialize = "SyntheticFunc")]
    SFunc(String),
}

/// An operand expression.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::Expr;
///
/// let r2 = Expr::reg("r2");
/// let r10 = Expr::reg("r10");
/// assert!(r2 < r10);
/// assert_eq!(r2.to_string(), "$r2");
///
/// let mem = Expr::mem("u32", Expr::reg("sp"), 8);
/// assert_eq!(mem.to_string(), "*(u32*)($sp + 0x8)");
/// assert_eq!(mem.as_reg(), Some(&Expr::reg("sp")));
/// ```
#[derive(Debug, Clone)]
pub struct Expr {
    /// The variant and its fields
    pub kind: ExprKind,
    /// Free-form annotation prefixed to both renderings; not part of the value
    pub comment: String,
}

impl Expr {
    /// Creates a register expression.
    #[must_use]
    pub fn reg(name: impl Into<String>) -> Self {
        ExprKind::Reg(name.into()).into()
    }

    /// Creates an immediate value rendered in hex.
    #[must_use]
    pub fn value(value: i64) -> Self {
        Self::value_with_radix(value, Radix::Hex)
    }

    /// Creates an immediate value rendered in decimal.
    #[must_use]
    pub fn dec(value: i64) -> Self {
        Self::value_with_radix(value, Radix::Dec)
    }

    /// Creates an immediate value with an explicit display radix.
    #[must_use]
    pub fn value_with_radix(value: i64, radix: Radix) -> Self {
        ExprKind::Value(Value { value, radix }).into()
    }

    /// Creates a symbolic address.
    #[must_use]
    pub fn addr(addr: impl Into<String>) -> Self {
        ExprKind::Addr(addr.into()).into()
    }

    /// Creates a memory reference to `base + offset`.
    #[must_use]
    pub fn mem(ty: impl Into<String>, base: Expr, offset: i64) -> Self {
        ExprKind::Mem(MemRef {
            ty: ty.into(),
            base: Box::new(base),
            offset,
        })
        .into()
    }

    /// Creates a synthetic function reference.
    #[must_use]
    pub fn sfunc(name: impl Into<String>) -> Self {
        ExprKind::SFunc(name.into()).into()
    }

    /// Returns this expression with `comment` attached.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Name of the variant, e.g. `"Register"` or `"MemoryRef"`.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        (&self.kind).into()
    }

    /// Returns the register this expression reads or writes.
    ///
    /// A register yields itself, a memory reference yields its base when the base is a
    /// register. Everything else yields `None`.
    #[must_use]
    pub fn as_reg(&self) -> Option<&Expr> {
        match &self.kind {
            ExprKind::Reg(_) => Some(self),
            ExprKind::Mem(mem) if mem.base.is_reg() => Some(&mem.base),
            _ => None,
        }
    }

    /// Like [`as_reg`](Self::as_reg), but yields the register name.
    #[must_use]
    pub fn reg_name(&self) -> Option<&str> {
        match &self.as_reg()?.kind {
            ExprKind::Reg(name) => Some(name),
            _ => None,
        }
    }

    /// Returns `true` for register expressions.
    #[must_use]
    pub fn is_reg(&self) -> bool {
        matches!(self.kind, ExprKind::Reg(_))
    }

    /// Returns `true` for immediate values.
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self.kind, ExprKind::Value(_))
    }

    /// Returns the numeric value of an immediate.
    #[must_use]
    pub fn as_value(&self) -> Option<i64> {
        match self.kind {
            ExprKind::Value(v) => Some(v.value),
            _ => None,
        }
    }

    /// Returns the diagnostic rendering adapter (`REG(r1)`, `VALUE(0x1)`, ...).
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_, Expr> {
        Diagnostic(self)
    }

    /// Compares two expressions where an order is defined.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unordered`] if either operand is a value, address or synthetic
    /// function, or if two memory references have different bases that cannot be ordered.
    pub fn try_cmp(&self, other: &Expr) -> Result<Ordering> {
        match (&self.kind, &other.kind) {
            (ExprKind::Reg(a), ExprKind::Reg(b)) => Ok(natural_cmp(a, b)),
            (ExprKind::Mem(a), ExprKind::Mem(b)) => {
                let base = if a.base == b.base {
                    Ordering::Equal
                } else {
                    a.base.try_cmp(&b.base)?
                };
                Ok(base
                    .then(a.offset.cmp(&b.offset))
                    .then_with(|| a.ty.cmp(&b.ty)))
            }
            (ExprKind::Reg(_), ExprKind::Mem(_)) | (ExprKind::Mem(_), ExprKind::Reg(_)) => {
                Ok(self.variant_name().cmp(other.variant_name()))
            }
            _ => Err(Error::Unordered {
                left: self.diagnostic().to_string(),
                right: other.diagnostic().to_string(),
            }),
        }
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr {
            kind,
            comment: String::new(),
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.comment)?;
        match &self.kind {
            ExprKind::Reg(name) => write!(f, "${name}"),
            ExprKind::Value(value) => write!(f, "{value}"),
            ExprKind::Addr(addr) => f.write_str(addr),
            ExprKind::Mem(mem) => write!(f, "{mem}"),
            ExprKind::SFunc(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Diagnostic<'_, Expr> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expr = self.0;
        f.write_str(&expr.comment)?;
        match &expr.kind {
            ExprKind::Reg(name) => write!(f, "REG({name})"),
            ExprKind::Value(value) => {
                f.write_str("VALUE(")?;
                write_hex(f, value.value)?;
                f.write_str(")")
            }
            ExprKind::Addr(addr) => write!(f, "ADDR({addr})"),
            ExprKind::Mem(mem) => write!(f, "{mem}"),
            ExprKind::SFunc(name) => write!(f, "(SFUNC){name}"),
        }
    }
}

/// Sorts expressions in place.
///
/// Every pair is checked for a defined order before sorting starts, so on error the slice
/// is left untouched instead of in some arbitrary order.
///
/// # Errors
///
/// Returns [`Error::Unordered`] for the first pair of expressions without a defined order.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{sort_exprs, Expr};
///
/// let mut regs = vec![Expr::reg("r10"), Expr::reg("r2"), Expr::reg("r1")];
/// sort_exprs(&mut regs)?;
/// assert_eq!(regs, vec![Expr::reg("r1"), Expr::reg("r2"), Expr::reg("r10")]);
///
/// let mut mixed = vec![Expr::reg("r1"), Expr::value(1)];
/// assert!(sort_exprs(&mut mixed).is_err());
/// # Ok::<(), blockscope::Error>(())
/// ```
pub fn sort_exprs(exprs: &mut [Expr]) -> Result<()> {
    let Some(first) = exprs.first() else {
        return Ok(());
    };

    // Registers order against everything orderable; only memory bases need pairwise checks
    let mut bases: Vec<&Expr> = Vec::new();
    for expr in exprs.iter() {
        match &expr.kind {
            ExprKind::Reg(_) => {}
            ExprKind::Mem(mem) => {
                if !bases.contains(&mem.base.as_ref()) {
                    bases.push(&mem.base);
                }
            }
            _ => {
                first.try_cmp(expr)?;
                expr.try_cmp(first)?;
            }
        }
    }
    for (i, a) in bases.iter().enumerate() {
        for b in &bases[i + 1..] {
            a.try_cmp(b)?;
        }
    }

    exprs.sort_by(|a, b| a.try_cmp(b).unwrap_or(Ordering::Equal));
    Ok(())
}
