//! Instructions.
//!
//! An [`Inst`] is `[dest =] op(args)` plus an optional source address and free-form
//! [`Annotations`]. Structural equality considers only the opcode, destination and
//! arguments; address and annotations are metadata that passes attach freely.
//!
//! # Canonical form
//!
//! | Opcode | Rendering |
//! |--------|-----------|
//! | `LIT` | the single text argument verbatim |
//! | `return` | `return` |
//! | `goto` / `call` | `goto target` / `call target` |
//! | `ASSIGN` | `dest = src` |
//! | infix `op` | `dest op= b` if `dest == a`, else `dest = a op b` |
//! | `SFUNC` | `[dest = ]name(rest)` where `name` is the first argument |
//! | mnemonic | `[dest = ]name(args)` |
//!
//! When the instruction carries a provenance annotation (the instruction it was rewritten
//! from), the canonical form is preceded by a `// original` line.

use std::{
    collections::BTreeMap,
    fmt::{self, Write},
    hash::{Hash, Hasher},
};

use crate::{
    ir::{
        cond::Cond,
        expr::{Expr, ExprKind},
        op::{InfixOp, Opcode},
        render::Diagnostic,
    },
    Result,
};

/// Annotation key marking an instruction as dead.
pub const DEAD: &str = "dead";

/// An instruction argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
    /// An operand expression
    Expr(Expr),
    /// A condition, for conditional mnemonics
    Cond(Cond),
    /// Verbatim text, used by `LIT`
    Text(String),
}

impl Arg {
    /// Returns the expression, if this argument is one.
    #[must_use]
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Arg::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    /// Returns the diagnostic rendering adapter.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_, Arg> {
        Diagnostic(self)
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Arg::Expr(expr)
    }
}

impl From<Cond> for Arg {
    fn from(cond: Cond) -> Self {
        Arg::Cond(cond)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Expr(expr) => write!(f, "{expr}"),
            Arg::Cond(cond) => write!(f, "{cond}"),
            Arg::Text(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for Diagnostic<'_, Arg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Arg::Expr(expr) => write!(f, "{}", expr.diagnostic()),
            Arg::Cond(cond) => write!(f, "{}", cond.diagnostic()),
            Arg::Text(text) => write!(f, "'{text}'"),
        }
    }
}

/// Metadata attached to an instruction by passes.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// The instruction this one was rewritten from
    pub provenance: Option<Box<Inst>>,
    /// Free-form key/value annotations, rendered in diagnostic form
    pub extra: BTreeMap<String, String>,
}

impl Annotations {
    /// Returns `true` if there is neither provenance nor any key/value annotation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provenance.is_none() && self.extra.is_empty()
    }
}

/// A single IR instruction.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{Expr, InfixOp, Inst};
///
/// let inc = Inst::infix(Expr::reg("x"), InfixOp::Add, vec![Expr::reg("x"), Expr::reg("y")]);
/// assert_eq!(inc.to_canonical()?, "$x += $y");
///
/// let add = Inst::infix(Expr::reg("x"), InfixOp::Add, vec![Expr::reg("y"), Expr::reg("z")]);
/// assert_eq!(add.to_canonical()?, "$x = $y + $z");
/// # Ok::<(), blockscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Inst {
    /// Destination operand
    pub dest: Option<Expr>,
    /// Operation
    pub op: Opcode,
    /// Arguments, in operation-specific order
    pub args: Vec<Arg>,
    /// Source address of the instruction
    pub addr: Option<String>,
    /// Metadata; ignored by equality
    pub annotations: Annotations,
}

impl Inst {
    /// Creates an instruction from its parts.
    #[must_use]
    pub fn new(dest: Option<Expr>, op: Opcode, args: Vec<Arg>) -> Self {
        Inst {
            dest,
            op,
            args,
            addr: None,
            annotations: Annotations::default(),
        }
    }

    /// Creates `dest = src`.
    #[must_use]
    pub fn assign(dest: Expr, src: Expr) -> Self {
        Inst::new(Some(dest), Opcode::Assign, vec![src.into()])
    }

    /// Creates `dest = a op b`. The argument count is checked when rendering.
    #[must_use]
    pub fn infix(dest: Expr, op: InfixOp, args: Vec<Expr>) -> Self {
        Inst::new(
            Some(dest),
            Opcode::Infix(op),
            args.into_iter().map(Arg::from).collect(),
        )
    }

    /// Creates a verbatim text instruction.
    #[must_use]
    pub fn lit(text: impl Into<String>) -> Self {
        Inst::new(None, Opcode::Lit, vec![Arg::Text(text.into())])
    }

    /// Creates `goto target`.
    #[must_use]
    pub fn goto(target: Expr) -> Self {
        Inst::new(None, Opcode::Goto, vec![target.into()])
    }

    /// Creates `call target`.
    #[must_use]
    pub fn call(target: Expr) -> Self {
        Inst::new(None, Opcode::Call, vec![target.into()])
    }

    /// Creates `return`.
    #[must_use]
    pub fn ret() -> Self {
        Inst::new(None, Opcode::Return, Vec::new())
    }

    /// Creates `[dest = ]name(args)` for an architecture mnemonic.
    #[must_use]
    pub fn mnemonic(dest: Option<Expr>, name: impl Into<String>, args: Vec<Arg>) -> Self {
        Inst::new(dest, Opcode::Mnemonic(name.into()), args)
    }

    /// Creates `[dest = ]name(args)` calling the synthetic function `name`.
    #[must_use]
    pub fn sfunc(dest: Option<Expr>, name: impl Into<String>, args: Vec<Expr>) -> Self {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(Arg::Expr(Expr::sfunc(name)));
        all.extend(args.into_iter().map(Arg::from));
        Inst::new(dest, Opcode::SFunc, all)
    }

    /// Returns this instruction with its source address set.
    #[must_use]
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    /// Sets a key/value annotation.
    pub fn annotate(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations.extra.insert(key.into(), value.into());
    }

    /// Returns the value of an annotation.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.extra.get(key).map(String::as_str)
    }

    /// Marks the instruction as dead.
    pub fn mark_dead(&mut self) {
        self.annotate(DEAD, "true");
    }

    /// Returns `true` if the instruction is annotated as dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.annotations.extra.contains_key(DEAD)
    }

    /// Returns the instruction this one was rewritten from.
    #[must_use]
    pub fn provenance(&self) -> Option<&Inst> {
        self.annotations.provenance.as_deref()
    }

    /// Records `original` as the instruction this one was rewritten from.
    pub fn set_provenance(&mut self, original: Inst) {
        self.annotations.provenance = Some(Box::new(original));
    }

    /// Records the current shape as provenance, for a pass that is about to rewrite it.
    ///
    /// The snapshot carries no annotations of its own, so repeated rewrites keep a single
    /// `//` line instead of a growing chain.
    pub fn record_provenance(&mut self) {
        let snapshot = Inst {
            annotations: Annotations::default(),
            ..self.clone()
        };
        self.set_provenance(snapshot);
    }

    /// Returns the destination operand, the only expression this instruction defines.
    #[must_use]
    pub fn defs(&self) -> Option<&Expr> {
        self.dest.as_ref()
    }

    /// Returns every expression the instruction reads, left to right.
    ///
    /// Includes the operands of condition arguments. A synthetic function name is not
    /// an operand and is skipped.
    #[must_use]
    pub fn uses(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        for arg in &self.args {
            match arg {
                Arg::Expr(expr) if !matches!(expr.kind, ExprKind::SFunc(_)) => out.push(expr),
                Arg::Expr(_) | Arg::Text(_) => {}
                Arg::Cond(cond) => out.extend(cond.exprs()),
            }
        }
        out
    }

    /// Checks the shape rules of the opcode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if
    /// - a `LIT` has a destination or anything but a single text argument
    /// - an `ASSIGN` lacks a destination or has not exactly one argument
    /// - an infix operation lacks a destination or has not exactly two arguments
    /// - a `goto`, `call` or `SFUNC` has no arguments
    pub fn validate(&self) -> Result<()> {
        match &self.op {
            Opcode::Lit => {
                if self.dest.is_some() {
                    return Err(malformed_error!("LIT instruction must not have a destination"));
                }
                if !matches!(self.args.as_slice(), [Arg::Text(_)]) {
                    return Err(malformed_error!(
                        "LIT instruction needs exactly one text argument, got {} arguments",
                        self.args.len()
                    ));
                }
            }
            Opcode::Assign => {
                if self.dest.is_none() || self.args.len() != 1 {
                    return Err(malformed_error!(
                        "ASSIGN needs a destination and one argument, got {} arguments",
                        self.args.len()
                    ));
                }
            }
            Opcode::Infix(op) => {
                if self.dest.is_none() {
                    return Err(malformed_error!("Infix '{}' needs a destination", op));
                }
                if self.args.len() != 2 {
                    return Err(malformed_error!(
                        "Infix '{}' needs exactly two arguments, got {}",
                        op,
                        self.args.len()
                    ));
                }
            }
            Opcode::Goto | Opcode::Call | Opcode::SFunc => {
                if self.args.is_empty() {
                    return Err(malformed_error!("'{}' needs a target argument", self.op));
                }
            }
            Opcode::Return | Opcode::Mnemonic(_) => {}
        }
        Ok(())
    }

    /// Writes the canonical rendering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if this instruction or its
    /// provenance violates the shape rules, or [`Error::Format`](crate::Error::Format) if
    /// the writer fails.
    pub fn write_canonical<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        self.validate()?;

        if let Some(original) = self.provenance() {
            out.write_str("// ")?;
            original.write_canonical(out)?;
            out.write_str("\n")?;
        }

        match &self.op {
            Opcode::Lit => write!(out, "{}", self.args[0])?,
            Opcode::Return => out.write_str("return")?,
            Opcode::Goto | Opcode::Call => write!(out, "{} {}", self.op, self.args[0])?,
            Opcode::Assign => {
                if let Some(dest) = &self.dest {
                    write!(out, "{} = {}", dest, self.args[0])?;
                }
            }
            Opcode::Infix(op) => {
                if let Some(dest) = &self.dest {
                    let (a, b) = (&self.args[0], &self.args[1]);
                    if matches!(a, Arg::Expr(e) if e == dest) {
                        write!(out, "{dest} {op}= {b}")?;
                    } else {
                        write!(out, "{dest} = {a} {op} {b}")?;
                    }
                }
            }
            Opcode::SFunc => {
                self.write_dest(out)?;
                write!(out, "{}", self.args[0])?;
                write_call_args(out, &self.args[1..])?;
            }
            Opcode::Mnemonic(name) => {
                self.write_dest(out)?;
                out.write_str(name)?;
                write_call_args(out, &self.args)?;
            }
        }
        Ok(())
    }

    fn write_dest<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match &self.dest {
            Some(dest) => write!(out, "{dest} = "),
            None => Ok(()),
        }
    }

    /// Returns the canonical rendering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if the shape rules are violated.
    pub fn to_canonical(&self) -> Result<String> {
        let mut out = String::new();
        self.write_canonical(&mut out)?;
        Ok(out)
    }

    /// Returns the diagnostic rendering adapter.
    ///
    /// The diagnostic form shows the source address, the raw opcode tag, the arguments in
    /// their diagnostic forms and the key/value annotations. It never fails, so it can be
    /// used on instructions that break the shape rules.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic<'_, Inst> {
        Diagnostic(self)
    }
}

fn write_call_args<W: Write + ?Sized>(out: &mut W, args: &[Arg]) -> fmt::Result {
    out.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write!(out, "{arg}")?;
    }
    out.write_str(")")
}

impl PartialEq for Inst {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.dest == other.dest && self.args == other.args
    }
}

impl Eq for Inst {}

impl Hash for Inst {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.op.hash(state);
        self.dest.hash(state);
        self.args.hash(state);
    }
}

/// Canonical rendering.
///
/// A shape violation surfaces as [`fmt::Error`]; use [`Inst::to_canonical`] to get the
/// underlying [`Error::Malformed`](crate::Error::Malformed).
impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_canonical(f).map_err(|_| fmt::Error)
    }
}

impl fmt::Display for Diagnostic<'_, Inst> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inst = self.0;

        if let Some(original) = inst.provenance() {
            match original.to_canonical() {
                Ok(text) => writeln!(f, "// {text}")?,
                Err(_) => writeln!(f, "// {}", original.diagnostic())?,
            }
        }
        if let Some(addr) = &inst.addr {
            write!(f, "/*{addr}*/ ")?;
        }

        match (&inst.dest, &inst.op) {
            (None, Opcode::Lit) => {
                if let Some(text) = inst.args.first() {
                    write!(f, "{text}")?;
                }
            }
            (dest, op) => {
                if let Some(dest) = dest {
                    write!(f, "{dest} = ")?;
                }
                write!(f, "{op}([")?;
                for (i, arg) in inst.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg.diagnostic())?;
                }
                f.write_str("])")?;
            }
        }

        // Keys and values are written bare, in key order.
        if !inst.annotations.extra.is_empty() {
            f.write_str(" # {")?;
            for (i, (key, value)) in inst.annotations.extra.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}: {value}")?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}
