//! Operator vocabularies: instruction opcodes, infix operators, comparisons and logical
//! connectives.
//!
//! The symbol sets are closed. Anything outside them is rejected with
//! [`Error::Malformed`](crate::Error::Malformed) when parsed from text.

use std::{fmt, str::FromStr};

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Binary arithmetic and bitwise operators usable as an instruction opcode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr, EnumIter,
)]
pub enum InfixOp {
    /// Addition
    #[strum(serialize = "+")]
    Add,
    /// Subtraction
    #[strum(serialize = "-")]
    Sub,
    /// Multiplication
    #[strum(serialize = "*")]
    Mul,
    /// Division
    #[strum(serialize = "/")]
    Div,
    /// Remainder
    #[strum(serialize = "%")]
    Rem,
    /// Bitwise and
    #[strum(serialize = "&")]
    And,
    /// Bitwise or
    #[strum(serialize = "|")]
    Or,
    /// Bitwise exclusive or
    #[strum(serialize = "^")]
    Xor,
    /// Shift left
    #[strum(serialize = "<<")]
    Shl,
    /// Shift right
    #[strum(serialize = ">>")]
    Shr,
}

impl InfixOp {
    /// Returns the operator symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        self.into()
    }
}

/// Comparison operators of a simple condition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr, EnumIter,
)]
pub enum CmpOp {
    /// `==`
    #[strum(serialize = "==")]
    Eq,
    /// `!=`
    #[strum(serialize = "!=")]
    Ne,
    /// `<`
    #[strum(serialize = "<")]
    Lt,
    /// `<=`
    #[strum(serialize = "<=")]
    Le,
    /// `>`
    #[strum(serialize = ">")]
    Gt,
    /// `>=`
    #[strum(serialize = ">=")]
    Ge,
}

impl CmpOp {
    /// Returns the logical complement: `==` and `!=`, `<` and `>=`, `>` and `<=`.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Ge => CmpOp::Lt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Le => CmpOp::Gt,
        }
    }

    /// Returns the operator that gives the same result with swapped operands.
    #[must_use]
    pub const fn swapped(self) -> Self {
        match self {
            CmpOp::Eq | CmpOp::Ne => self,
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Ge => CmpOp::Le,
        }
    }

    /// Parses a comparison symbol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for anything outside `== != < <= > >=`.
    pub fn parse(symbol: &str) -> Result<Self> {
        CmpOp::from_str(symbol).map_err(|_| malformed_error!("Unknown comparison '{}'", symbol))
    }
}

/// Connective between the conditions of a compound condition.
///
/// Parsing also accepts the spelled-out forms `AND` and `OR`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr, EnumIter,
)]
pub enum Logic {
    /// Conjunction
    #[strum(to_string = "&&", serialize = "AND")]
    And,
    /// Disjunction
    #[strum(to_string = "||", serialize = "OR")]
    Or,
}

impl Logic {
    /// Swaps conjunction and disjunction.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Logic::And => Logic::Or,
            Logic::Or => Logic::And,
        }
    }

    /// Parses a connective symbol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for anything outside `&& || AND OR`.
    pub fn parse(symbol: &str) -> Result<Self> {
        Logic::from_str(symbol).map_err(|_| malformed_error!("Unknown connective '{}'", symbol))
    }
}

/// The operation an instruction performs.
///
/// Besides the fixed tags and the infix operators, any identifier-like tag is an
/// architecture mnemonic rendered in function-call form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `return`
    Return,
    /// `goto target`
    Goto,
    /// `call target`
    Call,
    /// `dest = src`
    Assign,
    /// Verbatim text; the single argument is rendered as-is
    Lit,
    /// Call of a synthetic function; the first argument names it
    SFunc,
    /// `dest = a op b`
    Infix(InfixOp),
    /// Any other operation, rendered as `name(args)`
    Mnemonic(String),
}

impl Opcode {
    /// Resolves a textual opcode tag.
    ///
    /// # Arguments
    ///
    /// * `tag` - `return`, `goto`, `call`, `ASSIGN`, `LIT`, `SFUNC`, an infix operator
    ///   symbol, or an identifier for a mnemonic
    ///
    /// A tag starting with `_` is a mnemonic, not an infix operator, so names such as
    /// `__builtin_clz` stay usable. Only tags starting with another non-letter are looked
    /// up as infix symbols.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for an empty tag or a symbol that is not an infix
    /// operator.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(match tag {
            "return" => Opcode::Return,
            "goto" => Opcode::Goto,
            "call" => Opcode::Call,
            "ASSIGN" => Opcode::Assign,
            "LIT" => Opcode::Lit,
            "SFUNC" => Opcode::SFunc,
            _ => {
                let Some(first) = tag.chars().next() else {
                    return Err(malformed_error!("Empty opcode tag"));
                };
                if first.is_ascii_alphabetic() || first == '_' {
                    Opcode::Mnemonic(tag.to_string())
                } else {
                    Opcode::Infix(
                        InfixOp::from_str(tag)
                            .map_err(|_| malformed_error!("Unknown opcode '{}'", tag))?,
                    )
                }
            }
        })
    }

    /// Returns the textual tag, the inverse of [`from_tag`](Self::from_tag).
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Opcode::Return => "return",
            Opcode::Goto => "goto",
            Opcode::Call => "call",
            Opcode::Assign => "ASSIGN",
            Opcode::Lit => "LIT",
            Opcode::SFunc => "SFUNC",
            Opcode::Infix(op) => op.symbol(),
            Opcode::Mnemonic(name) => name,
        }
    }

    /// Returns `true` for opcodes that transfer control (`goto`, `call`, `return`).
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Opcode::Return | Opcode::Goto | Opcode::Call)
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Opcode::from_tag(s)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
