//! Reader for the canonical text forms.
//!
//! This is the inverse of the canonical [`Display`](std::fmt::Display) renderings and is
//! what lets a CFG dump be loaded back. The grammar is exactly what the renderers emit:
//!
//! ```text
//! expr  := '$' name | ['-'] number | ident | '*(' ty '*)' mbase
//! mbase := expr | '(' expr [('+' | '-') number] ')'
//! cond  := '(' expr cmp expr ')' | '(' cond (logic cond)* ')'
//! inst  := 'return' | ('goto' | 'call') expr
//!        | [expr '='] ident '(' [arg (',' arg)*] ')'
//!        | expr '=' expr [infix expr]
//!        | expr infix '=' expr
//! ```
//!
//! Text that is not produced by a renderer is rejected. A synthetic function call is read
//! back as a mnemonic, since both render identically.

use crate::{
    ir::{
        cond::{CompoundCond, Cond, CondItem, SimpleCond},
        expr::{Expr, Radix},
        inst::{Arg, Inst},
        op::{CmpOp, InfixOp, Logic},
    },
    Result,
};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Reg(String),
    Number(u64, Radix),
    Ident(String),
    Sym(&'static str),
    LParen,
    RParen,
    Comma,
    Assign,
}

/// Multi-character symbols come first so that the longest match wins.
const SYMBOLS: &[&str] = &[
    "<<", ">>", "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%", "&", "|", "^", "<",
    ">",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '.' || c == '@'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '@'
}

fn lex(input: &str, line: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }

        if c == '$' || is_ident_start(c) {
            let body = if c == '$' { &rest[1..] } else { rest };
            let len = body
                .find(|ch: char| !is_ident_char(ch))
                .unwrap_or(body.len());
            if len == 0 {
                return Err(parse_error!(line, "Empty register name in '{}'", input));
            }
            let name = body[..len].to_string();
            tokens.push(if c == '$' {
                Token::Reg(name)
            } else {
                Token::Ident(name)
            });
            rest = &body[len..];
            continue;
        }

        if c.is_ascii_digit() {
            let (digits, radix, prefix) = match rest.strip_prefix("0x") {
                Some(hex) => (hex, Radix::Hex, 2),
                None => (rest, Radix::Dec, 0),
            };
            let base = if radix == Radix::Hex { 16 } else { 10 };
            let len = digits
                .find(|ch: char| !ch.is_digit(base))
                .unwrap_or(digits.len());
            let value = u64::from_str_radix(&digits[..len], base)
                .map_err(|e| parse_error!(line, "Bad number in '{}': {}", input, e))?;
            tokens.push(Token::Number(value, radix));
            rest = &rest[prefix + len..];
            if rest.starts_with(is_ident_char) {
                return Err(parse_error!(line, "Bad number in '{}'", input));
            }
            continue;
        }

        let (token, len) = match c {
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            ',' => (Token::Comma, 1),
            '=' if !rest.starts_with("==") => (Token::Assign, 1),
            _ => match SYMBOLS.iter().copied().find(|s| rest.starts_with(*s)) {
                Some(sym) => (Token::Sym(sym), sym.len()),
                None => {
                    return Err(parse_error!(
                        line,
                        "Unexpected character '{}' in '{}'",
                        c,
                        input
                    ))
                }
            },
        };
        tokens.push(token);
        rest = &rest[len..];
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, line: usize) -> Result<Self> {
        Ok(Parser {
            tokens: lex(input, line)?,
            pos: 0,
            input,
            line,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn error(&self, what: &str) -> crate::Error {
        match self.peek() {
            Some(token) => parse_error!(
                self.line,
                "Expected {} but found {:?} in '{}'",
                what,
                token,
                self.input
            ),
            None => parse_error!(
                self.line,
                "Expected {} at end of '{}'",
                what,
                self.input
            ),
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<()> {
        if self.peek() == Some(token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(what))
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error("end of input"))
        }
    }

    fn number(&self, magnitude: u64, negative: bool) -> Result<i64> {
        let value = if negative {
            -i128::from(magnitude)
        } else {
            i128::from(magnitude)
        };
        i64::try_from(value)
            .map_err(|_| parse_error!(self.line, "Value out of range in '{}'", self.input))
    }

    /// Parses a number with an optional leading `-`.
    fn signed_number(&mut self, what: &str) -> Result<(i64, Radix)> {
        let negative = self.peek() == Some(&Token::Sym("-"));
        let offset = usize::from(negative);
        match self.peek_at(offset) {
            Some(&Token::Number(n, radix)) => {
                let value = self.number(n, negative)?;
                self.pos += offset + 1;
                Ok((value, radix))
            }
            _ => Err(self.error(what)),
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let expr = match self.peek() {
            Some(Token::Reg(name)) => Expr::reg(name.clone()),
            Some(Token::Ident(name)) => Expr::addr(name.clone()),
            Some(Token::Number(..) | Token::Sym("-")) => {
                let (value, radix) = self.signed_number("expression")?;
                return Ok(Expr::value_with_radix(value, radix));
            }
            Some(Token::Sym("*")) => {
                self.pos += 1;
                return self.mem();
            }
            _ => return Err(self.error("expression")),
        };
        self.pos += 1;
        Ok(expr)
    }

    /// Parses the remainder of `*(ty*)base` after the leading `*`.
    fn mem(&mut self) -> Result<Expr> {
        self.expect(&Token::LParen, "'(' of memory type")?;
        let ty = match self.peek() {
            Some(Token::Ident(ty)) => ty.clone(),
            _ => return Err(self.error("memory type")),
        };
        self.pos += 1;
        self.expect(&Token::Sym("*"), "'*' of memory type")?;
        self.expect(&Token::RParen, "')' of memory type")?;

        if self.peek() != Some(&Token::LParen) {
            let base = self.expr()?;
            return Ok(Expr::mem(ty, base, 0));
        }

        self.pos += 1;
        let base = self.expr()?;
        let offset = match self.peek() {
            Some(Token::Sym("+")) => {
                self.pos += 1;
                self.signed_number("memory offset")?.0
            }
            Some(Token::Sym("-")) => self.signed_number("memory offset")?.0,
            _ => 0,
        };
        self.expect(&Token::RParen, "')' after memory base")?;
        Ok(Expr::mem(ty, base, offset))
    }

    fn cond(&mut self) -> Result<Cond> {
        self.expect(&Token::LParen, "'(' of condition")?;

        if self.peek() == Some(&Token::LParen) {
            let mut items = vec![CondItem::Cond(self.cond()?)];
            while self.peek() != Some(&Token::RParen) {
                let logic = match self.peek() {
                    Some(Token::Sym(sym)) => Logic::parse(sym),
                    Some(Token::Ident(word)) => Logic::parse(word),
                    _ => return Err(self.error("connective")),
                }
                .map_err(|e| parse_error!(self.line, "{}", e))?;
                self.pos += 1;
                items.push(CondItem::Logic(logic));
                items.push(CondItem::Cond(self.cond()?));
            }
            self.pos += 1;
            return Ok(CompoundCond::new(items)?.into());
        }

        let lhs = self.expr()?;
        let op = match self.peek() {
            Some(Token::Sym(sym)) => CmpOp::parse(sym),
            _ => return Err(self.error("comparison")),
        }
        .map_err(|e| parse_error!(self.line, "{}", e))?;
        self.pos += 1;
        let rhs = self.expr()?;
        self.expect(&Token::RParen, "')' of condition")?;
        Ok(SimpleCond::new(lhs, op, rhs).into())
    }

    /// Parses `'(' [arg (',' arg)*] ')'` where an argument is a condition or an expression.
    fn call_args(&mut self) -> Result<Vec<Arg>> {
        self.expect(&Token::LParen, "'(' of argument list")?;
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            if self.peek() == Some(&Token::LParen) {
                args.push(Arg::Cond(self.cond()?));
            } else {
                args.push(Arg::Expr(self.expr()?));
            }
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {
                    self.pos += 1;
                    return Ok(args);
                }
                _ => return Err(self.error("',' or ')'")),
            }
        }
    }

    fn infix_op(&self, sym: &str) -> Result<InfixOp> {
        sym.parse::<InfixOp>()
            .map_err(|_| parse_error!(self.line, "Unknown operator '{}' in '{}'", sym, self.input))
    }

    fn inst(&mut self) -> Result<Inst> {
        if let Some(Token::Ident(word)) = self.peek() {
            let word = word.clone();
            let is_call = self.peek_at(1) == Some(&Token::LParen);
            match word.as_str() {
                "return" if self.tokens.len() == 1 => {
                    self.pos += 1;
                    return Ok(Inst::ret());
                }
                "goto" | "call" if !is_call => {
                    self.pos += 1;
                    let target = self.expr()?;
                    self.expect_end()?;
                    return Ok(if word == "goto" {
                        Inst::goto(target)
                    } else {
                        Inst::call(target)
                    });
                }
                _ if is_call => {
                    self.pos += 1;
                    let args = self.call_args()?;
                    self.expect_end()?;
                    return Ok(Inst::mnemonic(None, word, args));
                }
                _ => {}
            }
        }

        let dest = self.expr()?;
        let inst = match self.peek() {
            Some(Token::Assign) => {
                self.pos += 1;
                self.assignment(dest)?
            }
            Some(Token::Sym(sym)) => {
                let op = self.infix_op(sym)?;
                self.pos += 1;
                self.expect(&Token::Assign, "'=' of compound assignment")?;
                let rhs = self.expr()?;
                Inst::infix(dest.clone(), op, vec![dest, rhs])
            }
            _ => return Err(self.error("'='")),
        };
        self.expect_end()?;
        Ok(inst)
    }

    /// Parses the right-hand side of `dest = ...`.
    fn assignment(&mut self, dest: Expr) -> Result<Inst> {
        if let (Some(Token::Ident(name)), Some(Token::LParen)) = (self.peek(), self.peek_at(1)) {
            let name = name.clone();
            self.pos += 1;
            let args = self.call_args()?;
            return Ok(Inst::mnemonic(Some(dest), name, args));
        }

        let lhs = self.expr()?;
        match self.peek() {
            None => Ok(Inst::assign(dest, lhs)),
            Some(Token::Sym(sym)) => {
                let op = self.infix_op(sym)?;
                self.pos += 1;
                let rhs = self.expr()?;
                Ok(Inst::infix(dest, op, vec![lhs, rhs]))
            }
            Some(_) => Err(self.error("operator or end of input")),
        }
    }
}

pub(crate) fn parse_expr_at(text: &str, line: usize) -> Result<Expr> {
    let mut parser = Parser::new(text, line)?;
    let expr = parser.expr()?;
    parser.expect_end()?;
    Ok(expr)
}

pub(crate) fn parse_cond_at(text: &str, line: usize) -> Result<Cond> {
    let mut parser = Parser::new(text, line)?;
    let cond = parser.cond()?;
    parser.expect_end()?;
    Ok(cond)
}

pub(crate) fn parse_inst_at(text: &str, line: usize) -> Result<Inst> {
    Parser::new(text, line)?.inst()
}

/// Reads an expression from its canonical rendering.
///
/// # Errors
///
/// Returns [`Error::Parse`](crate::Error::Parse) if `text` is not a canonical expression.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{parse_expr, Expr};
///
/// assert_eq!(parse_expr("*(u32*)($sp + 0x8)")?, Expr::mem("u32", Expr::reg("sp"), 8));
/// assert_eq!(parse_expr("-0x10")?, Expr::value(-16));
/// # Ok::<(), blockscope::Error>(())
/// ```
pub fn parse_expr(text: &str) -> Result<Expr> {
    parse_expr_at(text, 1)
}

/// Reads a condition from its canonical rendering.
///
/// # Errors
///
/// Returns [`Error::Parse`](crate::Error::Parse) if `text` is not a canonical condition.
pub fn parse_cond(text: &str) -> Result<Cond> {
    parse_cond_at(text, 1)
}

/// Reads an instruction from its canonical rendering (without a provenance line).
///
/// # Errors
///
/// Returns [`Error::Parse`](crate::Error::Parse) if `text` is not a canonical instruction.
/// `LIT` text has no grammar, so callers that accept arbitrary lines fall back to
/// [`Inst::lit`] on error.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{parse_inst, Expr, InfixOp, Inst};
///
/// let inst = parse_inst("$x += 0x1")?;
/// assert_eq!(inst, Inst::infix(Expr::reg("x"), InfixOp::Add, vec![Expr::reg("x"), Expr::value(1)]));
/// # Ok::<(), blockscope::Error>(())
/// ```
pub fn parse_inst(text: &str) -> Result<Inst> {
    parse_inst_at(text, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ir::Opcode, Error};

    #[test]
    fn test_parse_exprs() {
        assert_eq!(parse_expr("$r1").unwrap(), Expr::reg("r1"));
        assert_eq!(parse_expr("0x1f").unwrap(), Expr::value(31));
        assert_eq!(parse_expr("31").unwrap(), Expr::dec(31));
        assert_eq!(parse_expr("-8").unwrap(), Expr::dec(-8));
        assert_eq!(parse_expr("loc_1000").unwrap(), Expr::addr("loc_1000"));
        assert_eq!(
            parse_expr("*(u8*)$r1").unwrap(),
            Expr::mem("u8", Expr::reg("r1"), 0)
        );
        assert_eq!(
            parse_expr("*(i32*)($fp - 0x4)").unwrap(),
            Expr::mem("i32", Expr::reg("fp"), -4)
        );
    }

    #[test]
    fn test_parse_keeps_radix() {
        let expr = parse_expr("31").unwrap();
        assert_eq!(expr.to_string(), "31");
        let expr = parse_expr("0x1f").unwrap();
        assert_eq!(expr.to_string(), "0x1f");
    }

    #[test]
    fn test_parse_expr_errors() {
        assert!(matches!(parse_expr(""), Err(Error::Parse { line: 1, .. })));
        assert!(parse_expr("$").is_err());
        assert!(parse_expr("$r1 $r2").is_err());
        assert!(parse_expr("0x").is_err());
        assert!(parse_expr("12abc").is_err());
        assert!(parse_expr("99999999999999999999").is_err());
        assert!(parse_expr("*(u32)$r1").is_err());
    }

    #[test]
    fn test_parse_value_limits() {
        assert_eq!(
            parse_expr("-0x8000000000000000").unwrap(),
            Expr::value(i64::MIN)
        );
        assert!(parse_expr("0x8000000000000000").is_err());
    }

    #[test]
    fn test_parse_conds() {
        let cond = parse_cond("($r1 == 0x0)").unwrap();
        assert_eq!(
            cond,
            SimpleCond::new(Expr::reg("r1"), CmpOp::Eq, Expr::value(0)).into()
        );

        let text = "(($r1 < 0x4) && ($r2 >= 0x0) || (a != b))";
        let cond = parse_cond(text).unwrap();
        assert_eq!(cond.to_string(), text);
        assert!(matches!(cond, Cond::Compound(ref c) if c.items().len() == 5));
    }

    #[test]
    fn test_parse_cond_spelled_connectives() {
        let cond = parse_cond("((a == b) AND (c == d))").unwrap();
        assert_eq!(cond.to_string(), "((a == b) && (c == d))");
    }

    #[test]
    fn test_parse_cond_errors() {
        assert!(parse_cond("$r1 == 0x0").is_err());
        assert!(parse_cond("($r1 = 0x0)").is_err());
        assert!(parse_cond("($r1 + 0x0)").is_err());
        assert!(parse_cond("((a == b) ^ (c == d))").is_err());
        assert!(parse_cond("((a == b)").is_err());
    }

    #[test]
    fn test_parse_insts() {
        assert_eq!(parse_inst("return").unwrap(), Inst::ret());
        assert_eq!(
            parse_inst("goto blk2").unwrap(),
            Inst::goto(Expr::addr("blk2"))
        );
        assert_eq!(
            parse_inst("call 0x4000").unwrap(),
            Inst::call(Expr::value(0x4000))
        );
        assert_eq!(
            parse_inst("$x = $y").unwrap(),
            Inst::assign(Expr::reg("x"), Expr::reg("y"))
        );
        assert_eq!(
            parse_inst("$x = $y + $z").unwrap(),
            Inst::infix(
                Expr::reg("x"),
                InfixOp::Add,
                vec![Expr::reg("y"), Expr::reg("z")]
            )
        );
        assert_eq!(
            parse_inst("$x >>= 0x2").unwrap(),
            Inst::infix(
                Expr::reg("x"),
                InfixOp::Shr,
                vec![Expr::reg("x"), Expr::value(2)]
            )
        );
        assert_eq!(
            parse_inst("*(u32*)($sp + 0x4) = $r0").unwrap(),
            Inst::assign(Expr::mem("u32", Expr::reg("sp"), 4), Expr::reg("r0"))
        );
    }

    #[test]
    fn test_parse_subtraction_of_negative() {
        assert_eq!(
            parse_inst("$x = $y - -0x1").unwrap(),
            Inst::infix(
                Expr::reg("x"),
                InfixOp::Sub,
                vec![Expr::reg("y"), Expr::value(-1)]
            )
        );
    }

    #[test]
    fn test_parse_mnemonics() {
        let inst = parse_inst("$r0 = bswap($r1)").unwrap();
        assert_eq!(inst.op, Opcode::Mnemonic("bswap".into()));
        assert_eq!(inst.dest, Some(Expr::reg("r0")));

        let inst = parse_inst("nop()").unwrap();
        assert!(inst.args.is_empty());

        let inst = parse_inst("if(($r1 == 0x0), l1)").unwrap();
        assert!(matches!(inst.args[0], Arg::Cond(_)));
        assert_eq!(inst.args[1], Arg::Expr(Expr::addr("l1")));
    }

    #[test]
    fn test_parse_inst_rejects_text() {
        for text in [
            "if (x) {",
            "}",
            "$x",
            "$x = ",
            "$x == $y",
            "return 0x1",
            "goto",
            "$x = $y + $z + $w",
            "// comment",
        ] {
            assert!(parse_inst(text).is_err(), "{text}");
        }
    }

    #[test]
    fn test_round_trip_canonical() {
        for text in [
            "$r1 = 0x0",
            "$r1 += 0x1",
            "$r2 = $r3 * 10",
            "*(u8*)$r1 = $r2",
            "$r0 = *(u32*)($fp - 0x8)",
            "goto blk10",
            "return",
            "$r0 = bswap($r1)",
            "trap()",
        ] {
            assert_eq!(parse_inst(text).unwrap().to_canonical().unwrap(), text);
        }
    }
}
