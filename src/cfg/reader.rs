//! Reads a CFG back from its canonical dump.
//!
//! The reader accepts what [`dump_cfg`](crate::cfg::dump_cfg) writes with the canonical
//! style. Predecessor lines are informational and ignored; the predecessor sets are
//! recomputed from the `Exits` lines. Lines inside a block that are not structured
//! instructions are kept verbatim as `LIT`. A `// ` line that holds a structured
//! instruction becomes the provenance of the instruction that follows it.

use log::debug;

use crate::{
    cfg::{dump::NO_BLOCK, graph::Cfg},
    ir::{parse_cond_at, parse_inst_at, BasicBlock, Cond, Inst},
    Result,
};

/// A block entry between its label and its `Exits` line.
struct Entry {
    addr: String,
    line: usize,
    items: Vec<Inst>,
    has_block: bool,
    dfs_number: Option<usize>,
    /// A `// ` line waiting for the instruction it annotates
    provenance: Option<(Inst, String)>,
}

impl Entry {
    /// Keeps a dangling provenance line as plain text.
    fn flush_provenance(&mut self) {
        if let Some((_, raw)) = self.provenance.take() {
            self.items.push(Inst::lit(raw));
        }
    }
}

/// An edge read from an `Exits` line; the condition is parsed once all nodes exist.
struct PendingEdge {
    from: String,
    cond: Option<String>,
    to: String,
    line: usize,
}

/// Character scanner for the list syntax of `Exits` lines.
struct Scanner<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn try_eat(&mut self, s: &str) -> bool {
        self.skip_ws();
        match self.rest.strip_prefix(s) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn eat(&mut self, s: &str) -> Result<()> {
        if self.try_eat(s) {
            Ok(())
        } else {
            Err(parse_error!(
                self.line,
                "Expected '{}' at '{}'",
                s,
                self.rest
            ))
        }
    }

    /// Reads a single-quoted literal with `\` escapes.
    fn quoted(&mut self) -> Result<String> {
        self.eat("'")?;
        let mut out = String::new();
        let mut chars = self.rest.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                '\'' => {
                    self.rest = &self.rest[i + 1..];
                    return Ok(out);
                }
                _ => out.push(c),
            }
        }
        Err(parse_error!(self.line, "Unterminated string literal"))
    }

    fn end(&mut self) -> Result<()> {
        self.skip_ws();
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(parse_error!(
                self.line,
                "Unexpected trailing text '{}'",
                self.rest
            ))
        }
    }
}

/// Parses the part of an `Exits` line after the keyword:
/// `[('cond', 'succ'), (None, 'succ')]`.
fn parse_exits(text: &str, line: usize) -> Result<Vec<(Option<String>, String)>> {
    let mut scanner = Scanner { rest: text, line };
    let mut exits = Vec::new();

    scanner.eat("[")?;
    if !scanner.try_eat("]") {
        loop {
            scanner.eat("(")?;
            let cond = if scanner.try_eat("None") {
                None
            } else {
                Some(scanner.quoted()?)
            };
            scanner.eat(",")?;
            let succ = scanner.quoted()?;
            scanner.eat(")")?;
            exits.push((cond, succ));

            if scanner.try_eat("]") {
                break;
            }
            scanner.eat(",")?;
        }
    }
    scanner.end()?;
    Ok(exits)
}

/// Reads a CFG from its canonical dump.
///
/// The entry node is the first node in the dump without predecessors, or the first node
/// if every node has one.
///
/// # Errors
///
/// Returns [`Error::Parse`](crate::Error::Parse) with the offending line for a missing
/// label, a malformed `DFS#` or `Exits` line, an unparseable edge condition, a duplicate
/// label or a block without its `Exits` line.
///
/// # Examples
///
/// ```rust
/// use blockscope::cfg::parse_dump;
///
/// let text = "\
/// // Predecessors: []
/// blk1:
/// $r1 = 0x0
/// Exits: [('($r1 == 0x0)', 'blk2')]
///
/// // Predecessors: ['blk1']
/// blk2:
/// return
/// Exits: []
/// ";
/// let cfg = parse_dump(text)?;
/// assert_eq!(cfg.sorted_addrs(), vec!["blk1", "blk2"]);
/// assert_eq!(cfg.pred("blk2").collect::<Vec<_>>(), vec!["blk1"]);
/// assert_eq!(cfg.edge_cond("blk1", "blk2").unwrap().to_string(), "($r1 == 0x0)");
/// # Ok::<(), blockscope::Error>(())
/// ```
pub fn parse_dump(text: &str) -> Result<Cfg> {
    let mut cfg = Cfg::new();
    let mut order: Vec<String> = Vec::new();
    let mut edges: Vec<PendingEdge> = Vec::new();
    let mut pending_dfs: Option<usize> = None;
    let mut current: Option<Entry> = None;
    let mut last_line = 0;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        last_line = line;

        let Some(entry) = current.as_mut() else {
            if raw.trim().is_empty() || raw.starts_with("// Predecessors:") {
                continue;
            }
            if let Some(number) = raw.strip_prefix("// DFS#:") {
                pending_dfs = Some(number.trim().parse().map_err(|_| {
                    parse_error!(line, "Bad DFS number '{}'", number.trim())
                })?);
                continue;
            }
            match raw.strip_suffix(':') {
                Some(addr) if !addr.is_empty() && !addr.starts_with(char::is_whitespace) => {
                    current = Some(Entry {
                        addr: addr.to_string(),
                        line,
                        items: Vec::new(),
                        has_block: true,
                        dfs_number: pending_dfs.take(),
                        provenance: None,
                    });
                    continue;
                }
                _ => return Err(parse_error!(line, "Expected a block label, found '{}'", raw)),
            }
        };

        if let Some(rest) = raw.strip_prefix("Exits:") {
            entry.flush_provenance();
            for (cond, to) in parse_exits(rest, line)? {
                edges.push(PendingEdge {
                    from: entry.addr.clone(),
                    cond,
                    to,
                    line,
                });
            }
            if let Some(entry) = current.take() {
                order.push(entry.addr.clone());
                add_entry(&mut cfg, entry)?;
            }
            continue;
        }

        if !entry.has_block {
            return Err(parse_error!(
                line,
                "Instruction after the empty placeholder of {}",
                entry.addr
            ));
        }
        if raw == NO_BLOCK && entry.items.is_empty() && entry.provenance.is_none() {
            entry.has_block = false;
            continue;
        }

        if let Some(original) = raw.strip_prefix("// ") {
            if let Ok(original) = parse_inst_at(original, line) {
                entry.flush_provenance();
                entry.provenance = Some((original, raw.to_string()));
                continue;
            }
        }

        let mut inst = match parse_inst_at(raw, line) {
            Ok(inst) => inst,
            Err(e) => {
                debug!("Keeping line {line} as LIT: {e}");
                Inst::lit(raw)
            }
        };
        if let Some((original, _)) = entry.provenance.take() {
            inst.set_provenance(original);
        }
        entry.items.push(inst);
    }

    if let Some(entry) = current {
        return Err(parse_error!(
            last_line,
            "Block {} (line {}) has no Exits line",
            entry.addr,
            entry.line
        ));
    }

    for edge in edges {
        let cond: Option<Cond> = edge
            .cond
            .as_deref()
            .map(|text| parse_cond_at(text, edge.line))
            .transpose()?;
        cfg.add_edge(&edge.from, &edge.to, cond)?;
    }

    if let Some(entry) = order.iter().find(|addr| cfg.pred(addr).next().is_none()) {
        cfg.set_entry(entry)?;
    }

    debug!(
        "Read {} CFG nodes and {} edges",
        cfg.node_count(),
        cfg.edge_count()
    );
    Ok(cfg)
}

fn add_entry(cfg: &mut Cfg, entry: Entry) -> Result<()> {
    if cfg.node_id(&entry.addr).is_some() {
        return Err(parse_error!(entry.line, "Duplicate block label {}", entry.addr));
    }
    if entry.has_block {
        cfg.add_block(BasicBlock::with_items(entry.addr.clone(), entry.items))?;
    } else {
        cfg.add_node(&entry.addr);
    }
    cfg.set_dfs_number(&entry.addr, entry.dfs_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::dump_to_string,
        ir::{DumpOptions, Expr, InfixOp},
        test::diamond_cfg,
        Error,
    };

    #[test]
    fn test_round_trip_diamond() {
        let mut cfg = diamond_cfg();
        cfg.number_postorder();
        let text = dump_to_string(&cfg, &DumpOptions::default()).unwrap();

        let read = parse_dump(&text).unwrap();
        assert_eq!(read.sorted_addrs(), cfg.sorted_addrs());
        for addr in cfg.sorted_addrs() {
            assert_eq!(read.block(addr), cfg.block(addr), "{addr}");
            assert_eq!(read.dfs_number(addr), cfg.dfs_number(addr));
            assert_eq!(
                read.succ(addr).collect::<Vec<_>>(),
                cfg.succ(addr).collect::<Vec<_>>()
            );
        }
        assert_eq!(read.entry(), Some("entry"));
        assert_eq!(dump_to_string(&read, &DumpOptions::default()).unwrap(), text);
    }

    #[test]
    fn test_placeholder_and_empty_blocks() {
        let text = "a:\nExits: [(None, 'b')]\n\nb:\n    None\nExits: []\n";
        let cfg = parse_dump(text).unwrap();
        assert_eq!(cfg.block("a"), Some(&BasicBlock::new("a")));
        assert!(cfg.node("b").is_some());
        assert!(cfg.block("b").is_none());
    }

    #[test]
    fn test_lit_fallback() {
        let text = "a:\nif (x) {\n$r1 = 0x1\n}\nExits: []\n";
        let cfg = parse_dump(text).unwrap();
        let block = cfg.block("a").unwrap();
        assert_eq!(block.items[0], Inst::lit("if (x) {"));
        assert_eq!(block.items[1], Inst::assign(Expr::reg("r1"), Expr::value(1)));
        assert_eq!(block.items[2], Inst::lit("}"));
    }

    #[test]
    fn test_provenance_attaches_to_next_instruction() {
        let text = "a:\n// $r1 ^= $r1\n$r1 = 0x0\nExits: []\n";
        let cfg = parse_dump(text).unwrap();
        let inst = &cfg.block("a").unwrap().items[0];
        assert_eq!(inst, &Inst::assign(Expr::reg("r1"), Expr::value(0)));
        assert_eq!(
            inst.provenance(),
            Some(&Inst::infix(
                Expr::reg("r1"),
                InfixOp::Xor,
                vec![Expr::reg("r1"), Expr::reg("r1")]
            ))
        );
    }

    #[test]
    fn test_comment_lines_stay_text() {
        let text = "a:\n// loop header\n$r1 = 0x0\n// $r2 = $r3\nExits: []\n";
        let cfg = parse_dump(text).unwrap();
        let items = &cfg.block("a").unwrap().items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Inst::lit("// loop header"));
        assert!(items[1].provenance().is_none());
        assert_eq!(items[2], Inst::lit("// $r2 = $r3"));
    }

    #[test]
    fn test_entry_is_first_without_predecessors() {
        let text = "a:\nExits: []\n\nb:\nExits: [(None, 'a')]\n";
        let cfg = parse_dump(text).unwrap();
        assert_eq!(cfg.entry(), Some("b"));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let cases = [
            ("$r1 = 0x0\n", 1),
            ("a:\n$r1 = 0x0\n", 2),
            ("// DFS#: x\na:\nExits: []\n", 1),
            ("a:\nExits: [(None 'b')]\n", 2),
            ("a:\nExits: [('($r1 =! 0x0)', 'b')]\n", 2),
            ("a:\nExits: []\n\na:\nExits: []\n", 4),
            ("a:\n    None\nreturn\nExits: []\n", 3),
        ];
        for (text, expected) in cases {
            match parse_dump(text) {
                Err(Error::Parse { line, .. }) => assert_eq!(line, expected, "{text:?}"),
                other => panic!("expected parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_exits_list_syntax() {
        assert_eq!(parse_exits(" []", 1).unwrap(), vec![]);
        assert_eq!(
            parse_exits(" [('(a == b)', 'x'), (None, 'it\\'s')]", 1).unwrap(),
            vec![
                (Some("(a == b)".to_string()), "x".to_string()),
                (None, "it's".to_string())
            ]
        );
        assert!(parse_exits(" [('a', 'b')", 1).is_err());
        assert!(parse_exits(" []x", 1).is_err());
    }

    #[test]
    fn test_empty_input() {
        let cfg = parse_dump("").unwrap();
        assert!(cfg.is_empty());
    }
}
