//! Integration tests for the IR value types.
//!
//! These tests exercise equality, ordering, condition negation and canonical rendering
//! through the public API only.

use std::cmp::Ordering;

use blockscope::{
    ir::{
        parse_cond, parse_inst, sort_exprs, CmpOp, CompoundCond, Cond, CondItem, Expr, InfixOp,
        Inst, Logic, SimpleCond,
    },
    Error, Result,
};

// Helper function to create `(lhs op rhs)` over two registers
fn regs(lhs: &str, op: CmpOp, rhs: &str) -> Cond {
    SimpleCond::new(Expr::reg(lhs), op, Expr::reg(rhs)).into()
}

#[test]
fn register_equality_is_by_name() {
    assert_eq!(Expr::reg("r1"), Expr::reg("r1"));
    assert_ne!(Expr::reg("r1"), Expr::reg("r2"));
    assert_ne!(Expr::reg("r1"), Expr::value(1));
    assert_ne!(Expr::reg("0x1"), Expr::value(1));
}

#[test]
fn registers_order_naturally() {
    assert!(Expr::reg("r2") < Expr::reg("r10"));
    assert_eq!(Expr::reg("r10").try_cmp(&Expr::reg("r2")).unwrap(), Ordering::Greater);

    let mut exprs = vec![Expr::reg("r10"), Expr::reg("r2"), Expr::reg("r1")];
    sort_exprs(&mut exprs).unwrap();
    assert_eq!(exprs, vec![Expr::reg("r1"), Expr::reg("r2"), Expr::reg("r10")]);
}

#[test]
fn cross_variant_order_is_an_error() {
    assert!(Expr::reg("r1").partial_cmp(&Expr::value(1)).is_none());
    assert!(matches!(
        Expr::value(1).try_cmp(&Expr::addr("x")),
        Err(Error::Unordered { .. })
    ));

    let mut exprs = vec![Expr::reg("r2"), Expr::value(1), Expr::reg("r1")];
    assert!(sort_exprs(&mut exprs).is_err());
    assert_eq!(exprs[0], Expr::reg("r2"));
}

#[test]
fn double_negation_is_identity() -> Result<()> {
    let simple = regs("a", CmpOp::Lt, "b");
    assert_eq!(simple.negate().negate(), simple);

    let inner: Cond = CompoundCond::pair(
        regs("a", CmpOp::Eq, "b"),
        Logic::Or,
        regs("c", CmpOp::Ge, "d"),
    )
    .into();
    let nested: Cond = CompoundCond::new(vec![
        CondItem::Cond(inner),
        CondItem::Logic(Logic::And),
        CondItem::Cond(regs("e", CmpOp::Ne, "f")),
    ])?
    .into();
    assert_eq!(nested.negate().negate(), nested);
    Ok(())
}

#[test]
fn simple_negation_renders_flipped_operator() -> Result<()> {
    let cond = parse_cond("(a == b)")?;
    assert_eq!(cond.negate().to_string(), "(a != b)");
    Ok(())
}

#[test]
fn compound_negation_follows_de_morgan() {
    let c1 = regs("a", CmpOp::Eq, "b");
    let c2 = regs("c", CmpOp::Gt, "d");
    let negated = Cond::from(CompoundCond::pair(c1.clone(), Logic::And, c2.clone())).negate();
    let expected: Cond = CompoundCond::pair(c1.negate(), Logic::Or, c2.negate()).into();
    assert_eq!(negated, expected);
    assert_eq!(expected.to_string(), "(($a != $b) || ($c <= $d))");
}

#[test]
fn malformed_compound_is_rejected() {
    let result = CompoundCond::new(vec![
        CondItem::Cond(regs("a", CmpOp::Eq, "b")),
        CondItem::Logic(Logic::And),
    ]);
    assert!(matches!(result, Err(Error::Malformed { .. })));
}

#[test]
fn canonical_assign_and_arithmetic() -> Result<()> {
    let x = Expr::reg("x");
    assert_eq!(Inst::assign(x.clone(), Expr::reg("y")).to_canonical()?, "$x = $y");
    assert_eq!(
        Inst::infix(x.clone(), InfixOp::Add, vec![x.clone(), Expr::reg("y")]).to_canonical()?,
        "$x += $y"
    );
    assert_eq!(
        Inst::infix(x, InfixOp::Add, vec![Expr::reg("y"), Expr::reg("z")]).to_canonical()?,
        "$x = $y + $z"
    );
    Ok(())
}

#[test]
fn infix_arity_is_enforced() {
    let inst = Inst::infix(Expr::reg("x"), InfixOp::Mul, vec![Expr::reg("y")]);
    assert!(matches!(inst.to_canonical(), Err(Error::Malformed { .. })));
}

#[test]
fn equality_ignores_address_and_annotations() -> Result<()> {
    let plain = parse_inst("$x = $y + $z")?;
    let mut annotated = plain.clone().with_addr("0x401000");
    annotated.set_provenance(parse_inst("$x = $y")?);
    annotated.annotate("note", "folded");
    assert_eq!(plain, annotated);
    Ok(())
}

#[test]
fn provenance_line_precedes_instruction() -> Result<()> {
    let mut inst = parse_inst("$x = $y + 0x0")?;
    inst.record_provenance();
    inst.args.truncate(1);
    inst.op = blockscope::ir::Opcode::Assign;
    assert_eq!(inst.to_canonical()?, "// $x = $y + 0x0\n$x = $y");
    Ok(())
}
