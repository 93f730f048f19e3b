//! Shared fixtures for unit tests.

use crate::{
    cfg::Cfg,
    ir::{BasicBlock, CmpOp, Cond, Expr, InfixOp, Inst, SimpleCond},
};

// Helper function to create `($reg op value)`
pub fn reg_cond(reg: &str, op: CmpOp, value: i64) -> Cond {
    SimpleCond::new(Expr::reg(reg), op, Expr::value(value)).into()
}

// Helper function to create `$dest += value`
pub fn add_imm(dest: &str, value: i64) -> Inst {
    Inst::infix(
        Expr::reg(dest),
        InfixOp::Add,
        vec![Expr::reg(dest), Expr::value(value)],
    )
}

/// An if/else diamond:
///
/// ```text
///        entry
///  r1==0 /   \ r1!=0
///     then   else
///        \   /
///        exit
/// ```
pub fn diamond_cfg() -> Cfg {
    let mut cfg = Cfg::new();
    let blocks = [
        BasicBlock::with_items(
            "entry",
            vec![Inst::assign(
                Expr::reg("r1"),
                Expr::mem("u32", Expr::reg("sp"), 4),
            )],
        ),
        BasicBlock::with_items(
            "then",
            vec![add_imm("r0", 1), Inst::goto(Expr::addr("exit"))],
        ),
        BasicBlock::with_items("else", vec![add_imm("r0", 2)]),
        BasicBlock::with_items("exit", vec![Inst::ret()]),
    ];
    for block in blocks {
        cfg.add_block(block).unwrap();
    }

    let taken = reg_cond("r1", CmpOp::Eq, 0);
    cfg.add_edge("entry", "then", Some(taken.clone())).unwrap();
    cfg.add_edge("entry", "else", Some(taken.negate())).unwrap();
    cfg.add_edge("then", "exit", None).unwrap();
    cfg.add_edge("else", "exit", None).unwrap();
    cfg
}
