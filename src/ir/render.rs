//! Rendering styles and the pluggable instruction renderer.
//!
//! Every IR item has two renderings. The canonical one (via [`std::fmt::Display`]) is the
//! pseudo-C text emitted in dumps. The diagnostic one (via [`Diagnostic`]) shows the
//! variant structure for debugging. Block and CFG dumps take an [`InstRenderer`] that
//! decides per instruction what to print, or whether to print it at all.

use std::fmt;

use strum::{Display, EnumString};

use crate::{ir::inst::Inst, Result};

/// Adapter that renders an IR item in its diagnostic form.
///
/// Obtained from `diagnostic()` on [`Expr`](crate::ir::Expr), [`Cond`](crate::ir::Cond)
/// and [`Inst`].
#[derive(Clone, Copy)]
pub struct Diagnostic<'a, T: ?Sized>(pub(crate) &'a T);

impl<T: ?Sized> fmt::Debug for Diagnostic<'_, T>
where
    Self: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Which of the two renderings to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Style {
    /// Pseudo-C text
    #[default]
    Canonical,
    /// Variant structure with addresses and annotations
    Diagnostic,
}

/// Decides how an instruction appears in a dump.
///
/// Returning `Ok(None)` omits the instruction. Closures of the matching signature
/// implement this trait, so one-off renderers need no named type.
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{BasicBlock, Expr, Inst, InstRenderer};
///
/// let mut block = BasicBlock::new("blk1");
/// block.push(Inst::assign(Expr::reg("r1"), Expr::value(0)));
///
/// let upper = |inst: &Inst| -> blockscope::Result<Option<String>> {
///     Ok(Some(inst.to_canonical()?.to_uppercase()))
/// };
/// let mut out = String::new();
/// block.dump(&mut out, 0, &upper)?;
/// assert_eq!(out, "$R1 = 0X0\n");
/// # Ok::<(), blockscope::Error>(())
/// ```
pub trait InstRenderer {
    /// Renders one instruction, or returns `None` to omit it.
    ///
    /// # Errors
    ///
    /// Returns an error if the instruction cannot be rendered.
    fn render(&self, inst: &Inst) -> Result<Option<String>>;
}

impl<F> InstRenderer for F
where
    F: Fn(&Inst) -> Result<Option<String>>,
{
    fn render(&self, inst: &Inst) -> Result<Option<String>> {
        self(inst)
    }
}

/// Dump settings, also the stock [`InstRenderer`].
///
/// # Examples
///
/// ```rust
/// use blockscope::ir::{DumpOptions, Expr, Inst, InstRenderer, Style};
///
/// let mut inst = Inst::assign(Expr::reg("r1"), Expr::value(0));
/// inst.mark_dead();
///
/// let opts = DumpOptions { omit_dead: true, ..DumpOptions::default() };
/// assert_eq!(opts.render(&inst)?, None);
///
/// let opts = DumpOptions { style: Style::Diagnostic, omit_dead: false };
/// assert_eq!(opts.render(&inst)?.as_deref(), Some("$r1 = ASSIGN([VALUE(0x0)]) # {dead: true}"));
/// # Ok::<(), blockscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DumpOptions {
    /// Rendering style of instructions (default: [`Style::Canonical`])
    pub style: Style,
    /// Skip instructions annotated as dead (default: false)
    pub omit_dead: bool,
}

impl InstRenderer for DumpOptions {
    fn render(&self, inst: &Inst) -> Result<Option<String>> {
        if self.omit_dead && inst.is_dead() {
            return Ok(None);
        }
        Ok(Some(match self.style {
            Style::Canonical => inst.to_canonical()?,
            Style::Diagnostic => inst.diagnostic().to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Expr;

    #[test]
    fn test_style_names() {
        assert_eq!(Style::Canonical.to_string(), "canonical");
        assert_eq!("diagnostic".parse::<Style>().unwrap(), Style::Diagnostic);
    }

    #[test]
    fn test_default_options_render_canonical() {
        let inst = Inst::assign(Expr::reg("r1"), Expr::reg("r2"));
        assert_eq!(
            DumpOptions::default().render(&inst).unwrap().as_deref(),
            Some("$r1 = $r2")
        );
    }

    #[test]
    fn test_dead_instructions_kept_unless_omitted() {
        let mut inst = Inst::assign(Expr::reg("r1"), Expr::reg("r2"));
        inst.mark_dead();
        assert!(DumpOptions::default().render(&inst).unwrap().is_some());
        let omit = DumpOptions {
            omit_dead: true,
            ..DumpOptions::default()
        };
        assert!(omit.render(&inst).unwrap().is_none());
    }

    #[test]
    fn test_canonical_violation_propagates() {
        let inst = Inst::infix(Expr::reg("r0"), crate::ir::InfixOp::Add, vec![]);
        assert!(DumpOptions::default().render(&inst).is_err());
    }
}
