//! Pass scripts.
//!
//! A script lists the transformations to apply, one per line, in order:
//!
//! ```text
//! # tidy up before numbering
//! xform_bblock: remove_trailing_jumps
//! xform: number_postorder
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Whether a pass works on the whole graph or on one block at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, Display, IntoStaticStr, EnumIter,
)]
pub enum PassKind {
    /// Whole-graph pass, script keyword `xform`.
    #[strum(serialize = "xform")]
    Graph,
    /// Per-block pass, script keyword `xform_bblock`.
    #[strum(serialize = "xform_bblock")]
    Block,
}

/// One line of a pass script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Graph or block pass.
    pub kind: PassKind,
    /// Registered name of the pass.
    pub name: String,
    /// 1-based line of the script the step was read from.
    pub line: usize,
}

/// A parsed pass script: the ordered list of steps to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Parses a pass script.
    ///
    /// # Arguments
    ///
    /// * `text` - The script source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for a line that is neither blank, a comment nor a
    /// `keyword: name` step, or whose keyword is unknown.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockscope::pipeline::{PassKind, Script};
    ///
    /// let script = Script::parse("# cleanup\nxform_bblock: remove_dead\nxform: number_postorder\n")?;
    /// assert_eq!(script.len(), 2);
    /// assert_eq!(script.steps()[0].kind, PassKind::Block);
    /// assert_eq!(script.steps()[1].name, "number_postorder");
    /// # Ok::<(), blockscope::Error>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((keyword, name)) = trimmed.split_once(':') else {
                return Err(parse_error!(line, "expected 'keyword: name', got '{}'", trimmed));
            };
            let kind = PassKind::from_str(keyword.trim())
                .map_err(|_| parse_error!(line, "unknown script keyword '{}'", keyword.trim()))?;
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(parse_error!(line, "invalid pass name '{}'", name));
            }

            steps.push(Step {
                kind,
                name: name.to_string(),
                line,
            });
        }
        Ok(Script { steps })
    }

    /// Creates a script from already built steps.
    #[must_use]
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Script { steps }
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromStr for Script {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Script::parse(s)
    }
}
