use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! parse_error {
    ($line:expr, $msg:expr) => {
        crate::Error::Parse {
            line: $line,
            message: $msg.to_string(),
        }
    };

    ($line:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::Parse {
            line: $line,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The IR itself is a plain data structure whose consumers are trusted to keep its
/// invariants. Whenever one of those invariants is found broken, the violation is reported
/// immediately through this type and propagates to the top of the run. There is no local
/// recovery anywhere in the crate.
///
/// # Error Categories
///
/// ## Contract Violations
/// - [`Error::Malformed`] - An instruction, condition or operator that breaks its shape rules
/// - [`Error::Unordered`] - Ordering requested between expressions without a defined order
///
/// ## Pipeline Errors
/// - [`Error::UnknownPass`] - A pass script names a transformation that is not registered
///
/// ## Reading and Writing
/// - [`Error::Parse`] - Text could not be read back as IR
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Format`] - A formatter refused output
///
/// ## Graph Errors
/// - [`Error::GraphError`] - Misuse of the graph container
///
/// # Examples
///
/// ```rust
/// use blockscope::{Error, ir::{Expr, Inst, InfixOp}};
///
/// // An infix instruction must have exactly two arguments
/// let inst = Inst::infix(Expr::reg("r0"), InfixOp::Add, vec![Expr::reg("r1")]);
/// match inst.to_canonical() {
///     Err(Error::Malformed { message, .. }) => println!("bad instruction: {message}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(text) => println!("{text}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The IR violates one of its structural invariants.
    ///
    /// Raised for infix instructions whose argument count is not two, `LIT` instructions
    /// that carry a destination or more than one argument, compound conditions whose
    /// items do not alternate, unknown comparison or connective symbols and similar.
    /// The error includes the source location where the violation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed IR - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Two expressions were compared for order, but no order is defined between them.
    ///
    /// Only registers and memory references are ordered. Values, addresses and synthetic
    /// function references never are.
    #[error("No order is defined between {left} and {right}")]
    Unordered {
        /// Diagnostic rendering of the left operand
        left: String,
        /// Diagnostic rendering of the right operand
        right: String,
    },

    /// A pass script references a transformation that does not exist.
    ///
    /// Scripts are resolved completely before the first pass runs, so this error is
    /// returned before any mutation happened.
    #[error("Unknown transformation - {0}")]
    UnknownPass(String),

    /// Text could not be read back as IR.
    ///
    /// `line` is the 1-based line of the input that failed; readers of single items
    /// (an expression, a condition) report line 1.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based input line
        line: usize,
        /// What went wrong
        message: String,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// A formatter failed while writing rendered output.
    #[error("{0}")]
    Format(#[from] std::fmt::Error),

    /// Graph container error.
    ///
    /// Occurs when an edge references a node that does not exist, or when a node is
    /// looked up by an address the graph does not contain.
    #[error("{0}")]
    GraphError(String),
}
