//! The runtime hook table.
//!
//! The short-name convention is part of the wire contract with the runtime:
//! every instrumented site calls `D$.<short>(id, ...)` and existing analyses
//! depend on these exact names. Preserve them bit-exactly.

/// The global object the emitted code reports into.
pub const RUNTIME_GLOBAL: &str = "D$";

/// Marker string whose presence anywhere in a source disables
/// instrumentation. The preamble carries it so re-instrumentation is a
/// no-op.
pub const NO_INSTRUMENT_MARKER: &str = "NO_INSTRUMENT";

/// Tool name, used in the preamble comment and the derived file suffix.
pub const TOOL_NAME: &str = "jstrument";

/// Scratch slot holding the current `for-in`/`for-of` iteration value, and
/// the memoized base object of member update/compound-assignment targets.
pub const TEMP_VALUE: &str = "D$._t";

/// Second scratch slot: the memoized property key of computed member
/// update/compound-assignment targets.
pub const TEMP_PROP: &str = "D$._t2";

/// Runtime hooks, one per observable event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    /// `L(id, value[, typeCode])` - literal
    Literal,
    /// `E(id, value)` - expression result
    Expr,
    /// `B(id, op, l, r)` - binary operation
    Binary,
    /// `U(id, op, operand)` - unary operation
    Unary,
    /// `Up(id, binId, op, prefix, arg, writer)` - update operation
    Update,
    /// `C(id, op, value)` - condition
    Condition,
    /// `Swl(id, value)` - switch discriminant
    SwitchLeft,
    /// `Swr(id, caseValue)` - switch case test
    SwitchRight,
    /// `D(id, name, kind[, value])` - variable declaration
    Declare,
    /// `R(id, name, value)` - variable read
    Read,
    /// `W(id, names[], value)` - variable write
    Write,
    /// `Th(id, value)` - throw
    Throw,
    /// `X(id, value)` - uncaught exception
    Uncaught,
    /// `F(id, f, isCtor)` - build plain call wrapper
    FunWrapper,
    /// `M(id, base, prop, isCtor)` - build method call wrapper
    MethodWrapper,
    /// `Fe(id, callee, this, args)` - function enter
    FunctionEnter,
    /// `Fx(id)` - function exit
    FunctionExit,
    /// `Re(id, value)` - return-value capture
    Return,
    /// `Se(id, instPath, origPath)` - script enter
    ScriptEnter,
    /// `Sx(id)` - script exit
    ScriptExit,
    /// `G(id, base, prop)` - get field
    GetField,
    /// `P(id, base, prop, value)` - put field
    PutField,
    /// `De(id, base, prop)` - delete field
    Delete,
    /// `O(id, value, isForIn)` - for-in/for-of object
    ForInObject,
}

impl Hook {
    pub fn short(self) -> &'static str {
        match self {
            Hook::Literal => "L",
            Hook::Expr => "E",
            Hook::Binary => "B",
            Hook::Unary => "U",
            Hook::Update => "Up",
            Hook::Condition => "C",
            Hook::SwitchLeft => "Swl",
            Hook::SwitchRight => "Swr",
            Hook::Declare => "D",
            Hook::Read => "R",
            Hook::Write => "W",
            Hook::Throw => "Th",
            Hook::Uncaught => "X",
            Hook::FunWrapper => "F",
            Hook::MethodWrapper => "M",
            Hook::FunctionEnter => "Fe",
            Hook::FunctionExit => "Fx",
            Hook::Return => "Re",
            Hook::ScriptEnter => "Se",
            Hook::ScriptExit => "Sx",
            Hook::GetField => "G",
            Hook::PutField => "P",
            Hook::Delete => "De",
            Hook::ForInObject => "O",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_wire_exact() {
        // These names are the contract with the runtime and with existing
        // analyses; a rename breaks every deployed analysis module.
        let expected = [
            (Hook::Literal, "L"),
            (Hook::Expr, "E"),
            (Hook::Binary, "B"),
            (Hook::Unary, "U"),
            (Hook::Update, "Up"),
            (Hook::Condition, "C"),
            (Hook::SwitchLeft, "Swl"),
            (Hook::SwitchRight, "Swr"),
            (Hook::Declare, "D"),
            (Hook::Read, "R"),
            (Hook::Write, "W"),
            (Hook::Throw, "Th"),
            (Hook::Uncaught, "X"),
            (Hook::FunWrapper, "F"),
            (Hook::MethodWrapper, "M"),
            (Hook::FunctionEnter, "Fe"),
            (Hook::FunctionExit, "Fx"),
            (Hook::Return, "Re"),
            (Hook::ScriptEnter, "Se"),
            (Hook::ScriptExit, "Sx"),
            (Hook::GetField, "G"),
            (Hook::PutField, "P"),
            (Hook::Delete, "De"),
            (Hook::ForInObject, "O"),
        ];
        for (hook, short) in expected {
            assert_eq!(hook.short(), short);
        }
    }
}
