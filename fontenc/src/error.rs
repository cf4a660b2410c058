#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Malformed encoding program")]
    MalformedEncodingProgram(#[from] Malformed),
}

/// The reason an encoding program could not be executed.
#[derive(thiserror::Error, Debug, PartialEq, Clone)]
pub enum Malformed {
    #[error("stack underflow at `repeat`")]
    RepeatUnderflow,
    #[error("`repeat` expected a procedure, found {0}")]
    ExpectedProcedure(String),
    #[error("`repeat` expected an integer count, found {0}")]
    ExpectedInteger(String),
    /// A digit run inside an array does not fit into an `i64`.
    #[error("integer {0} is too large")]
    IntegerOverflow(String),
    /// `]` tried to bind something that is not a name.
    #[error("only names can be bound to an array, found {0}")]
    KeyNotAName(String),
    /// A token was recorded while no procedure was on top of the stack.
    #[error("procedure body recorded without a procedure on the stack")]
    RecordingWithoutProcedure,
}
