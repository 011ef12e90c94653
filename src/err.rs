use displaydoc::Display;

/// Any error which can occur while constructing a selector.
#[derive(Debug, Display, Eq, PartialEq, Clone, Copy)]
pub enum Error {
    /// The pool is empty, so there is no element a selector could ever return.
    EmptyPool,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// No selector strategy is registered under the name `{0}`.
#[derive(Debug, Display, Eq, PartialEq, Clone)]
pub struct ParseStrategyError(pub(crate) alloc::string::String);

#[cfg(feature = "std")]
impl std::error::Error for ParseStrategyError {}
