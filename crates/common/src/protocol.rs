//! HTTP surface shared by the server and its tests.
//!
//! Both endpoints answer `GET` with a `text/plain` body. Each route carries a
//! label that names the server span produced for every request it handles.

use std::fmt;
use std::str::FromStr;

/// `Content-Type` of every response body the service writes.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Literal body returned by the health check.
pub const SMOKE_BODY: &str = "OK";

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// An instrumented endpoint exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `GET /rolldice` — returns a die face in `[1, 6]`.
    Roll,
    /// `GET /smoke` — health check, always `OK`.
    Smoke,
}

impl Route {
    /// Every route the service registers.
    pub const ALL: [Route; 2] = [Route::Roll, Route::Smoke];

    /// Request path the route is mounted on.
    pub const fn path(self) -> &'static str {
        match self {
            Route::Roll => "/rolldice",
            Route::Smoke => "/smoke",
        }
    }

    /// Span name used for requests on this route.
    pub const fn label(self) -> &'static str {
        match self {
            Route::Roll => "Roll",
            Route::Smoke => "Smoke",
        }
    }
}

// ---------------------------------------------------------------------------
// Dice roll
// ---------------------------------------------------------------------------

/// A single face of a six-sided die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DieFace(u8);

impl DieFace {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// Returns `None` unless `value` is in `[1, 6]`.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a response body is not a die face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDieFace(pub String);

impl fmt::Display for InvalidDieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a die face: {:?}", self.0)
    }
}

impl std::error::Error for InvalidDieFace {}

impl FromStr for DieFace {
    type Err = InvalidDieFace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u8>()
            .ok()
            .and_then(DieFace::new)
            .ok_or_else(|| InvalidDieFace(s.to_owned()))
    }
}
