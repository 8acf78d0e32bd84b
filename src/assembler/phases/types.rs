use derive_more::Constructor;
use std::fmt::Display;

/// A 1-based line number in a source unit. Line `0` marks errors which do not
/// belong to any single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Constructor)]
pub struct Loc {
    line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    loc: Loc,
    val: T,
}

impl Loc {
    pub fn line(&self) -> usize {
        self.line
    }
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {})", self.line)
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}: {}", self.loc, self.val)
    }
}

impl<T> Located<T> {
    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located { loc, val }
    }

    pub fn loc(&self) -> Loc {
        self.loc
    }

    pub fn get(&self) -> &T {
        &self.val
    }

    pub fn value(self) -> T {
        self.val
    }

    pub fn map<S, F>(self, f: F) -> Located<S>
    where
        F: FnOnce(T) -> S,
    {
        Located::with_loc(self.loc, f(self.val))
    }
}
