//! Constraint types shared by the tool request records.
//!
//! Numeric bounds are checked once, at construction, so a record holding a
//! [`Page`] or [`PerPage`] never carries an out-of-range value onto the wire.

use std::fmt;
use std::str::FromStr;

use crate::error::ToolError;

/// GitHub caps page sizes at 100.
pub const MAX_PER_PAGE: u32 = 100;

/// 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(u32);

impl Page {
    pub fn new(value: u32) -> Result<Self, ToolError> {
        if value == 0 {
            return Err(ToolError::validation(
                "page",
                format!("must be at least 1, got {}", value),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Page size in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerPage(u32);

impl PerPage {
    pub fn new(value: u32) -> Result<Self, ToolError> {
        if !(1..=MAX_PER_PAGE).contains(&value) {
            return Err(ToolError::validation(
                "perPage",
                format!("must be between 1 and {}, got {}", MAX_PER_PAGE, value),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Field the repository search is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Stars,
    Forks,
    HelpWantedIssues,
    Updated,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
            SortKey::HelpWantedIssues => "help-wanted-issues",
            SortKey::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

macro_rules! wire_enum {
    ($ty:ident, $field:literal, [$($variant:ident),+]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ToolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($ty::$variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = [$($ty::$variant),+]
                            .into_iter()
                            .map(|v| v.as_str())
                            .collect();
                        ToolError::validation(
                            $field,
                            format!("expected one of {}, got '{}'", allowed.join(", "), s),
                        )
                    })
            }
        }
    };
}

wire_enum!(SortKey, "sort", [Stars, Forks, HelpWantedIssues, Updated]);
wire_enum!(SortOrder, "order", [Asc, Desc]);
