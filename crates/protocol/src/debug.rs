//! The `debug` query-parameter selector.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Which instrumentation packages are active on a page.
///
/// String form is the literal `all` or a comma-joined package list. Package
/// segments are kept verbatim so that appending to an existing selector only
/// ever adds `,pkg` to the serialized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugSelector {
    /// Every package (`debug=all`), absorbing any package list.
    All,
    /// A specific package list, insertion-ordered.
    Packages(Vec<String>),
}

impl DebugSelector {
    /// Parses the string form. Only the exact literal `all` selects
    /// everything; `all,foo` is a package list that happens to contain a
    /// package named `all`.
    pub fn parse(s: &str) -> Self {
        if s == "all" {
            DebugSelector::All
        } else if s.is_empty() {
            DebugSelector::Packages(Vec::new())
        } else {
            DebugSelector::Packages(s.split(',').map(str::to_string).collect())
        }
    }

    /// True for the `all` selector.
    pub fn is_all(&self) -> bool {
        matches!(self, DebugSelector::All)
    }

    /// True when the selector names no packages (and is not `all`).
    pub fn is_empty(&self) -> bool {
        matches!(self, DebugSelector::Packages(packages) if packages.is_empty())
    }

    /// Membership test; `all` contains everything.
    pub fn contains(&self, package: &str) -> bool {
        match self {
            DebugSelector::All => true,
            DebugSelector::Packages(packages) => packages.iter().any(|p| p == package),
        }
    }

    /// Appends `package` unless already covered. Returns whether the
    /// selector changed.
    pub fn insert(&mut self, package: &str) -> bool {
        match self {
            DebugSelector::All => false,
            DebugSelector::Packages(packages) => {
                if packages.iter().any(|p| p == package) {
                    false
                } else {
                    packages.push(package.to_string());
                    true
                }
            }
        }
    }
}

impl Default for DebugSelector {
    fn default() -> Self {
        DebugSelector::Packages(Vec::new())
    }
}

impl FromStr for DebugSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DebugSelector::parse(s))
    }
}

impl fmt::Display for DebugSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugSelector::All => f.write_str("all"),
            DebugSelector::Packages(packages) => f.write_str(&packages.join(",")),
        }
    }
}

impl Serialize for DebugSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DebugSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DebugSelector::parse(&s))
    }
}
