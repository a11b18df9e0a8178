//! Package-qualified function references of the form
//! `PkgName=u-u-i-d:main.function.name`.

use std::str::FromStr;

use serde::Serialize;

use crate::error::JlcliError;

/// A function inside a package, identified by package name and UUID.
///
/// Serializes to the `pkgname`, `pkguuid` and `main` request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableReference {
    /// Package name (never contains `=`)
    #[serde(rename = "pkgname")]
    pub name: String,
    /// Package UUID (never contains `:`)
    #[serde(rename = "pkguuid")]
    pub uuid: String,
    /// Fully qualified function name; may itself contain `.` and `:`
    pub main: String,
}

impl CallableReference {
    /// Parse `<name>=<uuid>:<qualified-name>`.
    ///
    /// The name ends at the first `=`, the UUID at the next `:`, and the
    /// qualified name is everything after it. All three must be non-empty.
    pub fn parse(input: &str) -> Result<Self, JlcliError> {
        let (name, rest) = input.split_once('=').ok_or_else(invalid_callable)?;
        let (uuid, main) = rest.split_once(':').ok_or_else(invalid_callable)?;

        if name.is_empty() || uuid.is_empty() || main.is_empty() {
            return Err(invalid_callable());
        }

        Ok(Self {
            name: name.to_string(),
            uuid: uuid.to_string(),
            main: main.to_string(),
        })
    }
}

impl FromStr for CallableReference {
    type Err = JlcliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn invalid_callable() -> JlcliError {
    JlcliError::config(
        "Invalid CALLABLE argument. Requires an argument of the form: \
         PkgName=u-u-i-d:main.function.name",
    )
}
