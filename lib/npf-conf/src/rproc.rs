// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named rule processors.
//!
//! A rule processor is a post-match processing step the engine applies
//! to matching packets. Only creation is defined so far; registration
//! into a configuration and attachment to rules return
//! [`Error::NotImplemented`] from [`crate::Config`] until the engine
//! contract for them is settled.

use crate::error::Error;
use npf_api::NPF_RPROC_NAME_LEN;
use npf_api::RprocDef;

/// A named post-match processing step.
#[derive(Clone, Debug)]
pub struct RuleProc {
    name: String,
}

impl RuleProc {
    /// Build a rule processor, validating the name against the
    /// engine's naming rules: non-empty, shorter than
    /// `NPF_RPROC_NAME_LEN`, printable ASCII.
    pub fn new(name: &str) -> Result<Self, Error> {
        let printable = name.bytes().all(|b| b.is_ascii_graphic());
        if name.is_empty() || name.len() >= NPF_RPROC_NAME_LEN || !printable {
            return Err(Error::BadName(name.to_string()));
        }

        Ok(RuleProc { name: name.to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn to_def(&self) -> RprocDef {
        RprocDef { name: self.name.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(RuleProc::new("log").is_ok());
        assert!(RuleProc::new("norm-ip4").is_ok());

        assert!(matches!(RuleProc::new(""), Err(Error::BadName(_))));
        assert!(matches!(
            RuleProc::new("name with spaces"),
            Err(Error::BadName(_))
        ));

        let long = "x".repeat(NPF_RPROC_NAME_LEN);
        assert!(matches!(RuleProc::new(&long), Err(Error::BadName(_))));

        let longest = "x".repeat(NPF_RPROC_NAME_LEN - 1);
        assert!(RuleProc::new(&longest).is_ok());
    }
}
