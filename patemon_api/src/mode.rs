use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Instance mode of a provisioned appliance.
///
/// The image writer records the selected mode in the boot partition marker
/// file and the first-boot installer reads it back. Both sides accept exactly
/// this set of values.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceMode {
    /// Development unit.
    Dev,
    /// User acceptance testing unit.
    Uat,
    /// Production unit.
    #[default]
    Prd,
}

impl InstanceMode {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(InstanceMode::Dev.name(), "DEV");
        assert_eq!(InstanceMode::Uat.name(), "UAT");
        assert_eq!(InstanceMode::Prd.name(), "PRD");
        assert_eq!(InstanceMode::default(), InstanceMode::Prd);
    }

    #[test]
    fn test_mode_parsing() {
        for mode in InstanceMode::iter() {
            assert_eq!(InstanceMode::from_str(mode.name()).unwrap(), mode);
        }

        // Operator input is accepted in any case
        assert_eq!(InstanceMode::from_str("dev").unwrap(), InstanceMode::Dev);

        InstanceMode::from_str("STAGING").unwrap_err();
        InstanceMode::from_str("").unwrap_err();
    }
}
