use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::IndexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterHealth {
    Green,
    Yellow,
    Red,
}

impl ClusterHealth {
    /// Yellow clusters serve every request, some replicas are just missing.
    pub fn is_operational(self) -> bool {
        matches!(self, ClusterHealth::Green | ClusterHealth::Yellow)
    }
}

impl fmt::Display for ClusterHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ClusterHealth::Green => "green",
            ClusterHealth::Yellow => "yellow",
            ClusterHealth::Red => "red",
        };
        f.write_str(status)
    }
}

impl<'a> TryFrom<&'a str> for ClusterHealth {
    type Error = IndexError;
    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        match value {
            "green" => Ok(ClusterHealth::Green),
            "yellow" => Ok(ClusterHealth::Yellow),
            "red" => Ok(ClusterHealth::Red),
            _ => Err(IndexError::UnknownClusterHealth(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {

    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn should_parse_cluster_status() {
        assert_that!(ClusterHealth::try_from("green")).is_ok_containing(ClusterHealth::Green);
        assert_that!(ClusterHealth::try_from("yellow")).is_ok_containing(ClusterHealth::Yellow);
        assert_that!(ClusterHealth::try_from("red")).is_ok_containing(ClusterHealth::Red);
        assert_that!(ClusterHealth::try_from("purple"))
            .is_err()
            .matches(|err| matches!(err, IndexError::UnknownClusterHealth(s) if s == "purple"));
    }

    #[test]
    fn red_cluster_is_not_operational() {
        assert_that!(ClusterHealth::Yellow.is_operational()).is_true();
        assert_that!(ClusterHealth::Red.is_operational()).is_false();
    }
}
