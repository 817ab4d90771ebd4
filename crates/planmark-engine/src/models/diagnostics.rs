use std::fmt;

use serde::Serialize;

use super::ast::Range;

/// Diagnostic severity, ordered error > warning > info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Rank for minimum-severity filtering: error=0, warning=1, info=2.
    pub fn rank(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warning => 1,
            Self::Info => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// The lint engine's output unit. This is a stable wire shape consumed by
/// downstream reporters and editor tooling: field names and the 1-based
/// coordinate convention must not change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ast::Location;

    #[test]
    fn serializes_to_the_wire_shape() {
        let d = Diagnostic {
            rule_id: "PLAN-001".into(),
            severity: Severity::Error,
            message: "msg".into(),
            range: Range::new(Location::new(1, 1), Location::new(1, 5)),
            file_path: None,
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["ruleId"], "PLAN-001");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["range"]["start"]["line"], 1);
        assert_eq!(json["range"]["end"]["column"], 5);
        assert!(json.get("filePath").is_none());
    }

    #[test]
    fn severity_rank_orders_error_first() {
        assert!(Severity::Error.rank() < Severity::Warning.rank());
        assert!(Severity::Warning.rank() < Severity::Info.rank());
    }
}
