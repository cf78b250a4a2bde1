use super::Severity;
use crate::Result;
use crate::expr::Expression;
use ohno::bail;
use serde::{Deserialize, Serialize};

/// One named policy check.
///
/// A rule applies to every resource whose type matches `resource_type`. For each
/// such resource the optional `when` gate is evaluated first; if it holds (or is
/// absent), the resource violates the rule when any of the `conditions` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub severity: Severity,

    /// An exact type name, or a pattern using `*` and `?` wildcards
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Expression>,

    pub conditions: Vec<Expression>,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl Rule {
    /// Check the invariants serde cannot express.
    ///
    /// # Errors
    /// Returns an error if the id is blank or there are no conditions
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("rule '{}' has an empty id", self.name);
        }

        if self.conditions.is_empty() {
            bail!("rule '{}' has no conditions", self.id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = r#"
        id = "aws_instance_large"
        name = "Large instance"
        severity = "warning"
        resource_type = "aws_instance"
        when = "self.instance_type.startsWith('t3.')"
        conditions = ["self.instance_type == 't3.large'", "self.instance_type == 't3.xlarge'"]
        message = "Instance is oversized"
        remediation = "Use t3.medium"
    "#;

    #[test]
    fn test_deserialize_full_rule() {
        let rule: Rule = toml::from_str(RULE).unwrap();

        assert_eq!(rule.id, "aws_instance_large");
        assert_eq!(rule.severity, Severity::Warning);
        assert_eq!(rule.when.as_ref().map(Expression::text), Some("self.instance_type.startsWith('t3.')"));
        assert_eq!(rule.conditions.len(), 2);
        assert_eq!(rule.remediation.as_deref(), Some("Use t3.medium"));
        rule.validate().unwrap();
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let rule: Rule = toml::from_str(
            r#"
            id = "r"
            name = "R"
            severity = "info"
            resource_type = "*"
            conditions = ["true"]
            message = "m"
            "#,
        )
        .unwrap();

        assert!(rule.when.is_none());
        assert!(rule.remediation.is_none());
    }

    #[test]
    fn test_invalid_condition_fails_to_load() {
        let text = RULE.replace("self.instance_type == 't3.large'", "self.instance_type ==");
        let err = toml::from_str::<Rule>(&text).unwrap_err();
        assert!(err.to_string().contains("could not parse expression"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = format!("{RULE}\nseverty = \"error\"\n");
        assert!(toml::from_str::<Rule>(&text).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_conditions() {
        let mut rule: Rule = toml::from_str(RULE).unwrap();
        rule.conditions.clear();

        let err = rule.validate().unwrap_err();
        assert!(err.to_string().contains("rule 'aws_instance_large' has no conditions"));
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let mut rule: Rule = toml::from_str(RULE).unwrap();
        rule.id = "  ".to_string();
        assert!(rule.validate().is_err());
    }
}
