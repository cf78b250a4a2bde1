use crate::Result;
use crate::expr::{EvaluationScope, Evaluator};
use crate::index::ResourceIndex;
use crate::model::{Resource, Rule, Violation};
use ohno::app_err;

const LOG_TARGET: &str = "     rules";

/// Evaluate one rule against every resource it selects.
///
/// Violations come out in the order the index returns the candidates. The first
/// evaluation error aborts the rule and is returned, naming the rule and resource.
pub fn evaluate_rule<E: Evaluator>(rule: &Rule, index: &ResourceIndex, evaluator: &E) -> Result<Vec<Violation>> {
    let candidates = index.by_type_pattern(&rule.resource_type);
    log::debug!(
        target: LOG_TARGET,
        "Evaluating rule '{}' against {} resource(s) matching '{}'",
        rule.id,
        candidates.len(),
        rule.resource_type
    );

    let mut violations = Vec::new();
    for resource in candidates.iter() {
        let scope = evaluator.scope(resource);
        if violates(rule, resource, &scope).map_err(|e| app_err!("rule '{}' failed on {}: {e}", rule.id, resource.address()))? {
            violations.push(Violation::new(rule, resource));
        }
    }

    log::debug!(target: LOG_TARGET, "Rule '{}' produced {} violation(s)", rule.id, violations.len());
    Ok(violations)
}

/// Evaluate every rule in order, concatenating their violations.
pub fn evaluate_rules<E: Evaluator>(rules: &[Rule], index: &ResourceIndex, evaluator: &E) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    for rule in rules {
        violations.extend(evaluate_rule(rule, index, evaluator)?);
    }
    Ok(violations)
}

fn violates(rule: &Rule, resource: &Resource, scope: &impl EvaluationScope) -> Result<bool> {
    if let Some(when) = &rule.when
        && !scope.evaluate(when)?
    {
        log::trace!(target: LOG_TARGET, "Skipping {} for rule '{}': gate is false", resource.address(), rule.id);
        return Ok(false);
    }

    for condition in &rule.conditions {
        if scope.evaluate(condition)? {
            log::trace!(
                target: LOG_TARGET,
                "{} violates rule '{}' on condition '{condition}'",
                resource.address(),
                rule.id
            );
            return Ok(true);
        }
    }

    Ok(false)
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedEvaluator;
    use super::*;
    use crate::expr::{CelEvaluator, Expression};
    use crate::functions::FunctionTable;
    use crate::functions::test_support::fixed_now;
    use crate::model::Severity;
    use std::sync::Arc;

    fn rule(resource_type: &str, when: Option<&str>, conditions: &[&str]) -> Rule {
        Rule {
            id: "test_rule".to_string(),
            name: "Test rule".to_string(),
            severity: Severity::Error,
            resource_type: resource_type.to_string(),
            when: when.map(|w| Expression::new(w).unwrap()),
            conditions: conditions.iter().map(|c| Expression::new(*c).unwrap()).collect(),
            message: "bad".to_string(),
            remediation: Some("fix it".to_string()),
        }
    }

    fn index() -> ResourceIndex {
        ResourceIndex::new(vec![
            Resource::new("aws_instance", "a", "main.tf", 1, 1),
            Resource::new("aws_s3_bucket", "b", "main.tf", 5, 1),
            Resource::new("aws_instance", "c", "other.tf", 2, 3),
        ])
    }

    #[test]
    fn test_always_true_flags_every_resource_of_type_in_order() {
        let violations = evaluate_rule(&rule("aws_instance", None, &["true"]), &index(), &ScriptedEvaluator::default()).unwrap();

        let names: Vec<_> = violations.iter().map(|v| v.resource_name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_violation_carries_rule_and_resource_fields() {
        let violations = evaluate_rule(&rule("aws_s3_bucket", None, &["true"]), &index(), &ScriptedEvaluator::default()).unwrap();

        assert_eq!(
            violations,
            vec![Violation {
                rule_id: "test_rule".to_string(),
                rule_name: "Test rule".to_string(),
                severity: Severity::Error,
                message: "bad".to_string(),
                remediation: Some("fix it".to_string()),
                file: "main.tf".to_string(),
                line: 5,
                column: 1,
                resource_type: "aws_s3_bucket".to_string(),
                resource_name: "b".to_string(),
            }]
        );
    }

    #[test]
    fn test_false_gate_skips_conditions() {
        let evaluator = ScriptedEvaluator::default();
        let violations = evaluate_rule(&rule("aws_instance", Some("false"), &["true", "boom"]), &index(), &evaluator).unwrap();

        assert!(violations.is_empty());
        assert_eq!(*evaluator.log.borrow(), vec!["a:false", "c:false"]);
    }

    #[test]
    fn test_conditions_short_circuit_on_first_true() {
        let evaluator = ScriptedEvaluator::default();
        let violations = evaluate_rule(&rule("aws_s3_bucket", None, &["false", "true", "boom"]), &index(), &evaluator).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(*evaluator.log.borrow(), vec!["b:false", "b:true"]);
    }

    #[test]
    fn test_all_false_conditions_produce_nothing() {
        let violations = evaluate_rule(&rule("*", Some("true"), &["false", "false"]), &index(), &ScriptedEvaluator::default()).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_condition_error_aborts() {
        let err = evaluate_rule(&rule("aws_instance", None, &["boom"]), &index(), &ScriptedEvaluator::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rule 'test_rule' failed on aws_instance.a"));
        assert!(message.contains("cannot evaluate 'boom'"));
    }

    #[test]
    fn test_gate_error_aborts() {
        let evaluator = ScriptedEvaluator::default();
        let err = evaluate_rule(&rule("aws_instance", Some("boom"), &["true"]), &index(), &evaluator).unwrap_err();

        assert!(err.to_string().contains("cannot evaluate 'boom'"));
        assert_eq!(*evaluator.log.borrow(), vec!["a:boom"]);
    }

    #[test]
    fn test_no_matching_resources() {
        let evaluator = ScriptedEvaluator::default();
        let violations = evaluate_rule(&rule("azurerm_*", None, &["boom"]), &index(), &evaluator).unwrap();

        assert!(violations.is_empty());
        assert!(evaluator.log.borrow().is_empty());
    }

    #[test]
    fn test_rules_evaluated_in_order() {
        let mut first = rule("aws_s3_bucket", None, &["true"]);
        first.id = "first".to_string();
        let mut second = rule("aws_instance", None, &["true"]);
        second.id = "second".to_string();

        let violations = evaluate_rules(&[first, second], &index(), &ScriptedEvaluator::default()).unwrap();
        let ids: Vec<_> = violations.iter().map(|v| format!("{}:{}", v.rule_id, v.resource_name)).collect();
        assert_eq!(ids, vec!["first:b", "second:a", "second:c"]);
    }

    #[test]
    fn test_later_rule_error_discards_everything() {
        let good = rule("aws_s3_bucket", None, &["true"]);
        let bad = rule("aws_instance", None, &["boom"]);

        assert!(evaluate_rules(&[good, bad], &index(), &ScriptedEvaluator::default()).is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_end_to_end_with_cel() {
        let large = Resource::new("aws_instance", "large", "main.tf", 1, 1).with_attribute("instance_type", "t3.large");
        let micro = Resource::new("aws_instance", "micro", "main.tf", 8, 1).with_attribute("instance_type", "t3.micro");
        let index = Arc::new(ResourceIndex::new(vec![large, micro]));
        let evaluator = CelEvaluator::new(FunctionTable::standard(Arc::clone(&index), fixed_now()));

        let rule = rule("aws_instance", Some("self.instance_type == \"t3.large\""), &["true"]);
        let violations = evaluate_rule(&rule, &index, &evaluator).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].resource_name, "large");
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_end_to_end_non_boolean_condition_aborts() {
        let index = Arc::new(ResourceIndex::new(vec![
            Resource::new("aws_instance", "web", "main.tf", 1, 1).with_attribute("instance_type", "t3.large"),
        ]));
        let evaluator = CelEvaluator::new(FunctionTable::standard(Arc::clone(&index), fixed_now()));

        let err = evaluate_rule(&rule("aws_instance", None, &["self.instance_type"]), &index, &evaluator).unwrap_err();
        assert!(err.to_string().contains("did not return a boolean"));
    }
}
