// crates/sentinelops-core/src/approval.rs
// ============================================================================
// Module: SentinelOps Approval Engine
// Description: Deterministic rule matching deciding auto-approve / defer / deny.
// Purpose: Keep low-risk, high-confidence remediation out of human queues.
// Dependencies: crate::model, crate::identifiers, sentinelops_logic
// ============================================================================

//! ## Overview
//! Rules are matched in declaration order; the first rule whose guards all
//! evaluate to [`TriState::True`] under [`KleeneLogic`] (fail-closed: a
//! missing input makes its guard `Unknown`, which never satisfies a rule)
//! produces the decision. No matching rule defers to a human. See
//! the Approval Engine section of the configuration reference.

use sentinelops_logic::KleeneLogic;
use sentinelops_logic::TriLogic;
use sentinelops_logic::TriState;

use crate::identifiers::RuleId;
use crate::model::Action;
use crate::model::ApprovalDecision;
use crate::model::ApprovalOutcome;
use crate::model::ApprovalScoreComponents;
use crate::model::Severity;

/// A glob-like category matcher: `*` matches any suffix, otherwise exact.
fn category_matches(pattern: &str, category: &str) -> bool {
    pattern.strip_suffix('*').map_or_else(|| pattern == category, |prefix| category.starts_with(prefix))
}

/// One approval rule: if every guard is satisfied, its `outcome` applies.
#[derive(Debug, Clone)]
pub struct ApprovalRule {
    /// Stable identifier recorded on the resulting [`ApprovalDecision`].
    pub id: RuleId,
    /// Category glob this rule applies to (e.g. `"block_*"`, `"*"`).
    pub category_pattern: String,
    /// Minimum analysis confidence required, by severity.
    pub confidence_threshold: f64,
    /// Maximum action risk this rule will approve.
    pub max_risk: f64,
    /// If non-empty, the action's target resources must all appear here.
    pub resource_scope: Vec<String>,
    /// Categories this rule explicitly refuses, regardless of score.
    pub deny_categories: Vec<String>,
    /// The outcome produced when this rule's guards are satisfied.
    pub outcome: ApprovalOutcome,
}

impl ApprovalRule {
    /// Evaluates this rule's guards against `action` under `severity` with
    /// the given `confidence`, returning the tri-state verdict.
    fn evaluate(&self, action: &Action, severity: Severity, confidence: Option<f64>) -> TriState {
        let logic = KleeneLogic;

        if self.deny_categories.iter().any(|c| category_matches(c, &action.category)) {
            return TriState::False;
        }
        if action.requires_approval {
            return TriState::False;
        }
        if !category_matches(&self.category_pattern, &action.category) {
            return TriState::False;
        }
        if !self.resource_scope.is_empty()
            && !action.target.iter().all(|t| self.resource_scope.contains(t))
        {
            return TriState::False;
        }
        let _ = severity;

        let risk_ok = TriState::from(action.risk <= self.max_risk);
        let confidence_tri = match confidence {
            Some(c) => TriState::from(c >= self.confidence_threshold),
            None => TriState::Unknown,
        };
        logic.and(risk_ok, confidence_tri)
    }
}

/// An ordered set of [`ApprovalRule`]s plus the fallback for no match.
#[derive(Debug, Clone)]
pub struct ApprovalRuleSet {
    /// Rules evaluated in order; the first satisfied rule wins.
    pub rules: Vec<ApprovalRule>,
}

impl ApprovalRuleSet {
    /// Creates a rule set from an ordered list of rules.
    #[must_use]
    pub const fn new(rules: Vec<ApprovalRule>) -> Self {
        Self {
            rules,
        }
    }
}

/// Stateless evaluator producing [`ApprovalDecision`]s from an
/// [`ApprovalRuleSet`].
#[derive(Debug, Clone)]
pub struct ApprovalEngine {
    rules: ApprovalRuleSet,
    /// Rule id recorded when no rule matches (defers to a human).
    pub no_match_rule_id: RuleId,
}

impl ApprovalEngine {
    /// Creates an engine over `rules`.
    #[must_use]
    pub fn new(rules: ApprovalRuleSet) -> Self {
        Self {
            rules,
            no_match_rule_id: RuleId::new("no-match-defer"),
        }
    }

    /// Decides the outcome for `action` given the incident's `severity` and
    /// current analysis `confidence`.
    #[must_use]
    pub fn decide(
        &self,
        action: &Action,
        severity: Severity,
        confidence: Option<f64>,
        decided_at: String,
    ) -> ApprovalDecision {
        for rule in &self.rules.rules {
            if rule.evaluate(action, severity, confidence).is_true() {
                return ApprovalDecision {
                    outcome: rule.outcome,
                    rule_id: rule.id.clone(),
                    score_components: ApprovalScoreComponents {
                        confidence: confidence.unwrap_or(0.0),
                        risk: action.risk,
                        confidence_threshold: rule.confidence_threshold,
                        max_risk: rule.max_risk,
                    },
                    decided_at,
                };
            }
        }

        ApprovalDecision {
            outcome: ApprovalOutcome::DeferToHuman,
            rule_id: self.no_match_rule_id.clone(),
            score_components: ApprovalScoreComponents {
                confidence: confidence.unwrap_or(0.0),
                risk: action.risk,
                confidence_threshold: 0.0,
                max_risk: 0.0,
            },
            decided_at,
        }
    }
}
