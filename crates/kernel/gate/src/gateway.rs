use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warden_kernel_types::{canonical_digest, Budget, Clock, ParamMap, ParamValue, SystemClock};

use crate::decision::{CallRecord, DecidingGate, GatewayDecision};
use crate::error::GatewayError;
use crate::schema::ToolSchema;
use crate::traits::{EnforcementDecision, EnforcementProvider};

/// Gateway tuning knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// How long a recorded call satisfies an identical one.
    pub idempotency_ttl_ms: u64,
    /// Token cost rate for the cost ledger.
    pub usd_per_1k_tokens: f64,
    /// Optional flat per-call cost added on top of the token rate.
    pub usd_per_tool_call: Option<f64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            idempotency_ttl_ms: 300_000,
            usd_per_1k_tokens: 0.003,
            usd_per_tool_call: None,
        }
    }
}

/// Admission control for tool calls.
///
/// `evaluate` is the read half (no state mutation); `record_call` is the
/// effect half, run by the host after the tool actually executed. A single
/// instance is not safe for unsynchronized concurrent mutation; callers
/// serialize access per agent.
pub struct ToolGateway {
    schemas: HashMap<String, ToolSchema>,
    budget: Budget,
    records: HashMap<String, CallRecord>,
    enforcement: Option<Box<dyn EnforcementProvider>>,
    config: GatewayConfig,
    clock: Arc<dyn Clock>,
}

impl ToolGateway {
    pub fn new(budget: Budget) -> Self {
        Self {
            schemas: HashMap::new(),
            budget,
            records: HashMap::new(),
            enforcement: None,
            config: GatewayConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_enforcement(mut self, provider: Box<dyn EnforcementProvider>) -> Self {
        self.enforcement = Some(provider);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a parameter schema for a tool. Tools without a registered
    /// schema pass validation unchecked.
    pub fn register_schema(&mut self, schema: ToolSchema) -> Result<(), GatewayError> {
        if self.schemas.contains_key(&schema.name) {
            return Err(GatewayError::DuplicateSchema(schema.name));
        }
        debug!(tool = %schema.name, "Schema registered");
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Admission check for one tool call.
    ///
    /// A fresh idempotency hit replays the recorded result immediately; no
    /// gate runs and the enforcement collaborator is not re-invoked. On a
    /// miss the blocking pipeline runs in fixed order — schema, budget,
    /// enforcement — and the first failing stage decides.
    pub fn evaluate(&self, tool: &str, params: &ParamMap) -> GatewayDecision {
        let digest = canonical_digest(tool, params);

        if let Some(record) = self.records.get(&digest) {
            let age_ms = self.clock.now_ms().saturating_sub(record.recorded_at_ms);
            if age_ms <= self.config.idempotency_ttl_ms {
                debug!(tool, digest = %&digest[..12], age_ms, "Idempotency hit");
                let mut decision = GatewayDecision::allowed(self.budget.clone());
                decision.idempotency_hit = true;
                decision.cached_result = Some(record.result.clone());
                decision.reason = "Idempotent replay of identical call".to_string();
                return decision;
            }
        }

        if let Some(schema) = self.schemas.get(tool) {
            let validation = schema.validate(params);
            if !validation.is_valid() {
                let reason = validation.errors.join("; ");
                warn!(tool, %reason, "Schema validation failed");
                return GatewayDecision::blocked(DecidingGate::Schema, reason, self.budget.clone());
            }
        }

        let exceeded = self.budget.exceeded_dimensions();
        if !exceeded.is_empty() {
            let names: Vec<String> = exceeded.iter().map(|d| d.to_string()).collect();
            let reason = format!("Budget exceeded: {}", names.join(", "));
            warn!(tool, %reason, "Budget gate blocked call");
            return GatewayDecision::blocked(DecidingGate::Budget, reason, self.budget.clone());
        }

        let mut warnings = Vec::new();
        if let Some(provider) = &self.enforcement {
            for verdict in provider.evaluate(tool, params) {
                match verdict.decision {
                    EnforcementDecision::Block => {
                        warn!(
                            tool,
                            gate = %verdict.gate_name,
                            reason = %verdict.reason,
                            "Enforcement gate blocked call"
                        );
                        let mut reason = verdict.reason.clone();
                        if let Some(remediation) = &verdict.remediation {
                            reason.push_str(&format!(" (remediation: {remediation})"));
                        }
                        return GatewayDecision::blocked(
                            DecidingGate::Enforcement(verdict.gate_name),
                            reason,
                            self.budget.clone(),
                        );
                    }
                    EnforcementDecision::RequireConfirmation | EnforcementDecision::Warn => {
                        warnings.push(format!("{}: {}", verdict.gate_name, verdict.reason));
                    }
                }
            }
        }

        debug!(tool, "Call admitted");
        let mut decision = GatewayDecision::allowed(self.budget.clone());
        decision.warnings = warnings;
        decision
    }

    /// Record a completed tool call: charge the budget and store the result
    /// for idempotent replay. Tokens are charged only when the host supplies
    /// a count; storage is charged by the serialized result size.
    pub fn record_call(
        &mut self,
        tool: &str,
        params: &ParamMap,
        result: serde_json::Value,
        duration_ms: u64,
        token_count: Option<u64>,
    ) {
        self.budget.tool_calls.add(1);
        self.budget.time_ms.add(duration_ms);

        let mut tokens = 0;
        if let Some(count) = token_count {
            tokens = count;
            self.budget.tokens.add(count);
        }

        let result_size = result.to_string().len() as u64;
        self.budget.storage_bytes.add(result_size);

        let mut cost = tokens as f64 / 1_000.0 * self.config.usd_per_1k_tokens;
        if let Some(per_call) = self.config.usd_per_tool_call {
            cost += per_call;
        }
        self.budget.cost_usd.add(cost);

        let now_ms = self.clock.now_ms();
        self.prune_expired(now_ms);

        let digest = canonical_digest(tool, params);
        debug!(tool, digest = %&digest[..12], duration_ms, "Call recorded");
        self.records.insert(
            digest.clone(),
            CallRecord {
                tool_name: tool.to_string(),
                digest,
                result,
                recorded_at_ms: now_ms,
                duration_ms,
            },
        );
    }

    fn prune_expired(&mut self, now_ms: u64) {
        let ttl = self.config.idempotency_ttl_ms;
        self.records
            .retain(|_, r| now_ms.saturating_sub(r.recorded_at_ms) <= ttl);
    }

    /// Defensive copy of the budget; mutating it never affects the gateway.
    pub fn budget(&self) -> Budget {
        self.budget.clone()
    }

    /// Zero all `used` fields, preserving limits. Starts a new period.
    pub fn reset_budget(&mut self) {
        self.budget.reset();
    }

    /// Estimated serialized size of a parameter bag, as charged to storage.
    pub fn estimate_size(params: &ParamMap) -> usize {
        ParamValue::Object(params.clone()).serialized_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use warden_kernel_types::{ManualClock, Meter, ParamType};

    use crate::schema::ToolSchema;
    use crate::traits::EnforcementVerdict;

    fn params(pairs: &[(&str, ParamValue)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn gateway_with_schema() -> ToolGateway {
        let mut gw = ToolGateway::new(Budget::unlimited());
        gw.register_schema(
            ToolSchema::new("search")
                .required("query", ParamType::String)
                .optional("limit", ParamType::Number),
        )
        .unwrap();
        gw
    }

    struct CountingProvider {
        calls: Arc<AtomicU32>,
        verdicts: Vec<EnforcementVerdict>,
    }

    impl EnforcementProvider for CountingProvider {
        fn evaluate(&self, _tool: &str, _params: &ParamMap) -> Vec<EnforcementVerdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdicts.clone()
        }
    }

    #[test]
    fn unregistered_tool_passes_unchecked() {
        let gw = ToolGateway::new(Budget::unlimited());
        let decision = gw.evaluate("mystery", &params(&[("anything", 1.0.into())]));
        assert!(decision.allowed);
        assert_eq!(decision.gate, DecidingGate::None);
    }

    #[test]
    fn schema_failure_decides_first() {
        let mut gw = gateway_with_schema();
        // Budget also exhausted; schema must still be the deciding gate.
        gw.budget.tokens = Meter::limited(10);
        gw.budget.tokens.add(11);

        let decision = gw.evaluate("search", &params(&[("limit", 5.0.into())]));
        assert!(!decision.allowed);
        assert_eq!(decision.gate, DecidingGate::Schema);
        assert!(decision.reason.contains("Missing required parameter"));
    }

    #[test]
    fn budget_block_names_dimensions() {
        let mut budget = Budget {
            tokens: Meter::limited(10),
            time_ms: Meter::limited(100),
            ..Budget::unlimited()
        };
        budget.tokens.add(11);
        budget.time_ms.add(200);
        let gw = ToolGateway::new(budget);

        let decision = gw.evaluate("anything", &params(&[]));
        assert!(!decision.allowed);
        assert_eq!(decision.gate, DecidingGate::Budget);
        assert!(decision.reason.contains("tokens"));
        assert!(decision.reason.contains("time"));
    }

    #[test]
    fn budget_at_limit_is_allowed() {
        let mut budget = Budget {
            tool_calls: Meter::limited(5),
            ..Budget::unlimited()
        };
        budget.tool_calls.add(5);
        let gw = ToolGateway::new(budget);
        assert!(gw.evaluate("t", &params(&[])).allowed);
    }

    #[test]
    fn enforcement_block_surfaces_gate_name() {
        let calls = Arc::new(AtomicU32::new(0));
        let provider = CountingProvider {
            calls: calls.clone(),
            verdicts: vec![EnforcementVerdict::block("secrets", "credential detected")],
        };
        let gw = ToolGateway::new(Budget::unlimited()).with_enforcement(Box::new(provider));

        let decision = gw.evaluate("bash", &params(&[("command", "env".into())]));
        assert!(!decision.allowed);
        assert_eq!(decision.gate, DecidingGate::Enforcement("secrets".into()));
        assert_eq!(decision.gate.to_string(), "enforcement:secrets");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_blocking_verdicts_become_warnings() {
        let provider = CountingProvider {
            calls: Arc::new(AtomicU32::new(0)),
            verdicts: vec![EnforcementVerdict::warn("style", "verbose command")],
        };
        let gw = ToolGateway::new(Budget::unlimited()).with_enforcement(Box::new(provider));

        let decision = gw.evaluate("bash", &params(&[]));
        assert!(decision.allowed);
        assert_eq!(decision.warnings.len(), 1);
        assert!(decision.warnings[0].contains("style"));
    }

    #[test]
    fn idempotency_hit_replays_result() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut gw = ToolGateway::new(Budget::unlimited()).with_clock(clock.clone());
        let p = params(&[("query", "foo".into())]);

        gw.record_call("search", &p, serde_json::json!({"hits": 3}), 50, Some(100));

        let decision = gw.evaluate("search", &p);
        assert!(decision.allowed);
        assert!(decision.idempotency_hit);
        assert_eq!(decision.cached_result, Some(serde_json::json!({"hits": 3})));
    }

    #[test]
    fn idempotency_key_order_does_not_matter() {
        let mut gw = ToolGateway::new(Budget::unlimited());
        let p1 = params(&[("a", 1.0.into()), ("b", 2.0.into())]);
        let p2 = params(&[("b", 2.0.into()), ("a", 1.0.into())]);
        gw.record_call("t", &p1, serde_json::json!(1), 10, None);
        assert!(gw.evaluate("t", &p2).idempotency_hit);
    }

    #[test]
    fn idempotency_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let mut gw = ToolGateway::new(Budget::unlimited())
            .with_clock(clock.clone())
            .with_config(GatewayConfig {
                idempotency_ttl_ms: 1_000,
                ..GatewayConfig::default()
            });
        let p = params(&[("q", "x".into())]);
        gw.record_call("search", &p, serde_json::json!(null), 10, None);

        clock.advance(999);
        assert!(gw.evaluate("search", &p).idempotency_hit);

        clock.advance(2);
        assert!(!gw.evaluate("search", &p).idempotency_hit);
    }

    #[test]
    fn idempotency_hit_skips_enforcement() {
        let calls = Arc::new(AtomicU32::new(0));
        let provider = CountingProvider {
            calls: calls.clone(),
            verdicts: vec![],
        };
        let clock = Arc::new(ManualClock::new(0));
        let mut gw = ToolGateway::new(Budget::unlimited())
            .with_clock(clock)
            .with_enforcement(Box::new(provider));
        let p = params(&[("q", "x".into())]);

        gw.evaluate("search", &p);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gw.record_call("search", &p, serde_json::json!(1), 10, None);
        let decision = gw.evaluate("search", &p);
        assert!(decision.idempotency_hit);
        // Hit must not re-invoke the enforcement collaborator.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn record_call_charges_all_dimensions() {
        let mut gw = ToolGateway::new(Budget::unlimited()).with_config(GatewayConfig {
            idempotency_ttl_ms: 300_000,
            usd_per_1k_tokens: 0.01,
            usd_per_tool_call: Some(0.001),
        });
        let p = params(&[("q", "x".into())]);
        let result = serde_json::json!({"data": "abc"});
        let result_size = result.to_string().len() as u64;

        gw.record_call("search", &p, result, 120, Some(2_000));

        let budget = gw.budget();
        assert_eq!(budget.tool_calls.used, 1);
        assert_eq!(budget.time_ms.used, 120);
        assert_eq!(budget.tokens.used, 2_000);
        assert_eq!(budget.storage_bytes.used, result_size);
        assert!((budget.cost_usd.used - 0.021).abs() < 1e-9);
    }

    #[test]
    fn tokens_not_charged_when_absent() {
        let mut gw = ToolGateway::new(Budget::unlimited());
        gw.record_call("t", &params(&[]), serde_json::json!(null), 10, None);
        assert_eq!(gw.budget().tokens.used, 0);
    }

    #[test]
    fn budget_getter_is_defensive_copy() {
        let gw = ToolGateway::new(Budget::unlimited());
        let mut copy = gw.budget();
        copy.tokens.add(9_999);
        assert_eq!(gw.budget().tokens.used, 0);
    }

    #[test]
    fn reset_budget_zeroes_usage_keeps_limits() {
        let mut gw = ToolGateway::new(Budget {
            tokens: Meter::limited(1_000),
            ..Budget::unlimited()
        });
        gw.record_call("t", &params(&[]), serde_json::json!(null), 10, Some(500));
        gw.reset_budget();
        let budget = gw.budget();
        assert_eq!(budget.tokens.used, 0);
        assert_eq!(budget.tokens.limit, Some(1_000));
    }

    #[test]
    fn duplicate_schema_rejected() {
        let mut gw = ToolGateway::new(Budget::unlimited());
        gw.register_schema(ToolSchema::new("search")).unwrap();
        assert!(matches!(
            gw.register_schema(ToolSchema::new("search")),
            Err(GatewayError::DuplicateSchema(_))
        ));
    }
}
