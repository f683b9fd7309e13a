// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-test rule table and alias store

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use reqwest::Method;
use tokio::sync::watch;
use tracing::debug;

use super::exchange::InterceptedExchange;
use super::rule::{InterceptionRule, MockResponse, RouteHandle, RuleId, RulePrecedence};

/// Default number of exchanges kept per alias
pub const DEFAULT_MAX_EXCHANGES_PER_ALIAS: usize = 100;

const MAX_HISTORY: usize = 1000;

/// Outcome of matching one request against the rule table
#[derive(Debug, Clone, Default)]
pub struct RuleMatch {
    /// Mock chosen by precedence, if any matching rule carries one
    pub responder: Option<(RuleId, MockResponse)>,
    /// Every matching aliased rule, in registration order
    pub aliases: Vec<(RuleId, String)>,
    /// Every matching rule
    pub matched: Vec<RuleId>,
}

impl RuleMatch {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Rules and captured exchanges for one test context
///
/// Captures bump a `watch` counter so waiting accessors wake without polling.
pub struct AliasRegistry {
    rules: RwLock<Vec<InterceptionRule>>,
    exchanges: DashMap<String, VecDeque<InterceptedExchange>>,
    history: RwLock<VecDeque<InterceptedExchange>>,
    sequence: AtomicU64,
    max_per_alias: usize,
    signal: watch::Sender<u64>,
}

impl AliasRegistry {
    pub fn new(max_per_alias: usize) -> Self {
        let (signal, _) = watch::channel(0);
        Self {
            rules: RwLock::new(Vec::new()),
            exchanges: DashMap::new(),
            history: RwLock::new(VecDeque::new()),
            sequence: AtomicU64::new(0),
            max_per_alias: max_per_alias.max(1),
            signal,
        }
    }

    /// Install a rule after all existing ones
    pub fn add_rule(&self, rule: InterceptionRule) -> RouteHandle {
        let handle = RouteHandle {
            rule_id: rule.id,
            alias: rule.alias.clone(),
            pattern: rule.pattern.to_string(),
        };
        self.rules.write().push(rule);
        handle
    }

    pub fn remove_rule(&self, id: RuleId) -> bool {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        rules.len() != before
    }

    /// Snapshot of the rule table in registration order
    pub fn rules(&self) -> Vec<InterceptionRule> {
        self.rules.read().clone()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.read().len()
    }

    /// Match a request and count it against every matching rule
    pub fn claim(&self, method: &Method, url: &str, precedence: RulePrecedence) -> RuleMatch {
        let mut rules = self.rules.write();
        let mut result = RuleMatch::default();

        for rule in rules.iter_mut().filter(|r| r.matches(method, url)) {
            rule.matched += 1;
            result.matched.push(rule.id);
            if let Some(ref alias) = rule.alias {
                result.aliases.push((rule.id, alias.clone()));
            }
            if let Some(ref mock) = rule.mock {
                let replace = match precedence {
                    RulePrecedence::LastRegistered => true,
                    RulePrecedence::FirstRegistered => result.responder.is_none(),
                };
                if replace {
                    result.responder = Some((rule.id, mock.clone()));
                }
            }
        }

        if !result.is_empty() {
            debug!(
                method = %method,
                url,
                matched = result.matched.len(),
                responder = ?result.responder.as_ref().map(|(id, _)| *id),
                "request matched interception rules"
            );
        }
        result
    }

    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store a completed exchange under each alias and wake waiters
    pub fn record(&self, exchange: InterceptedExchange, aliases: &[(RuleId, String)]) {
        for (rule_id, alias) in aliases {
            let mut copy = exchange.clone();
            copy.alias = Some(alias.clone());
            copy.rule_id = Some(*rule_id);

            let mut entry = self.exchanges.entry(alias.clone()).or_default();
            if entry.len() >= self.max_per_alias {
                entry.pop_front();
            }
            entry.push_back(copy);
            debug!(alias = %alias, sequence = exchange.sequence, "exchange captured");
        }

        {
            let mut history = self.history.write();
            if history.len() >= MAX_HISTORY {
                history.pop_front();
            }
            history.push_back(exchange);
        }

        self.signal.send_modify(|v| *v += 1);
    }

    /// Most recent exchange recorded under `alias`
    pub fn latest(&self, alias: &str) -> Option<InterceptedExchange> {
        self.exchanges
            .get(alias)
            .and_then(|entries| entries.back().cloned())
    }

    /// All retained exchanges for `alias`, oldest first
    pub fn all(&self, alias: &str) -> Vec<InterceptedExchange> {
        self.exchanges
            .get(alias)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, alias: &str) -> usize {
        self.exchanges.get(alias).map(|e| e.len()).unwrap_or(0)
    }

    /// Every captured exchange, aliased or not
    pub fn history(&self) -> Vec<InterceptedExchange> {
        self.history.read().iter().cloned().collect()
    }

    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.exchanges.iter().map(|e| e.key().clone()).collect();
        aliases.sort();
        aliases
    }

    /// Change signal bumped on every capture
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.signal.subscribe()
    }

    /// Drop all rules and exchanges
    pub fn clear(&self) {
        self.rules.write().clear();
        self.exchanges.clear();
        self.history.write().clear();
        self.signal.send_modify(|v| *v += 1);
    }
}

impl Default for AliasRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXCHANGES_PER_ALIAS)
    }
}

impl std::fmt::Debug for AliasRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasRegistry")
            .field("rules", &self.rule_count())
            .field("aliases", &self.aliases())
            .finish()
    }
}
