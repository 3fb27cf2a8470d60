//! Declarative raw-property mapping
//!
//! A [`PropertyMapper`] is an ordered table of rules, one per raw key.
//! Applying it walks the raw mapping in its own key order and, per key:
//!
//! - **custom**: calls the rule's setter with the raw value; the setter may
//!   write any number of fields on the target
//! - **ignore**: drops the key
//! - **copy** (or no rule at all): hands the value to the target's
//!   [`PropertySink::set_property`] under the destination key
//!
//! Unmatched keys fall through to `set_property` under their own name, so
//! raw fields this crate does not know about survive into metadata.

use crate::RawDescription;
use serde_json::Value;
use svcmodel_common::Result;

/// Receives copied and unmapped raw properties
pub trait PropertySink {
    fn set_property(&mut self, name: &str, value: &Value);
}

/// Custom handler invoked with the raw value of its key
pub type Setter<S> = fn(&mut S, &Value) -> Result<()>;

enum RuleAction<S> {
    Copy { to: &'static str },
    Custom(Setter<S>),
    Ignore,
}

struct PropertyRule<S> {
    source: &'static str,
    action: RuleAction<S>,
}

/// Ordered rule table applied to a raw mapping
pub struct PropertyMapper<S> {
    rules: Vec<PropertyRule<S>>,
}

impl<S: PropertySink> Default for PropertyMapper<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PropertySink> PropertyMapper<S> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Copy `name` verbatim
    pub fn property(self, name: &'static str) -> Self {
        self.rename(name, name)
    }

    /// Copy the raw `from` key under the destination key `to`
    pub fn rename(mut self, from: &'static str, to: &'static str) -> Self {
        self.rules.push(PropertyRule {
            source: from,
            action: RuleAction::Copy { to },
        });
        self
    }

    /// Hand the raw `from` value to `setter`
    pub fn custom(mut self, from: &'static str, setter: Setter<S>) -> Self {
        self.rules.push(PropertyRule {
            source: from,
            action: RuleAction::Custom(setter),
        });
        self
    }

    /// Drop each of `names`
    pub fn ignore(mut self, names: &[&'static str]) -> Self {
        for &name in names {
            self.rules.push(PropertyRule {
                source: name,
                action: RuleAction::Ignore,
            });
        }
        self
    }

    fn find(&self, name: &str) -> Option<&PropertyRule<S>> {
        self.rules.iter().find(|rule| rule.source == name)
    }

    /// Apply the rules to every key of `raw`, in raw order
    pub fn apply(&self, raw: &RawDescription, sink: &mut S) -> Result<()> {
        for (key, value) in raw {
            match self.find(key).map(|rule| &rule.action) {
                Some(RuleAction::Custom(setter)) => setter(sink, value)?,
                Some(RuleAction::Ignore) => {}
                Some(RuleAction::Copy { to }) => sink.set_property(to, value),
                None => sink.set_property(key, value),
            }
        }
        Ok(())
    }
}
