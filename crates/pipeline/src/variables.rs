//! Template variables derived from an investigation config.

use std::collections::BTreeMap;

use hunt_core::InvestigationConfig;
use serde_yaml::Value;

/// Spellings treated as the same variable. When only one side is present
/// the other is filled with its value; an existing key is never overwritten.
pub const ALIASES: &[(&str, &str)] = &[("device_name", "devicename"), ("user_name", "username")];

/// The config's mapping plus alias fill-ins.
pub fn template_variables(config: &InvestigationConfig) -> BTreeMap<String, Value> {
    let mut vars = config.as_map().clone();
    for (a, b) in ALIASES {
        match (vars.get(*a).cloned(), vars.get(*b).cloned()) {
            (Some(value), None) => {
                vars.insert((*b).to_string(), value);
            }
            (None, Some(value)) => {
                vars.insert((*a).to_string(), value);
            }
            _ => {}
        }
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> InvestigationConfig {
        InvestigationConfig::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }

    #[test]
    fn fills_missing_alias_both_ways() {
        let vars = template_variables(&config(&[("device_name", "HOST-1"), ("username", "alice")]));
        assert_eq!(vars["devicename"], Value::String("HOST-1".into()));
        assert_eq!(vars["user_name"], Value::String("alice".into()));
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn never_overwrites_existing_keys() {
        let vars = template_variables(&config(&[("device_name", "A"), ("devicename", "B")]));
        assert_eq!(vars["device_name"], Value::String("A".into()));
        assert_eq!(vars["devicename"], Value::String("B".into()));
    }

    #[test]
    fn unrelated_keys_pass_through() {
        let vars = template_variables(&config(&[("case_id", "IR-1")]));
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["case_id"], Value::String("IR-1".into()));
    }
}
