//! Compose configuration

use super::flow::Flow;
use super::stack::Stack;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Upper bound on flows inside one compose file
pub const MAX_FLOWS: usize = 15;

/// The top-level compose document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeConfig {
    #[serde(default)]
    pub description: String,

    /// Declared variables, already resolved and overlaid by the environment
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,

    /// Flows keyed by name
    #[serde(default)]
    pub flows: BTreeMap<String, Flow>,
}

impl ComposeConfig {
    /// Copy every flow's map key into its `name` field.
    pub fn assign_flow_names(&mut self) {
        for (name, flow) in self.flows.iter_mut() {
            flow.name = name.clone();
        }
    }

    /// Validate flow count, every flow, and stack name uniqueness.
    pub fn validate(&self) -> Result<()> {
        let count = self.flows.len();
        if count == 0 || count > MAX_FLOWS {
            return Err(FlowError::FlowCount {
                count,
                max: MAX_FLOWS,
            });
        }

        for flow in self.flows.values() {
            flow.validate()?;
        }

        // Stack names are unique across the whole file
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for flow in self.flows.values() {
            for stack in &flow.stacks {
                if let Some(first) = owners.insert(&stack.stack_name, &flow.name) {
                    return Err(FlowError::DuplicateStackName {
                        stack: stack.stack_name.clone(),
                        flows: vec![first.to_string(), flow.name.clone()],
                    });
                }
            }
        }

        Ok(())
    }

    /// Total number of stacks across all flows
    pub fn stack_count(&self) -> usize {
        self.flows.values().map(|f| f.stacks.len()).sum()
    }

    /// A bootstrap compose document for `config generate`
    pub fn sample() -> Self {
        let env_tags = || {
            BTreeMap::from([
                ("EnvironmentName".to_string(), "{{ ENV_NAME }}".to_string()),
                ("EnvironmentType".to_string(), "{{ ENV_TYPE }}".to_string()),
            ])
        };

        let mut security_group = Stack::new("sample-{{ ENV_NAME }}-security-group")
            .with_template_file("sg.yml")
            .with_parameter("VpcId", "{{ VPC_ID }}");
        security_group.parameters.extend(env_tags());
        security_group.tags = env_tags();

        let mut instance = Stack::new("sample-{{ ENV_NAME }}-ec2-instance")
            .with_template_file("ec2.yml")
            .with_parameter("SubnetId", "{{ SUBNET_ID }}");
        instance.parameters.extend(env_tags());
        instance.tags = env_tags();

        let mut flows = BTreeMap::new();
        flows.insert(
            "SecurityGroup".to_string(),
            Flow {
                name: "SecurityGroup".to_string(),
                description: "Creates sample security group".to_string(),
                order: 0,
                stacks: vec![security_group],
            },
        );
        flows.insert(
            "EC2Instance".to_string(),
            Flow {
                name: "EC2Instance".to_string(),
                description: "Creates EC2 instance".to_string(),
                order: 1,
                stacks: vec![instance],
            },
        );

        Self {
            description: "Sample stackflow compose file".to_string(),
            vars: BTreeMap::from([
                ("ENV_NAME".to_string(), "stackflow".to_string()),
                ("ENV_TYPE".to_string(), "nonproduction".to_string()),
                ("VPC_ID".to_string(), String::new()),
                ("SUBNET_ID".to_string(), String::new()),
            ]),
            flows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MAX_STACKS_PER_FLOW;

    fn config_with(flow_count: usize, stacks_per_flow: usize, order: i64) -> ComposeConfig {
        let mut config = ComposeConfig::default();
        for f in 0..flow_count {
            let stacks = (0..stacks_per_flow)
                .map(|s| Stack::new(format!("f{f}-s{s}")).with_template_file("t.yml"))
                .collect();
            config
                .flows
                .insert(format!("flow-{f}"), Flow::new("", order, stacks));
        }
        config.assign_flow_names();
        config
    }

    #[test]
    fn test_validate_within_bounds() {
        for (flows, stacks, order) in [
            (1, 1, 0),
            (MAX_FLOWS, 1, 100),
            (3, MAX_STACKS_PER_FLOW, 50),
        ] {
            assert!(
                config_with(flows, stacks, order).validate().is_ok(),
                "flows={flows} stacks={stacks} order={order}"
            );
        }
    }

    #[test]
    fn test_validate_outside_bounds() {
        assert!(matches!(
            config_with(0, 1, 0).validate(),
            Err(FlowError::FlowCount { count: 0, .. })
        ));
        assert!(matches!(
            config_with(MAX_FLOWS + 1, 1, 0).validate(),
            Err(FlowError::FlowCount { .. })
        ));
        assert!(matches!(
            config_with(1, 0, 0).validate(),
            Err(FlowError::StackCount { .. })
        ));
        assert!(matches!(
            config_with(1, MAX_STACKS_PER_FLOW + 1, 0).validate(),
            Err(FlowError::StackCount { .. })
        ));
        assert!(matches!(
            config_with(2, 1, 101).validate(),
            Err(FlowError::OrderOutOfRange { .. })
        ));
        assert!(matches!(
            config_with(2, 1, -3).validate(),
            Err(FlowError::OrderOutOfRange { .. })
        ));
    }

    #[test]
    fn test_assign_flow_names() {
        let config = config_with(2, 1, 0);
        for (key, flow) in &config.flows {
            assert_eq!(key, &flow.name);
        }
    }

    #[test]
    fn test_duplicate_stack_name_within_flow() {
        let mut config = ComposeConfig::default();
        config.flows.insert(
            "net".to_string(),
            Flow::new(
                "net",
                0,
                vec![
                    Stack::new("vpc").with_template_file("vpc.yml"),
                    Stack::new("vpc").with_template_file("vpc-2.yml"),
                ],
            ),
        );

        let err = config.validate().unwrap_err();
        assert!(matches!(
            &err,
            FlowError::DuplicateStackName { stack, flows }
                if stack == "vpc" && flows == &["net".to_string(), "net".to_string()]
        ));
    }

    #[test]
    fn test_duplicate_stack_name_across_flows() {
        let mut config = ComposeConfig::default();
        for name in ["a", "b"] {
            config.flows.insert(
                name.to_string(),
                Flow::new(name, 0, vec![Stack::new("shared").with_template_file("t.yml")]),
            );
        }

        let err = config.validate().unwrap_err();
        assert!(matches!(
            &err,
            FlowError::DuplicateStackName { stack, flows }
                if stack == "shared" && flows == &["a".to_string(), "b".to_string()]
        ));
        assert!(err.to_string().contains("flows: a, b"));
    }

    #[test]
    fn test_sample_is_valid_and_serializable() {
        let sample = ComposeConfig::sample();
        assert!(sample.validate().is_ok());
        assert_eq!(sample.stack_count(), 2);

        let yaml = serde_yaml::to_string(&sample).unwrap();
        assert!(yaml.contains("SecurityGroup"));
        assert!(yaml.contains("template_file: sg.yml"));
        // name is carried by the map key only
        assert!(!yaml.contains("name: SecurityGroup"));
    }
}
