use colored::Colorize;
use stackflow_compose::{ExecutionPlan, RunMode};
use stackflow_core::ComposeConfig;

pub fn validate(config: &ComposeConfig) -> anyhow::Result<()> {
    println!("{}", "✓ All good!".green().bold());
    println!();
    println!("Summary:");
    println!("  Flows: {}", config.flows.len());
    for (name, flow) in &config.flows {
        println!(
            "    - {} (order {}, {} stack(s))",
            name.cyan(),
            flow.order,
            flow.stacks.len()
        );
    }
    if !config.vars.is_empty() {
        println!("  Vars: {}", config.vars.len());
    }
    Ok(())
}

pub fn visualize(config: &ComposeConfig) -> anyhow::Result<()> {
    let plan = ExecutionPlan::new(config, RunMode::Deploy);
    print!("{}", plan.visualize());
    Ok(())
}

pub fn generate() -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(&ComposeConfig::sample())?;
    print!("{yaml}");
    Ok(())
}
