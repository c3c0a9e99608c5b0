use crate::RunArgs;
use colored::Colorize;
use stackflow_cloud::StackClient;
use stackflow_cloud_aws::CloudFormationClient;
use stackflow_compose::{
    Composer, ComposerOptions, ExecutionPlan, Reporter, RunMode, RunReport, worker_count,
};
use stackflow_core::ComposeConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Compose vars that configure the AWS client
const PROFILE_VAR: &str = "AWS_PROFILE";
const REGION_VAR: &str = "AWS_REGION";

pub async fn handle(
    config_path: &Path,
    config: &ComposeConfig,
    mode: RunMode,
    args: &RunArgs,
    progress: bool,
) -> anyhow::Result<()> {
    let plan = match args.flow.as_deref() {
        Some(name) => ExecutionPlan::cherry_pick(config, name, mode)?,
        None => ExecutionPlan::new(config, mode),
    };

    print_settings(config_path, mode, args, &plan);

    let profile = non_empty_var(config, PROFILE_VAR);
    let region = non_empty_var(config, REGION_VAR);
    let client = CloudFormationClient::from_env(profile, region).await;
    info!(region = client.region(), "CloudFormation client ready");
    let client: Arc<dyn StackClient> = Arc::new(client);

    let composer = Composer::new(
        client,
        Reporter::new(progress),
        ComposerOptions {
            dry_run: args.dry_run,
            workers: args.workers,
            ..Default::default()
        },
    );

    let report = composer.run(&plan).await?;
    print_report(mode, args.dry_run, &report);
    Ok(())
}

fn non_empty_var<'a>(config: &'a ComposeConfig, key: &str) -> Option<&'a str> {
    config
        .vars
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

fn print_settings(config_path: &Path, mode: RunMode, args: &RunArgs, plan: &ExecutionPlan) {
    println!("{}", "Run settings".bold());
    println!("  Config file: {}", config_path.display().to_string().cyan());
    println!(
        "  Flow:        {}",
        args.flow.as_deref().unwrap_or("(all)").cyan()
    );
    println!("  Mode:        {}", mode.to_string().cyan());
    println!("  Dry run:     {}", args.dry_run);
    println!(
        "  Workers:     {}",
        worker_count(plan.flow_count(), args.workers)
    );
    println!();
}

fn print_report(mode: RunMode, dry_run: bool, report: &RunReport) {
    println!();
    for flow in &report.flows {
        println!("{} (order {})", flow.flow.cyan().bold(), flow.order);
        for stack in &flow.stacks {
            println!("  {} {}: {}", "✓".green(), stack.stack, stack.outcome);
        }
    }

    let verb = if dry_run { "planned" } else { "finished" };
    println!();
    println!(
        "{}",
        format!(
            "{mode} {verb}: {} flow(s), {} stack(s)",
            report.flows.len(),
            report.stack_count()
        )
        .green()
        .bold()
    );
}
