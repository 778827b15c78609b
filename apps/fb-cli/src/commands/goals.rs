// goals.rs — Goal subcommands: select, add, toggle, show, resolve, inspect, reset, override.

use clap::Subcommand;
use fb_goal::{ForecastGoal, GoalSelection, PropagationReport, SelectionStore, UnknownGoal};

use super::{open_bridge, open_store};
use crate::config::{WizardConfig, WizardSettings};

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Replace the selection (first goal is primary).
    Select {
        #[arg(required = true, value_parser = parse_goal)]
        goals: Vec<ForecastGoal>,
    },
    /// Append a goal to the current selection.
    Add {
        #[arg(value_parser = parse_goal)]
        goal: ForecastGoal,
    },
    /// Add a goal if absent, remove it if present.
    Toggle {
        #[arg(value_parser = parse_goal)]
        goal: ForecastGoal,
    },
    /// Show the current selection.
    Show,
    /// Resolve the selection from persisted tiers only, as a fresh screen would.
    Resolve {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Dump every tier's raw contents.
    Inspect,
    /// Clear the selection everywhere.
    Reset,
    /// Manage the diagnostics-only override goal.
    Override {
        #[command(subcommand)]
        command: OverrideCommands,
    },
    /// List the goals that can be selected.
    List,
}

#[derive(Subcommand)]
pub enum OverrideCommands {
    /// Set the override goal.
    Set {
        #[arg(value_parser = parse_goal)]
        goal: ForecastGoal,
    },
    /// Remove the override goal.
    Clear,
}

fn parse_goal(s: &str) -> Result<ForecastGoal, UnknownGoal> {
    s.parse()
}

pub fn execute(
    cmd: &GoalCommands,
    config: &WizardConfig,
    settings: &WizardSettings,
) -> anyhow::Result<()> {
    match cmd {
        GoalCommands::Select { goals } => {
            let mut store = open_store(config, settings)?;
            let report = store.write(GoalSelection::new(goals.iter().copied()));
            print_written(&store, report);
            Ok(())
        }
        GoalCommands::Add { goal } => {
            let goal = *goal;
            let mut store = open_store(config, settings)?;
            let report = store.update(move |prev| prev.with_appended(goal));
            print_written(&store, report);
            Ok(())
        }
        GoalCommands::Toggle { goal } => {
            let goal = *goal;
            let mut store = open_store(config, settings)?;
            let report = store.update(move |prev| prev.toggled(goal));
            print_written(&store, report);
            Ok(())
        }
        GoalCommands::Show => {
            let store = open_store(config, settings)?;
            print_selection(&store.read());
            Ok(())
        }
        GoalCommands::Resolve { json } => {
            let resolved = open_bridge(config, settings)?.resolve_persisted();
            if *json {
                println!("{}", serde_json::to_string(&resolved.selection)?);
            } else {
                println!("Selection: {}", resolved.selection);
                println!("  Primary: {}", resolved.selection.primary_label());
                println!("  Tier:    {}", resolved.tier);
            }
            Ok(())
        }
        GoalCommands::Inspect => {
            let store = open_store(config, settings)?;
            let snapshot = store.bridge().inspect(&store.read());
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        GoalCommands::Reset => {
            let mut store = open_store(config, settings)?;
            let report = store.reset();
            println!("Selection cleared.");
            warn_partial(&report);
            Ok(())
        }
        GoalCommands::Override { command } => {
            let bridge = open_bridge(config, settings)?;
            let channel = bridge.debug_override();
            match command {
                OverrideCommands::Set { goal } => {
                    channel.set(bridge.durable(), *goal)?;
                    println!("Debug override set: {}", goal);
                    if !channel.is_enabled() {
                        println!("  (override reads are disabled in this configuration)");
                    }
                }
                OverrideCommands::Clear => {
                    if channel.clear(bridge.durable())? {
                        println!("Debug override cleared.");
                    } else {
                        println!("No debug override set.");
                    }
                }
            }
            Ok(())
        }
        GoalCommands::List => {
            for goal in ForecastGoal::ALL {
                println!("{}", goal);
            }
            Ok(())
        }
    }
}

fn print_selection(selection: &GoalSelection) {
    println!("Selection: {}", selection);
    println!("  Primary: {}", selection.primary_label());
}

fn print_written(store: &SelectionStore, report: Option<PropagationReport>) {
    print_selection(&store.read());
    match report {
        Some(report) => warn_partial(&report),
        None => println!("  (empty selection, not persisted)"),
    }
}

fn warn_partial(report: &PropagationReport) {
    if !report.durable {
        eprintln!("warning: selection not saved to disk; it will be lost when this process exits");
    }
    if !report.fallback {
        eprintln!("warning: fallback copy of the selection could not be updated");
    }
}
