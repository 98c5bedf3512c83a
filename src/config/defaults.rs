//! The built-in catalog, used when no configuration file is found.

use std::collections::BTreeMap;

use sidbroker_rules::{ActionRule, BatchSpec, JobRule, Tier};
use sidbroker_runner::PackageDefinition;

fn action(name: &str, label: &str, description: &str, tier: Tier, patterns: &[&str]) -> ActionRule {
    let mut rule = ActionRule::new(name, tier, patterns).with_label(label);
    rule.description = description.to_string();
    rule
}

pub fn actions() -> Vec<ActionRule> {
    vec![
        action("open", "Open", "Opens the scene", Tier::Engine, &["*/A/**", "*/S/**"])
            .with_engines(&["maya", "hou", "nk"]),
        action(
            "save_next_version_ma",
            "Save Next Version",
            "Saves the open scene as the next version",
            Tier::Engine,
            &["*/*/**/maya"],
        )
        .with_engines(&["maya"]),
        action(
            "save_next_version",
            "Save Next Version",
            "Saves the open scene as the next version",
            Tier::Engine,
            &["*/*/**/hou"],
        )
        .with_engines(&["hou"]),
        action(
            "build",
            "Build",
            "Build a new scene for this task/variant",
            Tier::Engine,
            &["*/A/*/*/*", "*/S/*/*/*/*"],
        )
        .with_engines(&["maya", "hou", "nk"]),
        action("play", "Play", "Launches a movie player", Tier::Global, &["*/*/**/movie"]),
        action(
            "create",
            "Create",
            "Creates a new Entity (Project, Asset or Shot)",
            Tier::Global,
            &["*", "*/A,S/*"],
        ),
        action(
            "edit",
            "Edit",
            "Edit the Entity",
            Tier::Global,
            &["*/A,S/*", "*/A,S/*/*", "*/A,S/*/*/*"],
        ),
        action("explore", "Explore", "Opens the file explorer", Tier::Universal, &[]),
    ]
}

pub fn jobs() -> Vec<JobRule> {
    let mut explore = JobRule::new("explore", "explore", &[JobRule::MATCH_ALL])
        .with_call("python.explore")
        .with_engines(&["all"]);
    explore.description = "Opens the file explorer".to_string();

    let mut play = JobRule::new("play", "play", &["*/*/**/movie"])
        .with_batch(BatchSpec::new("djv"))
        .with_engines(&["all"]);
    play.description = "Launches a movie player".to_string();

    vec![
        JobRule::new("open", "open_maya_scene", &["*/*/**/maya"])
            .with_call("maya.open")
            .with_requires(&["pipe_maya"])
            .with_engines(&["maya"]),
        JobRule::new("open", "open_hou_scene", &["*/*/**/hou"])
            .with_call("hou.open")
            .with_requires(&["pipe_houdini"])
            .with_engines(&["hou"]),
        explore,
        play,
    ]
}

/// Placeholder packages for the built-in jobs' requirements.
pub fn packages() -> BTreeMap<String, PackageDefinition> {
    ["pipe_maya", "pipe_houdini"]
        .into_iter()
        .map(|name| (name.to_string(), PackageDefinition::default()))
        .collect()
}
