//! Tasks: executions of a process or a single tool against a target.

use super::registry::{CommandSpec, Handler, OptionKind, OptionSpec};
use crate::model::{IntensityRank, TimeUnit};
use strum::VariantNames;

pub const TASKS: CommandSpec = CommandSpec {
    entity: "tasks",
    about: "Manage tasks",
    verbs: &["get", "create", "cancel", "repeat"],
    handlers: &[
        ("get", Handler::GetEntity),
        ("create", Handler::PostEntity),
        ("cancel", Handler::DeleteEntity),
    ],
    default_handler: Some(Handler::ExtraAction),
    help: &[
        ("get", "Get all tasks or one if ID is provided"),
        ("create", "Create task"),
        ("cancel", "Cancel task execution"),
        ("repeat", "Repeat task execution"),
    ],
    options: &[
        OptionSpec::new("target_id", "target", "Target ID")
            .short('t')
            .kind(OptionKind::Integer)
            .required(),
        OptionSpec::new("process_id", "process", "Process ID")
            .short('p')
            .kind(OptionKind::Integer)
            .omit_if_absent(),
        OptionSpec::new("tool_id", "tool", "Tool ID")
            .kind(OptionKind::Integer)
            .omit_if_absent(),
        OptionSpec::new("configuration_id", "configuration", "Configuration ID")
            .short('c')
            .kind(OptionKind::Integer)
            .omit_if_absent(),
        OptionSpec::new("intensity_rank", "intensity", "Intensity rank")
            .short('i')
            .kind(OptionKind::Choice(IntensityRank::VARIANTS))
            .default_value("Normal"),
        OptionSpec::new(
            "scheduled_at",
            "scheduled-at",
            "Exact time to schedule the task at, in ISO 8601 format",
        ),
        OptionSpec::new("scheduled_in", "scheduled-in", "Schedule task to some time later")
            .kind(OptionKind::Integer),
        OptionSpec::new(
            "scheduled_time_unit",
            "scheduled-time-unit",
            "Time unit to apply in scheduling",
        )
        .kind(OptionKind::Choice(TimeUnit::VARIANTS)),
        OptionSpec::new("repeat_in", "repeat-in", "Repeat task periodically after some time")
            .kind(OptionKind::Integer),
        OptionSpec::new(
            "repeat_time_unit",
            "repeat-time-unit",
            "Time unit to apply in repeating",
        )
        .kind(OptionKind::Choice(TimeUnit::VARIANTS)),
        OptionSpec::new("wordlists", "wordlist", "Wordlist ID")
            .short('w')
            .kind(OptionKind::IntegerList),
    ],
};
