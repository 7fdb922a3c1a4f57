use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a pod to completion (or forever) against a configuration file.
    Run {
        #[arg(long, help = "Pod configuration file path (YAML or JSON)")]
        config: String,

        #[arg(
            long,
            default_value_t = -1,
            help = "Iterations to run before exiting; negative runs forever"
        )]
        max_loops: i64,

        #[arg(long, help = "Registry tag of the agent to host (see agents.rs)")]
        agent: String,
    },
    /// Validate a configuration file without starting any collaborator.
    Validate {
        #[arg(long, help = "Pod configuration file path (YAML or JSON)")]
        config: String,
    },
}
