use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Path to the TOML config file (default: .ctxl/ctxl.toml under the project root).",
        value_name = "PATH",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,

    #[arg(
        long,
        help = "User preset file overlaid on the built-in presets (default: .ctxl/presets.yaml).",
        value_name = "PATH",
        help_heading = "Project Setup"
    )]
    pub preset_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionOpts {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        short = 'p',
        long = "preset",
        value_name = "NAME",
        value_delimiter = ',',
        help = "Apply a preset (repeatable or comma-delimited). Disables auto-detection.",
        help_heading = "Selection"
    )]
    pub presets: Vec<String>,

    #[arg(
        short = 'F',
        long,
        value_name = "PATTERNS",
        allow_hyphen_values = true,
        help = "Whitespace-separated globs; prefix with '!' to exclude (e.g. '*.rs !target').",
        help_heading = "Selection"
    )]
    pub filter: Option<String>,

    #[arg(
        long,
        help = "Include dotfiles and dot-directories.",
        help_heading = "Selection"
    )]
    pub include_dotfiles: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "Ignore file with one exclude glob per line (default: .gitignore).",
        help_heading = "Selection"
    )]
    pub ignore_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Do not detect project types when no preset is given.",
        help_heading = "Selection"
    )]
    pub no_auto_detect: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "ctxl",
    author,
    version,
    about = "Generate an XML snapshot of a project for AI models.",
    long_about = "ctxl walks a project directory, selects files through presets, filter patterns \nand the project's ignore file, and emits their contents together with a directory \ntree and a task description as one XML (or JSON/YAML) document.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  ctxl generate -p rust -t 'Review error handling' -o context.xml\n  ctxl generate -F '*.py !tests' -f json\n  ctxl tree --include-dotfiles\n  ctxl presets list",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Generate the project context document."
    )]
    Generate(GenerateArgs),

    #[command(about = "Print the directory tree of the selected files.")]
    Tree(TreeArgs),

    #[command(about = "Detect which presets match the project's files.")]
    Detect(DetectArgs),

    #[command(about = "Show, list or save the preset table.")]
    Presets(PresetsArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration, rules and planned file inclusions."
    )]
    Debug(DebugArgs),

    #[command(about = "Generate shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub selection: SelectionOpts,

    #[arg(
        short = 't',
        long,
        value_name = "TEXT",
        conflicts_with = "task_file",
        help = "Task description placed in the <task> element.",
        help_heading = "Output Control"
    )]
    pub task: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Read the task description from a file.",
        help_heading = "Output Control"
    )]
    pub task_file: Option<PathBuf>,

    #[arg(short = 'f', long, help = "Set the output format.", value_name = "FORMAT", value_parser = ["xml", "json", "yaml"], help_heading = "Output Control")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Disable indentation between elements.",
        help_heading = "Output Control"
    )]
    pub compact: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "PATH",
        help = "Write the document to a file instead of standard output.",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[clap(flatten)]
    pub selection: SelectionOpts,
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
}

#[derive(Args, Debug, Clone)]
pub struct PresetsArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[command(subcommand)]
    pub action: PresetsAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PresetsAction {
    #[command(about = "Print the effective presets as YAML.")]
    Show,
    #[command(about = "List the effective presets as a table.")]
    List,
    #[command(about = "Write the built-in presets to the user preset file.")]
    Save {
        #[arg(long, help = "Overwrite an existing preset file.")]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub selection: SelectionOpts,

    #[arg(short = 'f', long, help = "Print structured output instead of text.", value_name = "FORMAT", value_parser = ["json", "yaml"])]
    pub format: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
}
