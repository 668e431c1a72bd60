use crate::cli_args::TreeArgs;
use crate::output::write_to_stdout;
use crate::prepare_scan;
use anyhow::{Context, Result};
use ctxl_core as core;

pub fn handle_tree_command(args: TreeArgs) -> Result<()> {
    let setup = prepare_scan(&args.selection)?;
    let tree = core::render_tree(
        &setup.project_root,
        &setup.rules,
        &setup.ignore_file,
        setup.include_dotfiles,
    )
    .context("Failed to render directory tree")?;
    write_to_stdout(&tree)
}
