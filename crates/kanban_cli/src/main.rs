//! CLI smoke entry point.
//!
//! Usage: `kanban_cli [DB_PATH]`. Without a path an in-memory board is used.
//! Set `KANBAN_LOG_DIR` (absolute path) to enable file logging.

use kanban_core::{KanbanContext, TagRepository, UserRepository, WorkItemRepository};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "KANBAN_LOG_DIR";

fn main() -> ExitCode {
    println!("kanban_core ping={}", kanban_core::ping());
    println!("kanban_core version={}", kanban_core::core_version());

    if let Some(log_dir) = std::env::var_os(LOG_DIR_ENV) {
        let level = kanban_core::default_log_level();
        if let Err(err) = kanban_core::init_logging(level.as_str(), &log_dir.to_string_lossy()) {
            eprintln!("kanban_cli logging disabled: {err}");
        }
    }

    match report_counts(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("kanban_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn report_counts(db_path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let context = match db_path.as_deref() {
        Some(path) => KanbanContext::open(path)?,
        None => KanbanContext::open_in_memory()?,
    };

    let tags = context.tags()?.read()?.len();
    let users = context.users()?.read()?.len();
    let items = context.work_items()?;
    let visible = items.read()?.len();
    let removed = items.read_removed()?.len();

    println!("tags={tags} users={users} work_items={visible} removed_work_items={removed}");
    Ok(())
}
