//! taskdeck CLI library
//!
//! Command definitions and the dispatch loop, kept out of `main` so they
//! can be exercised against an in-memory store in tests. All printing goes
//! through an injected writer.

pub mod logging;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use taskdeck_core::{
    Category, CreateCategoryRequest, CreateTaskRequest, CsvExporter, CsvImporter, Result, Task,
    TaskFilterBuilder, TaskFilters, TaskRepository, TaskdeckError,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(about = "Personal task tracker with CSV import/export")]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the user data directory)
    #[arg(long, short)]
    pub database: Option<PathBuf>,

    /// Owner profile to act as (defaults to the single-user profile)
    #[arg(long, env = "TASKDECK_OWNER")]
    pub owner: Option<Uuid>,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Category name; created on first use
        #[arg(long)]
        category: Option<String>,
    },
    /// List tasks, newest first, with due-status markers
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Flip a task between completed and incomplete
    Toggle {
        /// Task id
        id: Uuid,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: Uuid,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Export tasks to a CSV file
    Export {
        /// Output path; defaults to tasks_<timestamp>.csv in the current directory
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Import tasks from a CSV file (.csv or .txt, at most 2 MB)
    Import {
        /// File to import
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum CategoryCommand {
    /// List categories with task counts
    List,
    /// Add a category
    Add {
        /// Category name
        name: String,
        /// Hex color, e.g. #FF8800
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category; its tasks are kept and detached
    Delete {
        /// Category id
        id: Uuid,
    },
}

/// Task filter options shared by `list` and `export`
#[derive(Args, Debug, Default, PartialEq)]
pub struct FilterArgs {
    /// Filter by category name (exact match)
    #[arg(long)]
    pub category: Option<String>,

    /// Only completed tasks
    #[arg(long, conflicts_with = "incomplete")]
    pub completed: bool,

    /// Only incomplete tasks
    #[arg(long)]
    pub incomplete: bool,

    /// Only tasks created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only tasks created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    /// Resolve CLI arguments into filter criteria
    ///
    /// # Errors
    ///
    /// Returns a validation error if the named category does not exist for
    /// `owner`.
    pub async fn resolve(&self, repo: &dyn TaskRepository, owner: Uuid) -> Result<TaskFilters> {
        let mut builder = TaskFilterBuilder::new().created_range(self.from, self.to);

        if self.completed {
            builder = builder.completed(true);
        } else if self.incomplete {
            builder = builder.completed(false);
        }

        if let Some(name) = &self.category {
            let category = repo
                .list_categories(owner)
                .await?
                .into_iter()
                .find(|c| &c.name == name)
                .ok_or_else(|| {
                    TaskdeckError::validation(format!("unknown category: {name}"))
                })?;
            builder = builder.category(category.id);
        }

        Ok(builder.build())
    }
}

/// Execute a parsed command against the repository, writing output to `out`
///
/// # Errors
///
/// Propagates repository, pipeline, and IO errors to the caller.
pub async fn run<W: Write>(
    command: Commands,
    repo: &dyn TaskRepository,
    owner: Uuid,
    out: &mut W,
) -> Result<()> {
    debug!("Executing {command:?} as owner {owner}");
    match command {
        Commands::Add {
            title,
            description,
            due,
            category,
        } => {
            let category_id = match category {
                Some(name) => Some(repo.find_or_create_category(owner, &name).await?.id),
                None => None,
            };
            let task = repo
                .create_task(
                    owner,
                    CreateTaskRequest {
                        title,
                        description,
                        completed: None,
                        due_date: due,
                        category_id,
                    },
                )
                .await?;
            writeln!(out, "Created task {}", task.id)?;
        }
        Commands::List { filters, json } => {
            let filters = filters.resolve(repo, owner).await?;
            let tasks = repo.find_tasks(owner, &filters).await?;
            let today = Local::now().date_naive();
            if json {
                print_tasks_json(&tasks, today, out)?;
            } else {
                print_tasks(&tasks, today, out)?;
            }
        }
        Commands::Toggle { id } => {
            let task = repo.toggle_task(owner, id).await?;
            let state = if task.completed {
                "completed"
            } else {
                "incomplete"
            };
            writeln!(out, "Task {} is now {state}", task.id)?;
        }
        Commands::Delete { id } => {
            repo.delete_task(owner, id).await?;
            writeln!(out, "Deleted task {id}")?;
        }
        Commands::Category { command } => match command {
            CategoryCommand::List => {
                let categories = repo.list_categories(owner).await?;
                print_categories(&categories, out)?;
            }
            CategoryCommand::Add { name, color } => {
                let category = repo
                    .create_category(owner, CreateCategoryRequest { name, color })
                    .await?;
                writeln!(out, "Created category {} ({})", category.name, category.id)?;
            }
            CategoryCommand::Delete { id } => {
                repo.delete_category(owner, id).await?;
                writeln!(out, "Deleted category {id}")?;
            }
        },
        Commands::Export { output, filters } => {
            let filters = filters.resolve(repo, owner).await?;
            let path =
                output.unwrap_or_else(|| PathBuf::from(CsvExporter::filename(Local::now())));
            let file = std::fs::File::create(&path)?;
            let written = CsvExporter::new().export(repo, owner, &filters, file).await?;
            writeln!(out, "Exported {written} tasks to {}", path.display())?;
        }
        Commands::Import { file } => {
            let summary = CsvImporter::new().import_file(repo, owner, &file).await?;
            writeln!(out, "Successfully imported {} tasks.", summary.imported)?;
            for error in &summary.errors {
                writeln!(out, "{error}")?;
            }
        }
    }
    Ok(())
}

/// Print tasks to the given writer, one line each
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_tasks<W: Write>(tasks: &[Task], today: NaiveDate, writer: &mut W) -> Result<()> {
    if tasks.is_empty() {
        writeln!(writer, "No tasks found")?;
        return Ok(());
    }

    for task in tasks {
        let status = task.due_status(today);
        let check = if task.completed { "x" } else { " " };
        write!(writer, "[{check}] {}  {}", task.id, task.title)?;
        if let Some(due) = task.due_date {
            write!(writer, " (due {due})")?;
        }
        if status.overdue {
            write!(writer, " [OVERDUE]")?;
        } else if status.due_soon {
            write!(writer, " [DUE SOON]")?;
        }
        if let Some(name) = &task.category_name {
            write!(writer, " @{name}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Print tasks as JSON with their computed due status attached
fn print_tasks_json<W: Write>(tasks: &[Task], today: NaiveDate, writer: &mut W) -> Result<()> {
    let annotated: Vec<_> = tasks
        .iter()
        .map(|task| {
            let status = task.due_status(today);
            serde_json::json!({
                "task": task,
                "due_soon": status.due_soon,
                "overdue": status.overdue,
            })
        })
        .collect();
    writeln!(writer, "{}", serde_json::to_string_pretty(&annotated)?)?;
    Ok(())
}

/// Print categories to the given writer
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_categories<W: Write>(categories: &[Category], writer: &mut W) -> Result<()> {
    if categories.is_empty() {
        writeln!(writer, "No categories found")?;
        return Ok(());
    }

    for category in categories {
        writeln!(
            writer,
            "{}  {}  {} ({} tasks)",
            category.id, category.color, category.name, category.task_count
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use taskdeck_core::test_utils::{create_test_store, seed_mock_data};

    async fn run_to_string(
        command: Commands,
        repo: &dyn TaskRepository,
        owner: Uuid,
    ) -> String {
        let mut out = Cursor::new(Vec::new());
        run(command, repo, owner, &mut out).await.unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_cli_parses_list_with_filters() {
        let cli = Cli::try_parse_from([
            "taskdeck", "list", "--category", "Work", "--incomplete", "--from", "2024-01-01",
        ])
        .unwrap();

        match cli.command {
            Commands::List { filters, json } => {
                assert_eq!(filters.category.as_deref(), Some("Work"));
                assert!(filters.incomplete);
                assert!(!filters.completed);
                assert_eq!(filters.from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert!(!json);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_cli_rejects_conflicting_completion_flags() {
        assert!(Cli::try_parse_from(["taskdeck", "list", "--completed", "--incomplete"]).is_err());
    }

    #[test]
    fn test_cli_parses_import_and_export() {
        let cli = Cli::try_parse_from(["taskdeck", "import", "tasks.csv"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Import {
                file: PathBuf::from("tasks.csv")
            }
        );

        let cli = Cli::try_parse_from(["taskdeck", "export", "-o", "out.csv"]).unwrap();
        match cli.command {
            Commands::Export { output, .. } => {
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("expected export command"),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_round_trip() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let output = run_to_string(
            Commands::Add {
                title: "Water plants".to_string(),
                description: None,
                due: None,
                category: Some("Home".to_string()),
            },
            &store,
            owner,
        )
        .await;
        assert!(output.starts_with("Created task "));

        let listing = run_to_string(
            Commands::List {
                filters: FilterArgs::default(),
                json: false,
            },
            &store,
            owner,
        )
        .await;
        assert!(listing.contains("Water plants"));
        assert!(listing.contains("@Home"));
    }

    #[tokio::test]
    async fn test_list_marks_due_status() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();
        seed_mock_data(&store, owner).await;

        let listing = run_to_string(
            Commands::List {
                filters: FilterArgs::default(),
                json: false,
            },
            &store,
            owner,
        )
        .await;

        assert!(listing.contains("[OVERDUE]"));
        assert!(listing.contains("[DUE SOON]"));
        // Completed task with a past due date carries no overdue marker.
        let expense_line = listing
            .lines()
            .find(|l| l.contains("File expense report"))
            .unwrap();
        assert!(expense_line.starts_with("[x]"));
        assert!(!expense_line.contains("[OVERDUE]"));
    }

    #[tokio::test]
    async fn test_export_then_import_via_commands() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();
        seed_mock_data(&store, owner).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.csv");
        let output = run_to_string(
            Commands::Export {
                output: Some(path.clone()),
                filters: FilterArgs::default(),
            },
            &store,
            owner,
        )
        .await;
        assert!(output.starts_with("Exported 5 tasks"));

        let other = Uuid::new_v4();
        let output = run_to_string(Commands::Import { file: path }, &store, other).await;
        assert!(output.starts_with("Successfully imported 5 tasks."));
    }

    #[tokio::test]
    async fn test_filter_args_resolve_unknown_category() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let args = FilterArgs {
            category: Some("Nope".to_string()),
            ..FilterArgs::default()
        };
        assert!(args.resolve(&store, owner).await.is_err());
    }

    #[tokio::test]
    async fn test_category_commands() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        run_to_string(
            Commands::Category {
                command: CategoryCommand::Add {
                    name: "Reading".to_string(),
                    color: Some("#112233".to_string()),
                },
            },
            &store,
            owner,
        )
        .await;

        let listing = run_to_string(
            Commands::Category {
                command: CategoryCommand::List,
            },
            &store,
            owner,
        )
        .await;
        assert!(listing.contains("Reading"));
        assert!(listing.contains("#112233"));
        assert!(listing.contains("(0 tasks)"));
    }
}
