mod cli;

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use tm::config::Config;
use tm::model::{parse_tags, NewTask, Priority, TaskPatch};
use tm::store::{Direction, TaskStore};
use tm::view::ViewQuery;
use tm::{output, SqliteStorage, StoreError};

fn tm_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".tm"))
}

fn resolve_path(cli_value: Option<String>, default_name: &str) -> Result<String> {
    match cli_value {
        Some(p) => Ok(p),
        None => {
            let path = tm_dir()?.join(default_name);
            Ok(path
                .to_str()
                .context("default path is not valid UTF-8")?
                .to_string())
        }
    }
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn setup_logging(config: &Config) {
    let filter = std::env::var("TM_LOG")
        .ok()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .parse_filters(&filter)
        .format_timestamp_secs()
        .init();
}

fn open_store(db_path: &str, config: &Config) -> Result<TaskStore<SqliteStorage>> {
    ensure_parent_dir(db_path)?;
    let storage = SqliteStorage::open(db_path)
        .with_context(|| format!("failed to open database {db_path}"))?;
    let mut store = TaskStore::load(storage)?;
    if config.seed_demo() && store.seed_if_new() {
        eprintln!("Added example tasks to a new list");
    }
    Ok(store)
}

/// A one-shot command cannot keep an unsaved change around, so a failed
/// save is fatal here.
fn ensure_saved(store: &TaskStore<SqliteStorage>) -> Result<()> {
    if let Some(e) = store.last_storage_error() {
        bail!("change was not saved: {e}");
    }
    Ok(())
}

fn parse_priority(value: Option<String>) -> Result<Option<Priority>> {
    Ok(value.as_deref().map(Priority::parse).transpose()?)
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
}

fn dispatch(store: &mut TaskStore<SqliteStorage>, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Add {
            title,
            desc,
            due,
            priority,
            tags,
            json,
        } => {
            let input = NewTask {
                title,
                description: desc,
                due,
                priority: parse_priority(priority)?,
                tags: tags.as_deref().map(parse_tags),
            };
            let task = store.add(input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(task)?);
            } else {
                println!("{}", task.id);
            }
            eprintln!("Added task '{}'", task.title);
        }

        Command::Edit {
            id,
            title,
            desc,
            due,
            priority,
            tags,
        } => {
            let mut patch = TaskPatch {
                title,
                description: desc,
                due: due.map(|d| Some(d).filter(|d| !d.trim().is_empty())),
                priority: parse_priority(priority)?,
                tags: None,
            };
            if let Some(text) = tags {
                patch = patch.tags_text(&text);
            }
            if patch.is_empty() {
                bail!("nothing to change: pass at least one of --title, --desc, --due, --priority, --tags");
            }
            let task = store.update(&id, patch)?;
            eprintln!("Updated '{}'", task.title);
        }

        Command::Done { id } => {
            if store.toggle_done(&id)? {
                eprintln!("Marked '{id}' as done");
            } else {
                eprintln!("Marked '{id}' as not done");
            }
        }

        Command::Rm { id } => {
            let task = store.remove(&id)?;
            eprintln!("Removed task '{}'", task.title);
        }

        Command::Up { id } => {
            if store.reorder(&id, Direction::Up) {
                eprintln!("Moved '{id}' up");
            } else {
                eprintln!("'{id}' was not moved");
            }
        }

        Command::Down { id } => {
            if store.reorder(&id, Direction::Down) {
                eprintln!("Moved '{id}' down");
            } else {
                eprintln!("'{id}' was not moved");
            }
        }

        Command::Reorder { ids } => {
            store.reorder_to(&ids)?;
            eprintln!("Reordered {} tasks", ids.len());
        }

        Command::ClearCompleted => {
            let removed = store.clear_completed();
            eprintln!("Removed {removed} completed tasks");
        }

        Command::ClearAll { yes } => {
            if !yes {
                bail!("refusing to remove all tasks without --yes");
            }
            let removed = store.clear_all();
            eprintln!("Removed {removed} tasks");
        }

        Command::Import { file } => {
            let text = read_input(&file)?;
            let count = store.import_json(&text)?;
            eprintln!("Tasks imported: {count}");
        }

        Command::Export { output } => {
            let snapshot = store.export_snapshot()?;
            if output == "-" {
                println!("{snapshot}");
            } else {
                std::fs::write(&output, format!("{snapshot}\n"))
                    .with_context(|| format!("failed to write {output}"))?;
                eprintln!("Exported {} tasks to {output}", store.len());
            }
        }

        Command::Backup { dir } => {
            let name = chrono::Local::now()
                .format("tasks-backup-%Y%m%d-%H%M%S.json")
                .to_string();
            let path = Path::new(&dir).join(name);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create directory {dir}"))?;
            std::fs::write(&path, format!("{}\n", store.export_snapshot()?))
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", path.display());
        }

        Command::List {
            filter,
            search,
            sort,
            details,
            no_details,
            json,
        } => {
            let query = ViewQuery {
                filter: match filter {
                    Some(f) => f.parse()?,
                    None => config.filter()?,
                },
                search: search.unwrap_or_default(),
                sort: match sort {
                    Some(s) => s.parse()?,
                    None => config.sort()?,
                },
            };
            let show_details = match (details, no_details) {
                (true, _) => true,
                (_, true) => false,
                _ => config.show_details(),
            };
            let tasks = store.view(&query);
            if json {
                let list = output::ListOutput {
                    tasks,
                    stats: store.stats(),
                };
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print!("{}", output::format_task_list(&tasks, show_details));
                print!("{}", output::format_stats(&store.stats()));
            }
        }

        Command::Show { id, json } => {
            let task = store.get(&id).ok_or(StoreError::NotFound(id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(task)?);
            } else {
                print!("{}", output::format_task_detail(task));
            }
        }

        Command::Stats { json } => {
            let stats = store.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", output::format_stats(&stats));
            }
        }
    }

    ensure_saved(store)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = resolve_path(cli.config, "config.toml")?;
    let config = Config::load_from(Path::new(&config_path))?;
    setup_logging(&config);

    let db_path = resolve_path(cli.db, "tm.db")?;
    let mut store = open_store(&db_path, &config)?;
    dispatch(&mut store, &config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm::transfer;

    fn test_store() -> TaskStore<SqliteStorage> {
        TaskStore::load(SqliteStorage::open_memory().unwrap()).unwrap()
    }

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["tm"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn add_with_all_flags() {
        let mut store = test_store();
        let config = Config::default();
        dispatch(
            &mut store,
            &config,
            parse(&[
                "add",
                "Write report",
                "--desc",
                "quarterly",
                "--due",
                "2025-09-30",
                "--priority",
                "high",
                "--tags",
                "work, q3",
            ]),
        )
        .unwrap();
        let task = &store.tasks()[0];
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "quarterly");
        assert_eq!(task.due.as_deref(), Some("2025-09-30"));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.tags, vec!["work", "q3"]);
    }

    #[test]
    fn add_rejects_unknown_priority() {
        let mut store = test_store();
        let result = dispatch(
            &mut store,
            &Config::default(),
            parse(&["add", "t", "--priority", "urgent"]),
        );
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn edit_without_changes_errors() {
        let mut store = test_store();
        let id = store.add(NewTask::titled("t")).unwrap().id.clone();
        let result = dispatch(&mut store, &Config::default(), parse(&["edit", id.as_str()]));
        assert!(result.is_err());
    }

    #[test]
    fn edit_empty_due_clears_it() {
        let mut store = test_store();
        let id = store
            .add(NewTask {
                due: Some("2025-01-01".into()),
                ..NewTask::titled("t")
            })
            .unwrap()
            .id
            .clone();
        dispatch(
            &mut store,
            &Config::default(),
            parse(&["edit", id.as_str(), "--due", ""]),
        )
        .unwrap();
        assert!(store.get(&id).unwrap().due.is_none());
    }

    #[test]
    fn clear_all_requires_confirmation() {
        let mut store = test_store();
        store.add(NewTask::titled("t")).unwrap();
        assert!(dispatch(&mut store, &Config::default(), parse(&["clear-all"])).is_err());
        assert_eq!(store.len(), 1);
        dispatch(&mut store, &Config::default(), parse(&["clear-all", "--yes"])).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn show_unknown_id_is_not_found() {
        let mut store = test_store();
        let err = dispatch(&mut store, &Config::default(), parse(&["show", "nope"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn cleared_database_stays_empty_on_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("tm.db");
        let db_path = db_path.to_str().unwrap();
        let config = Config::default();

        let mut store = open_store(db_path, &config).unwrap();
        assert_eq!(store.len(), 2);
        dispatch(&mut store, &config, parse(&["clear-all", "--yes"])).unwrap();
        drop(store);

        let store = open_store(db_path, &config).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn list_rejects_bad_sort() {
        let mut store = test_store();
        let result = dispatch(
            &mut store,
            &Config::default(),
            parse(&["list", "--sort", "random"]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn details_flags_conflict() {
        assert!(Cli::try_parse_from(["tm", "list", "--details", "--no-details"]).is_err());
    }

    #[test]
    fn reorder_requires_ids() {
        assert!(Cli::try_parse_from(["tm", "reorder"]).is_err());
    }

    #[test]
    fn export_and_import_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(transfer::EXPORT_FILENAME);
        let path_str = path.to_str().unwrap();

        let mut source = test_store();
        source.seed_if_new();
        dispatch(
            &mut source,
            &Config::default(),
            parse(&["export", "--output", path_str]),
        )
        .unwrap();

        let mut target = test_store();
        dispatch(&mut target, &Config::default(), parse(&["import", path_str])).unwrap();
        assert_eq!(target.tasks(), source.tasks());
    }

    #[test]
    fn backup_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store();
        store.add(NewTask::titled("t")).unwrap();
        dispatch(
            &mut store,
            &Config::default(),
            parse(&["backup", "--dir", dir.path().to_str().unwrap()]),
        )
        .unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("tasks-backup-"));
        assert!(entries[0].ends_with(".json"));
    }
}
