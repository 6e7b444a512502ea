use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use dotenvy::dotenv;
use log::{debug, info};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use twodo::core::{format_relative, parse_due, Config, DueStatus};
use twodo::features::reminders::{LocalReminderScheduler, ReminderScheduler};
use twodo::features::todos::{JsonFileRepository, TodoItem, TodoStore};

const HELP: &str = "\
Commands:
  list                          show all items
  add [emoji] <title> [@ <due>] add an item (due: 30m, 2h, 1h30m, YYYY-MM-DD HH:MM, RFC 3339)
  edit <n> <title>              rename item n
  emoji <n> <glyph>             change the emoji of item n
  due <n> <due|none>            set or clear the due time of item n
  done <n>                      toggle completion of item n
  rm <n>                        delete item n
  clear-done                    delete every completed item
  help                          show this help
  quit                          exit";

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting twodo...");

    let preview = std::env::args().skip(1).any(|arg| arg == "--preview");

    let scheduler = Arc::new(LocalReminderScheduler::from_config(&config));
    // Asked once per process; individual reminders never ask again
    let granted = scheduler.request_permission().await;
    debug!("Reminder permission: {granted}");

    let store = if preview {
        info!("Using in-memory preview list");
        TodoStore::preview(scheduler.clone())
    } else {
        info!("📂 Todo list at {}", config.data_file.display());
        let repository = Arc::new(JsonFileRepository::new(&config.data_file));
        TodoStore::open(repository, scheduler.clone()).await
    }
    .with_placeholder_emoji(config.default_emoji.clone());

    let mut changes = store.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let count = changes.borrow_and_update().len();
            debug!("📋 List changed ({count} items)");
        }
    });

    print_items(&store.items());
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match run_command(&store, line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("❌ {e}"),
        }
    }

    // Let queued reminder work reach the disk before exiting
    store.flush().await;
    info!(
        "Shutting down with {} reminder(s) still armed",
        scheduler.pending_count()
    );
    Ok(())
}

async fn run_command(store: &TodoStore, line: &str) -> Result<Flow> {
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    match command {
        "list" | "ls" => print_items(&store.items()),
        "add" => {
            let (emoji, title, due) = parse_add(rest)?;
            let item = store.add(title, emoji, due).await?;
            println!("➕ Added {} {}", item.emoji, item.title);
        }
        "edit" => {
            let (mut item, title) = select(store, rest)?;
            item.title = title.to_string();
            let item = store.update(item).await?;
            println!("✏️ Renamed to {}", item.title);
        }
        "emoji" => {
            let (mut item, glyph) = select(store, rest)?;
            item.emoji = glyph.to_string();
            let item = store.update(item).await?;
            println!("✏️ {} {}", item.emoji, item.title);
        }
        "due" => {
            let (mut item, when) = select(store, rest)?;
            item.due_date = parse_due(when, Utc::now())?;
            let item = store.update(item).await?;
            match item.due_date {
                Some(due) => println!("🗓️ {} due {}", item.title, format_relative(due, Utc::now())),
                None => println!("🗓️ {} has no due time", item.title),
            }
        }
        "done" => {
            let (item, _) = select(store, rest)?;
            if let Some(item) = store.toggle_complete(item.id).await {
                let state = if item.is_completed { "✅ Completed" } else { "⏳ Reopened" };
                println!("{state} {}", item.title);
            }
        }
        "rm" => {
            let (item, _) = select(store, rest)?;
            if let Some(item) = store.delete(item.id).await {
                println!("🗑️ Deleted {}", item.title);
            }
        }
        "clear-done" => {
            let removed = store.delete_where(|item| item.is_completed).await;
            println!("🗑️ Deleted {} completed item(s)", removed.len());
        }
        "help" | "?" => println!("{HELP}"),
        "quit" | "exit" => return Ok(Flow::Quit),
        other => return Err(anyhow!("Unknown command '{}'. Type `help`.", other)),
    }
    Ok(Flow::Continue)
}

/// `[emoji] <title> [@ <due>]`
fn parse_add(input: &str) -> Result<(Option<&str>, &str, Option<chrono::DateTime<Utc>>)> {
    let (body, due) = match input.rsplit_once(" @ ") {
        Some((body, when)) => (body.trim(), parse_due(when, Utc::now())?),
        None => (input, None),
    };

    let (emoji, title) = match body.split_once(char::is_whitespace) {
        Some((first, title)) if is_glyph(first) => (Some(first), title.trim()),
        _ => (None, body),
    };
    Ok((emoji, title, due))
}

fn is_glyph(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| !c.is_ascii() && !c.is_alphanumeric())
}

/// Resolve `<n> [rest]` against the 1-based list position
fn select<'a>(store: &TodoStore, input: &'a str) -> Result<(TodoItem, &'a str)> {
    let (index, rest) = input
        .split_once(char::is_whitespace)
        .map(|(i, r)| (i, r.trim()))
        .unwrap_or((input, ""));
    let n: usize = index
        .parse()
        .map_err(|_| anyhow!("Expected an item number, got '{}'", index))?;
    let item = n
        .checked_sub(1)
        .and_then(|i| store.items().get(i).cloned())
        .ok_or_else(|| anyhow!("No item #{}", n))?;
    Ok((item, rest))
}

fn print_items(items: &[TodoItem]) {
    if items.is_empty() {
        println!("🗒️ Nothing here yet. Add something with `add <title>`.");
        return;
    }

    let now = Utc::now();
    for (idx, item) in items.iter().enumerate() {
        let check = if item.is_completed { "[x]" } else { "[ ]" };
        let mut line = format!("{:>3}. {} {} {}", idx + 1, check, item.emoji, item.title);
        if let Some(due) = item.due_date {
            let status = DueStatus::of(due, now);
            line.push_str(&format!("  {} {}", status.glyph(), format_relative(due, now)));
        }
        if item.notification_id.is_some() {
            line.push_str(" 🔔");
        }
        println!("{line}");
    }
}
