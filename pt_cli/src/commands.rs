//! Command implementations for the `pt_cli` binary.

use anyhow::{Context, Result, anyhow};
use poker_tools::{
    GameId, PokerTools, ToolOutput,
    db::{Database, GameRepository, GameSummary, MemoryGameRepository, PgGameRepository},
    table::TableManager,
    tools::{ToolDescriptor, ToolError, ToolName, catalog},
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::{AppConfig, StoreBackend};
use crate::logging::{log_performance, log_tool_invocation};

/// Build the tool façade over the configured store
///
/// For postgres the schema is created if missing.
pub async fn build_tools(config: &AppConfig) -> Result<PokerTools> {
    let repository: Arc<dyn GameRepository> = match config.store {
        StoreBackend::Memory => Arc::new(MemoryGameRepository::new()),
        StoreBackend::Postgres => {
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            db.health_check()
                .await
                .context("Database health check failed")?;
            let repository =
                PgGameRepository::with_timeout(db.pool().clone(), config.database.query_timeout());
            repository
                .migrate()
                .await
                .context("Failed to prepare poker_games table")?;
            Arc::new(repository)
        }
    };

    tracing::info!(store = %config.store, "Game store ready");
    let manager = TableManager::with_mailbox_capacity(repository, config.mailbox_capacity);
    Ok(PokerTools::new(manager))
}

/// Tool catalog as published to hosts
pub fn list_tools() -> Vec<ToolDescriptor> {
    catalog()
}

/// Invoke one tool with a JSON argument string
///
/// # Arguments
///
/// * `tools` - Tool façade
/// * `name` - Tool name, e.g. `poker.start_hand`
/// * `raw_args` - JSON object text; empty means no arguments
///
/// # Returns
///
/// * `Result<ToolOutput>` - Tool output, or the client-facing error
pub async fn call(tools: &PokerTools, name: &str, raw_args: &str) -> Result<ToolOutput> {
    let arguments: Value = if raw_args.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(raw_args).with_context(|| format!("Arguments for {name} are not JSON"))?
    };
    let game_id = arguments
        .get("game_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    let start = Instant::now();
    let result = tools.call(name, arguments).await;
    let elapsed = start.elapsed();

    match result {
        Ok(output) => {
            log_tool_invocation(name, game_id.as_deref(), elapsed, None);
            Ok(output)
        }
        Err(e) => {
            let message = e.client_message();
            log_tool_invocation(name, game_id.as_deref(), elapsed, Some(&message));
            Err(describe_failure(&e, message))
        }
    }
}

fn describe_failure(error: &ToolError, message: String) -> anyhow::Error {
    if error.is_retryable() {
        anyhow!("{message} (retryable)")
    } else {
        anyhow!(message)
    }
}

/// Run tool calls read line by line, one `<tool> [json]` per line.
///
/// Blank lines and lines starting with `#` are skipped. A failing call is
/// reported in the output and does not stop the session.
pub async fn session<R>(tools: &PokerTools, input: R) -> Result<Vec<Value>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut results = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, raw_args) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (line, ""),
        };

        let result = match call(tools, name, raw_args).await {
            Ok(output) => json!({ "tool": name, "output": output }),
            Err(e) => json!({ "tool": name, "error": e.to_string() }),
        };
        results.push(result);
    }

    Ok(results)
}

/// Stored games, most recently updated first
pub async fn list_games(tools: &PokerTools, limit: usize) -> Result<Vec<GameSummary>> {
    tools
        .manager()
        .list_tables(limit)
        .await
        .map_err(|e| anyhow!(e.client_message()))
}

/// Delete one game; unknown ids succeed
pub async fn delete_game(tools: &PokerTools, id: &str) -> Result<()> {
    let id = GameId::parse(id).map_err(|e| anyhow!(e.client_message()))?;
    tools
        .manager()
        .delete_table(&id)
        .await
        .map_err(|e| anyhow!(e.client_message()))?;
    tracing::info!(game_id = %id, "Game deleted");
    Ok(())
}

/// Play one complete hand against the configured store
///
/// # Arguments
///
/// * `tools` - Tool façade
/// * `bet` - Amount both players match on every street
/// * `fold_on_flop` - End the hand by a fold right after the flop
///
/// # Returns
///
/// * `Result<Vec<(ToolName, ToolOutput)>>` - Every call made, in order
pub async fn demo(
    tools: &PokerTools,
    bet: i64,
    fold_on_flop: bool,
) -> Result<Vec<(ToolName, ToolOutput)>> {
    let start = Instant::now();
    let mut transcript = Vec::new();

    let table = call(tools, ToolName::NewTable.as_str(), "").await?;
    let game_id = table.structured["game_id"].clone();
    transcript.push((ToolName::NewTable, table));

    let mut steps = vec![
        (
            ToolName::StartHand,
            json!({"game_id": game_id, "bb": 10, "sb": 5, "hero_stack": 1000, "ai_stack": 1000}),
        ),
        (
            ToolName::Deal,
            json!({"game_id": game_id, "street": "postflop", "bet": bet}),
        ),
    ];
    if !fold_on_flop {
        steps.push((
            ToolName::Deal,
            json!({"game_id": game_id, "street": "turn", "bet": bet}),
        ));
        steps.push((
            ToolName::Deal,
            json!({"game_id": game_id, "street": "river", "bet": bet}),
        ));
    }
    steps.push((
        ToolName::Showdown,
        json!({"game_id": game_id, "bet": 0, "is_fold": fold_on_flop}),
    ));

    for (tool, arguments) in steps {
        let output = call(tools, tool.as_str(), &arguments.to_string()).await?;
        transcript.push((tool, output));
    }

    log_performance(
        "demo_hand",
        start.elapsed().as_millis() as u64,
        game_id.as_str(),
    );
    Ok(transcript)
}
