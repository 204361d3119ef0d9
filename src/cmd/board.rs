//! Board commands: `stages`, `owners`, `show` and `move`.

use anyhow::{Context, Result, bail};
use std::sync::Arc;

use crm_board::client::{CrmBackend, CrmClient, RequestContext};
use crm_board::config::{BoardConfig, CliOverrides};
use crm_board::session::{BoardSession, DropOutcome, Notice, NoticeLevel};
use crm_board::{Card, Filters};

struct Connection {
    config: BoardConfig,
    client: CrmClient,
    ctx: RequestContext,
}

fn connect(overrides: &CliOverrides) -> Result<Connection> {
    let config = BoardConfig::resolve(overrides)?;
    let client = CrmClient::new(config.base_url()?, config.timeout())
        .context("Failed to build HTTP client")?;
    let ctx = config.request_context();
    Ok(Connection { config, client, ctx })
}

fn open_session(conn: Connection) -> BoardSession {
    BoardSession::new(Arc::new(conn.client), conn.ctx, conn.config.module())
        .with_rollback(conn.config.rollback())
}

pub async fn cmd_stages(overrides: &CliOverrides) -> Result<()> {
    let conn = connect(overrides)?;
    let module = conn.config.module();
    let stages = conn
        .client
        .fetch_stages(&conn.ctx, module)
        .await
        .with_context(|| format!("Failed to load {} stages", module))?;

    println!();
    println!("{}", console::style(format!("{} stages", module.label())).bold().cyan());
    println!();
    println!("{:<16} Title", "Id");
    println!("{:<16} -----", "----------------");
    for stage in &stages {
        println!("{:<16} {}", stage.id, stage.title);
    }
    println!();
    Ok(())
}

pub async fn cmd_owners(overrides: &CliOverrides) -> Result<()> {
    let conn = connect(overrides)?;
    let owners = conn
        .client
        .fetch_owners(&conn.ctx)
        .await
        .context("Failed to load users")?;

    println!();
    println!("{:<8} Name", "Id");
    println!("{:<8} ----", "------");
    for owner in &owners {
        println!("{:<8} {}", owner.id, owner.label);
    }
    println!();
    Ok(())
}

pub async fn cmd_show(overrides: &CliOverrides, filters: Filters, search: &str, json: bool) -> Result<()> {
    let mut session = open_session(connect(overrides)?);
    let loaded = session.load().await;
    print_notices(&session.take_notices(), |n| n.level == NoticeLevel::Error);
    loaded.context("Failed to load board")?;

    session.set_filters(filters);
    session.set_search(search);

    if json {
        let out = serde_json::to_string_pretty(session.board()).context("Failed to serialize board")?;
        println!("{}", out);
        return Ok(());
    }

    println!();
    println!(
        "{}",
        console::style(format!("{} board", session.module().label())).bold().cyan()
    );
    for stage in session.board() {
        println!();
        println!(
            "{} {}",
            console::style(&stage.stage.title).bold(),
            console::style(format!("({}, {})", stage.id(), stage.items.len())).dim()
        );
        if stage.items.is_empty() {
            println!("  {}", console::style("no cards").dim());
        }
        for card in &stage.items {
            print_card(card);
        }
    }
    println!();
    Ok(())
}

fn print_card(card: &Card) {
    println!(
        "  {:<20} {:<28} {:>12}  {}",
        card.id, card.name, card.value, card.company
    );
    println!(
        "  {:<20} {}",
        "",
        console::style(format!(
            "owner {} · created {} · due {}",
            card.owner, card.created_date, card.due_date
        ))
        .dim()
    );
}

pub async fn cmd_move(overrides: &CliOverrides, card_id: &str, target_stage_id: &str) -> Result<()> {
    let mut session = open_session(connect(overrides)?);
    let loaded = session.load().await;
    print_notices(&session.take_notices(), |_| true);
    loaded.context("Failed to load board")?;

    if session.stages().iter().all(|s| s.id != target_stage_id) {
        bail!(
            "Unknown stage '{}'. Run 'crm-board stages' to list stage ids.",
            target_stage_id
        );
    }
    if !session.pick_up(card_id) {
        bail!("Card '{}' is not on the {} board", card_id, session.module());
    }

    let outcome = session.drop_on(target_stage_id).await;
    print_notices(&session.take_notices(), |_| true);
    match outcome.context("Move was not saved")? {
        DropOutcome::Committed(_) => {}
        DropOutcome::Ignored => {
            println!("{}", console::style("Card is already in that stage.").yellow());
        }
    }
    Ok(())
}

fn print_notices(notices: &[Notice], keep: impl Fn(&Notice) -> bool) {
    for notice in notices.iter().filter(|n| keep(n)) {
        match notice.level {
            NoticeLevel::Success => println!("{} {}", console::style("✓").green(), notice.message),
            NoticeLevel::Error => {
                eprintln!("{} {}", console::style("Error:").red().bold(), notice.message)
            }
        }
    }
}
