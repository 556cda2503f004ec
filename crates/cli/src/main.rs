use anyhow::{Context, Result, bail};
use blurb_client::{BlurbRequest, BlurbService};
use clap::{Parser, Subcommand};
use colored::Colorize;
use session::{CardDetail, RefillOutcome, SessionUpdate, SwipeConfig, SwipeSession};
use sources::{CandidateQuery, CuratedRail, FixedSource, GoogleBooksSource, ItemSource};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use swipe::{Decision, DecisionEvent, PointerEvent, PointerPosition};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// BookSwipe - swipe right on your next book
#[derive(Parser)]
#[command(name = "bookswipe")]
#[command(about = "Swipe through book recommendations in the terminal", long_about = None)]
struct Cli {
    /// Use the built-in catalog instead of Google Books
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swipe through a deck of books
    Swipe {
        /// Free-text search to deal cards from
        #[arg(long, conflicts_with_all = ["category", "rail"])]
        query: Option<String>,

        /// Subject / category to deal cards from
        #[arg(long, conflicts_with = "rail")]
        category: Option<String>,

        /// Curated rail to deal cards from (see `bookswipe rails`)
        #[arg(long)]
        rail: Option<CuratedRail>,

        /// Shuffle the popular mix
        #[arg(long)]
        shuffle: bool,

        /// Card viewport width in pixels
        #[arg(long, default_value = "400")]
        viewport: f32,

        /// Cards per refill
        #[arg(long, default_value = "10")]
        batch_size: usize,
    },

    /// Search for books
    Search {
        /// Title, author or keywords
        #[arg(long)]
        query: String,

        /// Number of results to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Write a short blurb for a book
    Blurb {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        /// Longer description to condense
        #[arg(long)]
        description: Option<String>,
    },

    /// List the curated rails
    Rails,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Swipe {
            query,
            category,
            rail,
            shuffle,
            viewport,
            batch_size,
        } => {
            let query = match (query, category, rail) {
                (Some(text), _, _) => CandidateQuery::Search(text),
                (_, Some(name), _) => CandidateQuery::Category(name),
                (_, _, Some(rail)) => CandidateQuery::Rail(rail),
                _ => CandidateQuery::Popular,
            };
            let config = SwipeConfig::default()
                .with_viewport_width(viewport)
                .with_batch_size(batch_size);
            handle_swipe(cli.offline, query, shuffle, config).await?
        }
        Commands::Search { query, limit } => handle_search(cli.offline, query, limit).await?,
        Commands::Blurb {
            title,
            author,
            description,
        } => handle_blurb(cli.offline, title, author, description).await?,
        Commands::Rails => handle_rails(),
    }

    Ok(())
}

fn build_source(offline: bool, shuffle: bool) -> Result<Arc<dyn ItemSource>> {
    if offline {
        info!("Using the built-in offline catalog");
        return Ok(Arc::new(FixedSource::sample()));
    }
    let source = GoogleBooksSource::new()
        .context("Failed to create Google Books client")?
        .with_shuffle(shuffle);
    info!("Using Google Books at {}", source.base_url());
    Ok(Arc::new(source))
}

fn build_blurbs(offline: bool) -> Result<BlurbService> {
    if offline {
        return Ok(BlurbService::offline());
    }
    Ok(BlurbService::from_env())
}

// ============================================================================
// swipe
// ============================================================================

/// Handle the 'swipe' command
async fn handle_swipe(
    offline: bool,
    query: CandidateQuery,
    shuffle: bool,
    config: SwipeConfig,
) -> Result<()> {
    let source = build_source(offline, shuffle)?;
    let blurbs = build_blurbs(offline)?;
    let mut session = SwipeSession::new(source, blurbs, config)?.with_query(query);
    let started = Instant::now();

    println!("{}", format!("BookSwipe: {}", session.query()).bold().blue());
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if session.active().is_none() && session.needs_refill() {
            refill(&mut session).await;
        }
        match session.active() {
            Some(_) => print_card(&session),
            None => println!("{}", "All caught up! Nothing left to swipe.".yellow()),
        }

        print!("{} ", ">".bold());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let mut words = line.split_whitespace();
        match words.next() {
            Some("l") | Some("right") => report(session.swipe(Decision::Like)),
            Some("p") | Some("left") => report(session.swipe(Decision::Pass)),
            Some("d") => match parse_drag(words) {
                Ok((dx, dy)) => simulate_drag(&mut session, started.elapsed(), dx, dy),
                Err(e) => println!("{}", e.to_string().red()),
            },
            Some("f") => match session.flip() {
                Some(detail) => print_detail(&detail),
                None => println!("(front)"),
            },
            Some("m") => print_matches(&session),
            Some("logout") => {
                session.logout();
                println!("Logged out. Matches cleared.");
            }
            Some("q") | Some("quit") => break,
            Some(_) => print_help(),
            None => {}
        }
    }

    println!(
        "{} {} book(s) liked this session",
        "✓".green(),
        session.matches().len()
    );
    Ok(())
}

async fn refill(session: &mut SwipeSession) {
    println!("Fetching books for {}...", session.query());
    match session.refill().await {
        Ok(RefillOutcome::Loaded(count)) => println!("{} Dealt {} cards", "✓".green(), count),
        Ok(RefillOutcome::Empty) => println!("No books found for {}", session.query()),
        Ok(RefillOutcome::Stale) | Ok(RefillOutcome::Coalesced) => {}
        Err(e) => println!("{} {:#}", "✗".red(), e),
    }
}

fn parse_drag<'a>(mut words: impl Iterator<Item = &'a str>) -> Result<(f32, f32)> {
    let dx = match words.next() {
        Some(value) => value
            .parse::<f32>()
            .with_context(|| format!("Invalid dx '{}'", value))?,
        None => bail!("Usage: d <dx> [dy]"),
    };
    let dy = match words.next() {
        Some(value) => value
            .parse::<f32>()
            .with_context(|| format!("Invalid dy '{}'", value))?,
        None => 0.0,
    };
    Ok((dx, dy))
}

/// Replay a press, a halfway move and a release through the session.
fn simulate_drag(session: &mut SwipeSession, now: Duration, dx: f32, dy: f32) {
    let (x0, y0) = (200.0, 300.0);
    let step = Duration::from_millis(50);

    if session.pointer(PointerEvent::Down(PointerPosition::new(x0, y0, now)))
        == SessionUpdate::Ignored
    {
        println!("Nothing to drag");
        return;
    }
    let halfway = PointerPosition::new(x0 + dx / 2.0, y0 + dy / 2.0, now + step);
    if let SessionUpdate::Dragging { overlay, .. } = session.pointer(PointerEvent::Move(halfway)) {
        let label = if overlay.strength >= 0.0 { "LIKE" } else { "PASS" };
        println!("  dragging: {} {:.0}%", label, overlay.strength.abs() * 100.0);
    }
    let end = PointerPosition::new(x0 + dx, y0 + dy, now + step * 2);
    report(session.pointer(PointerEvent::Up(end)));
}

fn report(update: SessionUpdate) {
    match update {
        SessionUpdate::Decided(event) => print_decision(&event),
        SessionUpdate::Exhausted(event) => {
            print_decision(&event);
            println!("That was the last card.");
        }
        SessionUpdate::SnappedBack => println!("Not far enough, card snapped back"),
        SessionUpdate::Ignored => println!("No card to swipe"),
        SessionUpdate::Pressed | SessionUpdate::Dragging { .. } => {}
    }
}

fn print_decision(event: &DecisionEvent) {
    match event.decision {
        Decision::Like => println!("{} Liked '{}'", "♥".green(), event.item.title),
        _ => println!("{} Passed on '{}'", "✗".red(), event.item.title),
    }
}

fn print_card(session: &SwipeSession) {
    let Some(book) = session.active() else {
        return;
    };
    println!();
    println!(
        "[{}] {}",
        session.progress_label().unwrap_or_default().cyan(),
        book.title.bold()
    );
    println!("    by {}", book.author_line());
    if let Some(year) = book.published_year {
        println!("    {}", year);
    }
    if let Some(blurb) = &book.blurb {
        println!("    {}", blurb.italic());
    }
}

fn print_detail(detail: &CardDetail) {
    println!("{}", detail.title.bold().blue());
    println!("{}Authors: {}", "• ".green(), detail.authors);
    if let Some(year) = detail.year {
        println!("{}Published: {}", "• ".green(), year);
    }
    if let Some(pages) = detail.page_count {
        println!("{}Pages: {}", "• ".green(), pages);
    }
    if !detail.categories.is_empty() {
        println!("{}Categories: {}", "• ".green(), detail.categories.join(", "));
    }
    println!("{}", detail.summary);
}

fn print_matches(session: &SwipeSession) {
    let matches = session.matches().list();
    if matches.is_empty() {
        println!("No matches yet");
        return;
    }
    println!("{}", "Your matches:".bold().blue());
    for (i, record) in matches.iter().enumerate() {
        println!(
            "{}. {} by {} ({})",
            (i + 1).to_string().green(),
            record.book.title,
            record.book.author_line(),
            record.matched_at.format("%H:%M:%S")
        );
    }
}

fn print_help() {
    println!("Commands: l/right like, p/left pass, d <dx> [dy] drag, f flip, m matches, logout, q quit");
}

// ============================================================================
// search / blurb / rails
// ============================================================================

/// Handle the 'search' command
async fn handle_search(offline: bool, query: String, limit: usize) -> Result<()> {
    let source: Arc<dyn ItemSource> = if offline {
        Arc::new(FixedSource::sample())
    } else {
        Arc::new(
            GoogleBooksSource::new()
                .context("Failed to create Google Books client")?
                .with_max_results(limit),
        )
    };

    let books = source
        .fetch_candidates(&CandidateQuery::Search(query.clone()))
        .await
        .with_context(|| format!("Search for '{}' failed", query))?;

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if books.is_empty() {
        println!("No books found");
    }
    for (i, book) in books.iter().take(limit).enumerate() {
        let year = book
            .published_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "????".to_string());
        println!(
            "{}. {} ({}) by {}",
            (i + 1).to_string().green(),
            book.title,
            year,
            book.author_line()
        );
    }
    Ok(())
}

/// Handle the 'blurb' command
async fn handle_blurb(
    offline: bool,
    title: String,
    author: String,
    description: Option<String>,
) -> Result<()> {
    let service = build_blurbs(offline)?;
    let mut request = BlurbRequest::new(title, author);
    if let Some(description) = description {
        request = request.with_description(description);
    }
    println!("{}", service.blurb(&request).await);
    Ok(())
}

/// Handle the 'rails' command
fn handle_rails() {
    println!("{}", "Curated rails:".bold().blue());
    for rail in CuratedRail::all() {
        println!(
            "{}  {} ({})",
            format!("{:<14}", rail.slug()).green(),
            rail.title(),
            rail.query()
        );
    }
}
