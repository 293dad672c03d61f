use ballot::admin::NewCandidate;
use ballot::configuration::Settings;
use ballot::storage::FileStorage;
use ballot::Ballot;
use ballot_client::HttpBackend;
use ballot_common::category::Category;
use ballot_common::selection::Selections;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{self, Duration};
use tracing_subscriber::EnvFilter;

type App = Ballot<HttpBackend, FileStorage>;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML file with the backend endpoints and component settings.
    #[arg(long, default_value = "ballot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Keep syncing and print the standings on every change.
    Watch,
    /// Vote once from this device.
    Vote {
        singing: String,
        popularity: String,
        costume: String,
    },
    /// Simulate `users` attendees voting at random.
    Load { users: usize },
    Add {
        name: String,
        #[arg(long, default_value = "")]
        song: String,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        video_link: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    Delete { id: String },
    ResetScores,
    Voting { state: VotingState },
    TestMode { state: Toggle },
    /// Forget that this device voted.
    ClearHistory,
    /// Check that the read endpoint answers.
    Ping,
    /// Print the form URL for checking its field keys.
    FormUrl,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum VotingState {
    Open,
    Closed,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = Settings::from_file(&args.config)?;
    let resync_delay = Duration::from_millis(settings.ballot.admin.resync_delay_millis);
    let storage = Arc::new(FileStorage::new(&settings.ballot.storage));
    let backend = Arc::new(HttpBackend::new(settings.backend)?);
    let app = Ballot::new(settings.ballot, backend, storage);

    match args.command {
        Command::Watch => watch(&app).await?,
        Command::Vote {
            singing,
            popularity,
            costume,
        } => {
            app.sync().refresh().await;
            let selections = Selections::new(singing, popularity, costume);
            app.submit(&selections).await?;
            drain(&app).await;
            println!("vote submitted");
        }
        Command::Load { users } => load(&app, users).await?,
        Command::Add {
            name,
            song,
            image,
            video_link,
            id,
        } => {
            let id = app
                .admin()
                .add_candidate(NewCandidate {
                    id,
                    name,
                    song,
                    image,
                    video_link,
                })
                .await?;
            println!("added {}", id);
            settle(&app, resync_delay).await;
        }
        Command::Delete { id } => {
            app.admin().delete_candidate(&id).await?;
            println!("deleted {}", id);
            settle(&app, resync_delay).await;
        }
        Command::ResetScores => {
            app.admin().reset_scores().await?;
            println!("scores reset");
            settle(&app, resync_delay).await;
        }
        Command::Voting { state } => {
            app.sync().refresh().await;
            let open = matches!(state, VotingState::Open);
            app.admin().set_voting_open(open).await?;
            println!("voting {}", if open { "opened" } else { "closed" });
        }
        Command::TestMode { state } => {
            app.sync().refresh().await;
            let enabled = matches!(state, Toggle::On);
            app.admin().set_test_mode(enabled).await?;
            println!("test mode {}", if enabled { "on" } else { "off" });
        }
        Command::ClearHistory => {
            app.admin().clear_history()?;
            println!("voting history cleared");
        }
        Command::Ping => {
            let report = app.admin().check_connection().await;
            println!("{}", report.message);
            if !report.ok {
                std::process::exit(1);
            }
        }
        Command::FormUrl => match app.admin().form_view_url() {
            Some(url) => println!("{}", url),
            None => println!("no form URL configured"),
        },
    }

    Ok(())
}

async fn watch(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let changed = Arc::new(Notify::new());
    let notify = changed.clone();
    let subscription = app.store().subscribe(move || notify.notify_one());
    app.start_sync();

    loop {
        tokio::select! {
            _ = changed.notified() => print_standings(app),
            res = tokio::signal::ctrl_c() => {
                res?;
                break;
            }
        }
    }

    app.stop_sync();
    subscription.unsubscribe();
    Ok(())
}

async fn load(app: &App, users: usize) -> Result<(), Box<dyn std::error::Error>> {
    app.sync().refresh().await;

    let changed = Arc::new(Notify::new());
    let notify = changed.clone();
    let subscription = app.store().subscribe(move || notify.notify_one());

    app.run_load(users, |progress| {
        tracing::info!(
            completed = progress.completed,
            total = progress.total,
            "{}",
            progress.message
        );
    })?;

    while app.load().is_running() {
        tokio::select! {
            _ = changed.notified() => {}
            res = tokio::signal::ctrl_c() => {
                res?;
                app.stop_load();
            }
        }
    }

    subscription.unsubscribe();
    drain(app).await;
    println!("load test finished");
    Ok(())
}

// Waits until the queue has nothing left to deliver.
async fn drain(app: &App) {
    while app.queue().pending() > 0 || app.queue().active() > 0 {
        time::sleep(Duration::from_millis(100)).await;
    }
}

// Gives the backend time to apply a mutation, then shows the result.
async fn settle(app: &App, delay: Duration) {
    time::sleep(delay).await;
    app.sync().refresh().await;
    print_standings(app);
}

fn print_standings(app: &App) {
    let store = app.store();
    println!(
        "voting {} | {} mode | voted here: {}",
        if store.voting_open() { "open" } else { "closed" },
        if store.test_mode() { "test" } else { "official" },
        store.has_voted()
    );
    for category in Category::ALL.iter().copied() {
        println!("{}:", category);
        for (rank, candidate) in store.ranking(category).iter().enumerate() {
            println!(
                "  {:>2}. {:<20} {:>5}",
                rank + 1,
                candidate.name,
                candidate.score(category)
            );
        }
    }
}
