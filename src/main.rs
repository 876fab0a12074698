use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod db;
mod error;
mod models;
mod relay;
mod render;
mod scheduler;
mod store;

use cli::{Cli, Commands, Decision};
use db::Page;
use models::Permission;
use render::NotificationBoard;
use store::{JsonFileStore, KeyValueStore, Repository};

fn default_store_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("no data directory available; pass --store")?;
    Ok(base.join("fujiwara").join("storage.json"))
}

fn open(path: &Path) -> error::Result<Repository<JsonFileStore>> {
    Ok(Repository::new(JsonFileStore::open(path)?))
}

fn print_home<S: KeyValueStore>(repo: &Repository<S>) -> Result<()> {
    println!("🌿 Tanaman\n");
    print!("{}", render::PlantList::new(&repo.plants()?));
    print!("{}", NotificationBoard::build(repo, Utc::now().date_naive())?);
    Ok(())
}

/// Asks on the terminal; stays undecided when stdin is not interactive.
fn ask_permission() -> std::io::Result<Option<bool>> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Ok(None);
    }
    print!("Izinkan notifikasi? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(Some(matches!(answer.trim(), "y" | "Y" | "ya")))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = match cli.store {
        Some(path) => path,
        None => default_store_path()?,
    };
    let mut repo = open(&path).with_context(|| format!("opening store {}", path.display()))?;

    let command = cli.command;
    if command.needs_registration() && db::gate(&repo)? == Page::Register {
        println!("Daftar dulu: fujiwara register --name <nama>");
        return Ok(());
    }

    match command {
        Commands::Register { name } => match db::register(&mut repo, &name)? {
            Page::Home => print_home(&repo)?,
            Page::Register => println!("Nama tidak boleh kosong."),
        },
        Commands::Home => {
            scheduler::check_notifications(&mut repo, Utc::now())?;
            print_home(&repo)?;
        }
        Commands::Add(args) => match db::add_plant(&mut repo, &args.name, &args.date) {
            Ok(plant) => {
                println!("Tanaman ditambahkan: {} ({})\n", plant.name, plant.date);
                print!("{}", render::PlantList::new(&repo.plants()?));
            }
            Err(e @ (error::Error::MissingField | error::Error::InvalidDate(_))) => {
                eprintln!("{e}");
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Plants => print!("{}", render::PlantList::new(&repo.plants()?)),
        Commands::Notifications => {
            print!("{}", NotificationBoard::build(&repo, Utc::now().date_naive())?);
        }
        Commands::Check => {
            let created = scheduler::check_notifications(&mut repo, Utc::now())?;
            println!("{} pengingat baru\n", created.len());
            print!("{}", NotificationBoard::build(&repo, Utc::now().date_naive())?);
        }
        Commands::Done { id } => {
            let notif = db::complete_notification(&mut repo, id, Utc::now())?;
            println!("Selesai: {}\n", notif.title);
            print_home(&repo)?;
        }
        Commands::ToggleArchive => {
            let show = db::toggle_archive(&mut repo)?;
            println!("{}", if show { "hidden" } else { "show" });
        }
        Commands::Watch(args) => {
            let permission = db::request_permission(&mut repo, ask_permission);
            info!(permission = permission.as_str(), store = %path.display(), "watching");
            drop(repo);

            let mut first = true;
            scheduler::run(
                Duration::from_secs(args.interval_secs),
                || open(&path),
                |repo, created| {
                    if first || !created.is_empty() {
                        first = false;
                        if let Err(e) = print_home(repo) {
                            warn!("rendering failed: {e}");
                        }
                    }
                },
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("listening for Ctrl-C failed: {e}");
                        std::future::pending::<()>().await;
                    }
                },
            )
            .await;
        }
        Commands::Relay { file } => {
            let permission = repo.permission()?;
            let mut notifier = relay::TerminalNotifier::new(std::io::stdout());
            let shown = match file {
                Some(file) => {
                    let f = tokio::fs::File::open(&file)
                        .await
                        .with_context(|| format!("opening {}", file.display()))?;
                    relay::relay(BufReader::new(f), permission, &mut notifier).await?
                }
                None => {
                    let stdin = BufReader::new(tokio::io::stdin());
                    relay::relay(stdin, permission, &mut notifier).await?
                }
            };
            info!(shown, "relay finished");
        }
        Commands::Permission { decision } => {
            let permission = match decision {
                Decision::Grant => Permission::Granted,
                Decision::Deny => Permission::Denied,
                Decision::Reset => Permission::Default,
            };
            repo.set_permission(permission)?;
            println!("Izin notifikasi: {}", permission.as_str());
        }
    }

    Ok(())
}
