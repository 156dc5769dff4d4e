mod app;
mod cli;
mod render;

use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use taskdeck_auth::{LoginCredentials, SignupCredentials};
use taskdeck_core::{AppError, Config, LatencyConfig};
use taskdeck_services::TaskDraft;

use crate::app::App;
use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    taskdeck_core::init()?;
    let cli = Cli::parse();

    let mut config = Config::load_validated()?;
    if cli.fast {
        config.latency = LatencyConfig::none();
    }

    let app = App::new(config)?;
    let user = app.start().await;

    let command = cli.command.unwrap_or(Command::Status);
    if command.requires_session() && user.is_none() {
        bail!("Not signed in. Run `taskdeck login <email> <password>` first.");
    }

    let result = run(&app, command).await;
    // Failures already surface as error notifications
    print_notifications(&app);
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!("Command failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(app: &App, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login { email, password } => {
            let user = app.auth().login(LoginCredentials::new(email, password)).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Signup {
            email,
            password,
            name,
        } => {
            let user = app
                .auth()
                .signup(SignupCredentials::new(email, password, name))
                .await?;
            println!("Welcome, {}", user.name);
        }
        Command::Logout => app.auth().logout().await,
        Command::Status => {
            match app.auth().current_user() {
                Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
                None => println!("Not signed in"),
            }
            println!("Data directory: {}", app.config().data_dir.display());
            if app.auth().is_authenticated() {
                let tasks = app.tasks().list_all().await;
                let done = tasks.iter().filter(|t| t.completed).count();
                println!("Tasks: {} ({} done)", tasks.len(), done);
            }
        }
        Command::List => {
            let groups = app.tasks().grouped().await;
            print!("{}", render::task_list(&groups));
        }
        Command::Add {
            title,
            desc,
            priority,
            due,
            location,
        } => {
            let mut draft = TaskDraft::new(title).priority(priority.into());
            if let Some(desc) = desc {
                draft = draft.description(desc);
            }
            if let Some(due) = due {
                draft = draft.due_date(due);
            }
            if let Some(location) = location {
                draft = draft.location(location);
            }
            let task = app.tasks().create(draft).await?;
            println!("{}", render::task_line(&task));
        }
        Command::Toggle { id } => {
            let outcome = app.tasks().toggle_completion(&id).await?;
            let state = if outcome.completed { "done" } else { "open" };
            println!("{} is now {}", outcome.task_id, state);
        }
        Command::Remove { id } => {
            app.tasks().remove(&id).await?;
        }
    }
    Ok(())
}

fn print_notifications(app: &App) {
    for notification in app.drain_notifications() {
        eprintln!("{}", render::notification_line(&notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::{LocalStorage, WeatherConfig};

    fn test_app() -> App {
        let config = Config {
            data_dir: std::path::PathBuf::from("unused"),
            weather: WeatherConfig::default(),
            latency: LatencyConfig::none(),
        };
        App::with_storage(config, LocalStorage::in_memory()).unwrap()
    }

    #[tokio::test]
    async fn test_failed_command_reports_message_once() {
        let app = test_app();
        let result = run(
            &app,
            Command::Login {
                email: "user@example.com".to_string(),
                password: "wrong".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Auth(_))));
        let lines: Vec<_> = app
            .drain_notifications()
            .iter()
            .map(render::notification_line)
            .collect();
        assert_eq!(lines, vec!["! Invalid email or password".to_string()]);
    }

    #[tokio::test]
    async fn test_toggle_unknown_task_fails() {
        let app = test_app();
        let result = run(&app, Command::Toggle { id: "missing-id".to_string() }).await;
        assert!(matches!(result, Err(AppError::Task(_))));
        assert_eq!(app.drain_notifications().len(), 1);
    }
}
