use anyhow::Context;
use clap::Parser;
use rental_client::config::cli::{
    ApartmentsCommand, ApplicationsCommand, Command, DirectoryCommand, ListArgs,
};
use rental_client::core::ConfigProvider;
use rental_client::domain::model::{ApplicationStatus, NewApplication, Paginated};
use rental_client::utils::error::ErrorSeverity;
use rental_client::utils::{logger, validation::Validate};
use rental_client::{
    ApiClient, CliConfig, ClientError, FileCredentialStore, RecordingNavigator, SessionManager,
};
use serde::Serialize;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logging() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let store = Arc::new(FileCredentialStore::new(config.credentials_path()));
    let navigator = Arc::new(RecordingNavigator::new());
    let client = Arc::new(
        ApiClient::new(&config, store, navigator.clone())
            .context("Failed to build the HTTP client")?,
    );
    let session = SessionManager::new(client);

    if let Err(e) = run(&cli.command, &session, &navigator).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(
    command: &Command,
    session: &SessionManager,
    navigator: &RecordingNavigator,
) -> Result<(), ClientError> {
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password.clone(),
                None => std::env::var("RENTAL_PASSWORD").map_err(|_| {
                    ClientError::MissingConfigError {
                        field: "password (--password or RENTAL_PASSWORD)".to_string(),
                    }
                })?,
            };
            let user = session.login(email, &password).await?;
            println!("✅ Logged in as {} <{}>", user.full_name(), user.email);
            if let Some(destination) = navigator.last() {
                println!("🧭 Start page: {}", destination.path());
            }
        }
        Command::Logout => {
            session.logout().await;
            println!("👋 Logged out");
        }
        Command::Whoami => {
            let user = require_session(session).await?;
            let roles: Vec<String> = user.roles.iter().map(ToString::to_string).collect();
            println!("{} <{}> [{}]", user.full_name(), user.email, roles.join(", "));
        }
        Command::Status => {
            let state = session.initialize().await;
            if state.is_authenticated {
                println!("✅ Signed in, home: {}", session.home_destination().await.path());
            } else {
                println!("🔒 Signed out");
            }
        }
        Command::Apartments(sub) => {
            require_session(session).await?;
            let client = session.client();
            match sub {
                ApartmentsCommand::List(args) => {
                    let page = client.apartments().list(&args.to_query()?).await?;
                    print_page(&page, args)?;
                }
                ApartmentsCommand::Mine(args) => {
                    let page = client.apartments().list_mine(&args.to_query()?).await?;
                    print_page(&page, args)?;
                }
                ApartmentsCommand::Show { id } => {
                    let apartment = client.apartments().get(id).await?;
                    println!("{}", serde_json::to_string_pretty(&apartment)?);
                }
            }
        }
        Command::Applications(sub) => {
            require_session(session).await?;
            let client = session.client();
            match sub {
                ApplicationsCommand::List(args) => {
                    let page = client.applications().list(&args.to_query()?).await?;
                    print_page(&page, args)?;
                }
                ApplicationsCommand::Apply {
                    apartment_id,
                    message,
                    move_in,
                } => {
                    let application = client
                        .applications()
                        .create(&NewApplication {
                            apartment_id: apartment_id.clone(),
                            message: message.clone(),
                            move_in_date: *move_in,
                        })
                        .await?;
                    println!("📋 Application {} submitted ({})", application.id, application.status);
                }
                ApplicationsCommand::Status { id, status } => {
                    let status: ApplicationStatus =
                        status
                            .parse()
                            .map_err(|reason| ClientError::InvalidConfigValueError {
                                field: "status".to_string(),
                                value: status.clone(),
                                reason,
                            })?;
                    let application = client.applications().update_status(id, status).await?;
                    println!("📋 Application {} is now {}", application.id, application.status);
                }
            }
        }
        Command::Owners(DirectoryCommand::List(args)) => {
            require_session(session).await?;
            let page = session.client().owners().list(&args.to_query()?).await?;
            print_page(&page, args)?;
        }
        Command::Tenants(DirectoryCommand::List(args)) => {
            require_session(session).await?;
            let page = session.client().tenants().list(&args.to_query()?).await?;
            print_page(&page, args)?;
        }
    }

    Ok(())
}

async fn require_session(
    session: &SessionManager,
) -> Result<rental_client::domain::model::User, ClientError> {
    let state = session.initialize().await;
    state
        .user
        .filter(|_| state.is_authenticated)
        .ok_or_else(|| ClientError::unauthorized("not logged in"))
}

fn print_page<T: Serialize>(page: &Paginated<T>, args: &ListArgs) -> Result<(), ClientError> {
    if args.csv {
        write_csv(&page.items)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    }

    eprintln!(
        "📄 Page {}/{} ({} total){}",
        page.page,
        page.total_pages,
        page.total,
        if page.has_next_page() { ", more with --page" } else { "" }
    );
    Ok(())
}

/// 以第一筆的欄位為表頭；陣列欄位以 `;` 串接
fn write_csv<T: Serialize>(items: &[T]) -> Result<(), ClientError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = items
        .iter()
        .map(|item| match serde_json::to_value(item) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Ok(serde_json::Map::new()),
            Err(e) => Err(e),
        })
        .collect::<Result<_, _>>()?;

    let Some(first) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(&headers)?;
    for row in &rows {
        let record: Vec<String> = headers
            .iter()
            .map(|key| match row.get(key) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Array(values)) => values
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(";"),
                Some(other) => other.to_string(),
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
