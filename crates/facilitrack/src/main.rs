use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use facilitrack::config::Config;
use facilitrack::service::{FacilityInput, FacilityService, ServiceError, SpaceInput};
use facilitrack::storage::InMemoryStore;
use facilitrack_core::authz::Principal;
use facilitrack_core::facility::{NewUser, Role, TaskDetails, TaskStatus};
use facilitrack_core::storage::RepositoryError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SEED_PASSWORD: &str = "facilitrack-seed";

/// Facilitrack - Track maintenance tasks across facilities
#[derive(Parser, Debug)]
#[command(name = "facilitrack")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Storage backend
    #[arg(long, value_enum, default_value_t = StoreKind::Memory, env = "FACILITRACK_STORE")]
    store: StoreKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// In-process table, lost on exit
    Memory,
    /// The configured DynamoDB table
    Dynamodb,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the table and its GSI1 index if they do not exist.
    Deploy,
    /// Walk through every operation against the store and print the result.
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facilitrack=debug,facilitrack_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match cli.command {
        Command::Deploy => deploy(cli.store, &config).await,
        Command::Seed => {
            let service = build_service(cli.store, &config).await?;
            seed(&service).await
        }
    }
}

#[cfg(feature = "dynamodb")]
async fn deploy(store: StoreKind, config: &Config) -> Result<()> {
    use facilitrack::storage::dynamodb::{self, deploy::DeployOutcome};

    if store != StoreKind::Dynamodb {
        bail!("deploy only applies to --store dynamodb");
    }

    tracing::info!(endpoint = %config.target_display(), "deploying");
    let client = dynamodb::connect(config).await;
    match dynamodb::deploy::ensure_table(&client, &config.table_name).await? {
        DeployOutcome::Created => tracing::info!("table created"),
        DeployOutcome::AlreadyExists => tracing::info!("nothing to do"),
    }
    Ok(())
}

#[cfg(not(feature = "dynamodb"))]
async fn deploy(_store: StoreKind, _config: &Config) -> Result<()> {
    bail!("built without the `dynamodb` feature")
}

async fn build_service(store: StoreKind, config: &Config) -> Result<FacilityService> {
    match store {
        StoreKind::Memory => Ok(FacilityService::from_store(Arc::new(InMemoryStore::new()))),
        #[cfg(feature = "dynamodb")]
        StoreKind::Dynamodb => {
            tracing::info!(endpoint = %config.target_display(), "using DynamoDB");
            let store = facilitrack::storage::dynamodb::store_from_config(config).await;
            Ok(FacilityService::from_store(Arc::new(store)))
        }
        #[cfg(not(feature = "dynamodb"))]
        StoreKind::Dynamodb => {
            let _ = config;
            bail!("built without the `dynamodb` feature")
        }
    }
}

/// Registers `email`, or logs in when it is already registered.
async fn ensure_user(
    service: &FacilityService,
    name: &str,
    email: &str,
    role: Role,
) -> Result<Principal> {
    let registered = service
        .register_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            role,
            password: SEED_PASSWORD.to_string(),
        })
        .await;

    match registered {
        Ok(user) => Ok(Principal::from(&user)),
        Err(ServiceError::Repository(RepositoryError::Duplicate { .. })) => service
            .authenticate(email, SEED_PASSWORD)
            .await
            .with_context(|| format!("{email} exists with another password")),
        Err(err) => Err(err.into()),
    }
}

async fn seed(service: &FacilityService) -> Result<()> {
    let owner = ensure_user(service, "Olivia Owner", "owner@facilitrack.dev", Role::Owner).await?;
    let maintainer = ensure_user(
        service,
        "Marco Maintainer",
        "maintainer@facilitrack.dev",
        Role::Maintainer,
    )
    .await?;

    let facility = service
        .create_facility(
            &owner,
            FacilityInput {
                name: "North Plant".to_string(),
                address: "12 Industrial Way".to_string(),
                city: "Springfield".to_string(),
                image_url: "https://images.facilitrack.dev/north-plant.png".to_string(),
            },
        )
        .await?;
    service
        .add_user_to_facility(&owner, facility.id, &maintainer.email)
        .await?;
    service.add_asset(&owner, facility.id, "Boiler-1").await?;

    let space = service
        .create_space(
            &owner,
            facility.id,
            SpaceInput {
                name: "Boiler room".to_string(),
                location: "Basement, level 2".to_string(),
                schema_url: "https://images.facilitrack.dev/boiler-room.png".to_string(),
            },
        )
        .await?;

    let task = service
        .create_task(
            &owner,
            facility.id,
            space.id,
            TaskDetails {
                title: "Replace pressure valve".to_string(),
                description: "Valve on Boiler-1 is leaking under load".to_string(),
                start_date: "2024-06-01T08:00:00Z".to_string(),
                end_date: "2024-06-03T17:00:00Z".to_string(),
                coord_x: "42.5".to_string(),
                coord_y: "17".to_string(),
                status: TaskStatus::Unassigned,
                assignee: Some(maintainer.email.clone()),
                asset: Some("Boiler-1".to_string()),
            },
        )
        .await?;
    service
        .add_comment(
            &maintainer,
            facility.id,
            space.id,
            task.id,
            "Replacement valve ordered",
        )
        .await?;

    let facility = service.get_facility(&owner, facility.id).await?;
    let members = service.list_users_for_facility(&owner, facility.id).await?;
    let spaces = service.list_spaces(&owner, facility.id).await?;
    let tasks = service
        .list_tasks_for_facility(&maintainer, facility.id)
        .await?;
    let comments = service
        .list_comments(&owner, facility.id, space.id, task.id)
        .await?;

    let report = serde_json::json!({
        "facility": facility,
        "members": members,
        "spaces": spaces,
        "tasks": tasks,
        "comments": comments,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(facility_id = %facility.id, "seed complete");
    Ok(())
}
