//! Folio Application CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use folio_app::{
    auth::{AuthService, NewUser, PgAuthService, Role, TokenConfig, UserUuid},
    database::{self, Db},
};

#[derive(Debug, Parser)]
#[command(name = "folio-app", about = "Folio CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(UserCommand),
}

#[derive(Debug, Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    CreateAdmin(CreateAdminArgs),
}

#[derive(Debug, Args)]
struct CreateAdminArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Login email
    #[arg(long)]
    email: String,

    /// Login password
    #[arg(long)]
    password: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Signing secret for access tokens
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: String,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::User(UserCommand {
            command: UserSubcommand::CreateAdmin(args),
        }) => create_admin(args).await,
    }
}

async fn create_admin(args: CreateAdminArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAuthService::new(Db::new(pool), TokenConfig::new(args.jwt_secret));
    let user_uuid = args
        .user_uuid
        .map_or_else(UserUuid::new, UserUuid::from_uuid);

    let session = service
        .register(NewUser {
            uuid: user_uuid,
            name: args.name,
            email: args.email,
            password: args.password,
            role: Role::Admin,
        })
        .await
        .map_err(|error| format!("failed to create admin user: {error}"))?;

    println!("user_uuid: {}", session.user.uuid);
    println!("user_email: {}", session.user.email);
    println!("role: {}", session.user.role.as_str());

    Ok(())
}
