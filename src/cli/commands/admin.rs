use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::models::NewUser;
use crate::database::{DatabaseError, DatabaseManager, UserRepository};
use crate::types::Role;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an admin account (no-op if the email is taken)")]
    Create {
        #[arg(long, env = "ADMIN_EMAIL", help = "Admin email address")]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true, help = "Admin password")]
        password: String,
        #[arg(long, default_value = "Admin User", help = "Display name")]
        name: String,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { email, password, name } => {
            create_admin(&email, &password, &name, &output_format).await
        }
    }
}

async fn create_admin(
    email: &str,
    plain_password: &str,
    name: &str,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    password::validate_password_strength(plain_password).map_err(anyhow::Error::msg)?;

    let pool = DatabaseManager::pool().await.context("failed to connect to database")?;
    let repo = UserRepository::new(pool);

    if let Some(existing) = repo.find_by_email(email).await? {
        return output_success(
            output_format,
            "Admin user already exists",
            Some(json!({ "email": existing.email, "role": existing.role })),
        );
    }

    let password_hash = password::hash_password(plain_password)?;
    let new_user = NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash,
        role: Role::Admin,
    };

    let admin = match repo.insert(&new_user).await {
        Ok(user) => user,
        // Lost a race with another writer
        Err(DatabaseError::Duplicate(_)) => {
            return output_success(output_format, "Admin user already exists", Some(json!({ "email": email })));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Created admin {}", admin.email);
    output_success(
        output_format,
        "Admin user created successfully",
        Some(json!({ "id": admin.id, "email": admin.email, "role": admin.role })),
    )
}
