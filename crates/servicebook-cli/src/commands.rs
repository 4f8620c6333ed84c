//! Command handlers: one async function per subcommand.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use tracing::debug;

use servicebook_core::api::ApiError;
use servicebook_core::auth::Role;
use servicebook_core::models::{ComplaintFilter, MachineFilter, MaintenanceFilter, ReferenceEntity};
use servicebook_core::{ApiClient, Config};

use crate::render;
use crate::Command;

/// Environment variable read before prompting for a password
const PASSWORD_ENV: &str = "SERVICEBOOK_PASSWORD";

/// Shown when the public lookup finds nothing and the server gave no detail
const LOOKUP_NOT_FOUND: &str = "No machine with that serial number is registered";

pub async fn run(command: Command, client: &ApiClient, config: &mut Config) -> Result<()> {
    match command {
        Command::Login { username } => login(client, config, username).await,
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => whoami(client).await,
        Command::Role { role } => role_command(client, role).await,
        Command::Lookup { serial } => lookup(client, &serial).await,
        Command::Machines {
            model_technique,
            model_engine,
            model_transmission,
            model_steer_bridge,
            model_drive_bridge,
        } => {
            let filter = MachineFilter {
                model_technique,
                model_engine,
                model_transmission,
                model_steer_bridge,
                model_drive_bridge,
            };
            let machines = client.list_machines(&filter).await.map_err(explain)?;
            render::machines(&machines);
            Ok(())
        }
        Command::Machine { id } => machine(client, id).await,
        Command::Maintenance {
            kind,
            service_company,
            serial,
            id,
        } => {
            if let Some(id) = id {
                let record = client.get_maintenance(id).await.map_err(explain)?;
                render::maintenance_detail(&record);
                return Ok(());
            }
            let filter = MaintenanceFilter {
                kind,
                service_company,
                machine_serial: serial,
            };
            let records = client.list_maintenance(&filter).await.map_err(explain)?;
            render::maintenance(&records);
            Ok(())
        }
        Command::Complaints {
            failure_node,
            recovery_method,
            service_company,
            serial,
            id,
        } => {
            if let Some(id) = id {
                let record = client.get_complaint(id).await.map_err(explain)?;
                render::complaint_detail(&record);
                return Ok(());
            }
            let filter = ComplaintFilter {
                failure_node,
                recovery_method,
                service_company,
                machine_serial: serial,
            };
            let records = client.list_complaints(&filter).await.map_err(explain)?;
            render::complaints(&records);
            Ok(())
        }
        Command::References { entity } => {
            let name = ReferenceEntity::parse(&entity)
                .map(|e| e.as_str().to_string())
                .unwrap_or(entity);
            let items = client.references(&name).await.map_err(explain)?;
            render::references(&items);
            Ok(())
        }
        Command::ServiceCompanies => {
            let companies = client.service_companies().await.map_err(explain)?;
            render::users(&companies);
            Ok(())
        }
    }
}

/// Turn API failures into messages a user can act on
fn explain(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Unauthorized(_) => {
            anyhow!("Not logged in or session expired - run `servicebook login`")
        }
        ApiError::AccessDenied(ref body) => {
            anyhow!("Not allowed for the active role: {}", body.detail().unwrap_or_default())
        }
        other => other.into(),
    }
}

async fn login(client: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(username) => username,
        None => prompt("Username: ")?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let identity = match client.login(&username, &password).await {
        Ok(identity) => identity,
        Err(ApiError::Unauthorized(_)) | Err(ApiError::BadRequest(_)) => {
            bail!("Invalid credentials")
        }
        Err(e) => return Err(e.into()),
    };

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        debug!(error = %e, "Could not save last username");
    }

    let role = client.session().snapshot()?.active_role;
    render::identity(&identity, role);
    Ok(())
}

async fn whoami(client: &ApiClient) -> Result<()> {
    if !client.session().is_authenticated()? {
        println!("Guest (not logged in)");
        return Ok(());
    }
    let (identity, role) = client.ensure_active_role().await.map_err(explain)?;
    render::identity(&identity, role);
    Ok(())
}

async fn role_command(client: &ApiClient, role: Option<Role>) -> Result<()> {
    match role {
        Some(role) => match client.switch_role(role).await {
            Ok(identity) => {
                render::identity(&identity, Some(role));
                Ok(())
            }
            Err(ApiError::RoleNotGranted(role)) => {
                bail!("Your account does not hold the {} role", role)
            }
            Err(e) => Err(explain(e)),
        },
        None => {
            let (identity, active) = client.ensure_active_role().await.map_err(explain)?;
            render::identity(&identity, active);
            let available: Vec<&str> = identity.roles().iter().map(|r| r.as_str()).collect();
            println!("Available roles: {}", available.join(", "));
            Ok(())
        }
    }
}

async fn lookup(client: &ApiClient, serial: &str) -> Result<()> {
    match client.lookup_machine(serial).await {
        Ok(machine) => {
            render::public_machine(&machine);
            Ok(())
        }
        Err(ApiError::NotFound(body)) => {
            let detail = body.detail().unwrap_or_else(|| LOOKUP_NOT_FOUND.to_string());
            bail!("{}", detail)
        }
        Err(ApiError::InvalidRequest(msg)) => bail!("{}", msg),
        Err(e) => Err(e.into()),
    }
}

async fn machine(client: &ApiClient, id: i64) -> Result<()> {
    let machine = client.get_machine(id).await.map_err(explain)?;

    let (maintenance, complaints) = client.machine_records(&machine).await.map_err(explain)?;

    render::machine_detail(&machine);
    println!();
    println!("Maintenance ({})", maintenance.len());
    render::maintenance(&maintenance);
    println!();
    println!("Complaints ({})", complaints.len());
    render::complaints(&complaints);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("No input given");
    }
    Ok(value)
}
