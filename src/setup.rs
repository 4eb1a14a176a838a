/*
    One-off farm preparation: make sure the resource tiers the submitter
    references exist, and that the show jobs are filed under is registered.
    Running it again updates existing tiers in place and leaves shows alone.
*/
use crate::error::SubmissionError;
use crate::models::service::{ServiceDefinition, ShowRecord};
use crate::service::FarmService;
use std::fmt::{self, Write as _};

pub const DEFAULT_SHOW: &str = "maya_renders";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupAction {
    Created,
    Updated,
    AlreadyExists,
}

impl fmt::Display for SetupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupAction::Created => f.write_str("created"),
            SetupAction::Updated => f.write_str("updated"),
            SetupAction::AlreadyExists => f.write_str("already exists"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub services: Vec<(String, SetupAction)>,
    pub show: (String, SetupAction),
}

/// Create the tier, or bring an existing one in line when `update` is set.
pub fn ensure_service(
    farm: &impl FarmService,
    service: &ServiceDefinition,
    update: bool,
) -> Result<SetupAction, SubmissionError> {
    match farm.get_service(&service.name)? {
        Some(_) if update => {
            tracing::info!("Service {} already exists. Updating...", service.name);
            farm.update_service(service)?;
            Ok(SetupAction::Updated)
        }
        Some(_) => {
            tracing::info!("Service {} already exists.", service.name);
            Ok(SetupAction::AlreadyExists)
        }
        None => {
            farm.create_service(service)?;
            tracing::info!("Created service: {}", service.name);
            Ok(SetupAction::Created)
        }
    }
}

pub fn ensure_show(farm: &impl FarmService, name: &str) -> Result<SetupAction, SubmissionError> {
    if farm.find_show(name)?.is_some() {
        tracing::info!("Show {name} already exists.");
        return Ok(SetupAction::AlreadyExists);
    }
    farm.create_show(name)?;
    tracing::info!("Created show: {name}");
    Ok(SetupAction::Created)
}

/// Set up the default tiers and `show`, stopping at the first failure.
pub fn run(farm: &impl FarmService, show: &str) -> Result<SetupReport, SubmissionError> {
    // the shell tier is shared with other tools, so never overwrite it
    let tiers = [
        (ServiceDefinition::shell(), false),
        (ServiceDefinition::maya2026(), true),
        (ServiceDefinition::arnold(), true),
    ];

    let mut services = Vec::with_capacity(tiers.len());
    for (service, update) in &tiers {
        let action = ensure_service(farm, service, *update)?;
        services.push((service.name.clone(), action));
    }

    let action = ensure_show(farm, show)?;
    Ok(SetupReport {
        services,
        show: (show.to_owned(), action),
    })
}

/// Human readable listing of the farm's services, shows and render nodes.
pub fn verification(farm: &impl FarmService) -> Result<String, SubmissionError> {
    let services = farm.list_services()?;
    let shows: Vec<ShowRecord> = farm.list_shows()?;
    let hosts = farm.list_hosts()?;

    let mut out = String::from("Available Services:\n");
    for service in &services {
        let (min, max) = service.cores_range();
        let _ = writeln!(
            out,
            "  - {}: cores={min}-{max}, mem={}GB",
            service.name,
            service.min_memory_gb()
        );
    }
    out.push_str("\nAvailable Shows:\n");
    for show in &shows {
        let _ = writeln!(out, "  - {}", show.name);
    }
    out.push_str("\nRegistered Hosts:\n");
    if hosts.is_empty() {
        out.push_str("  (No hosts registered yet)\n");
    }
    for host in &hosts {
        let _ = writeln!(
            out,
            "  - {}: {:.0} cores, {:.1}GB, state={}",
            host.name,
            host.cores(),
            host.memory_gb(),
            host.state
        );
    }
    Ok(out)
}
