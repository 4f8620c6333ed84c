//! Plain-text rendering of records for the terminal.

use servicebook_core::auth::Role;
use servicebook_core::models::{
    Complaint, Identity, Machine, Maintenance, PublicMachine, Reference, UserRef,
};
use servicebook_core::utils::{format_date, or_dash, truncate_string};

/// Widest a free-text cell may get in a table
const MAX_CELL_WIDTH: usize = 28;

fn user(value: &Option<UserRef>) -> String {
    match value {
        Some(user) => or_dash(Some(user.display_name().as_str())),
        None => "—".to_string(),
    }
}

/// `model / serial` for one component
fn component(model: Option<&str>, serial: &str) -> String {
    format!("{} / {}", or_dash(model), or_dash(Some(serial)))
}

fn cell(value: &str) -> String {
    truncate_string(value, MAX_CELL_WIDTH)
}

/// Print rows as left-aligned columns sized to their widest cell
fn table(headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("(none)");
        return;
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(value, width)| {
                let pad = width.saturating_sub(value.chars().count());
                format!("{}{}", value, " ".repeat(pad))
            })
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.iter().map(|h| h.to_string()).collect());
    for row in rows {
        line(row);
    }
}

fn fields(pairs: &[(&str, String)]) {
    let width = pairs.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    for (label, value) in pairs {
        let pad = width - label.chars().count();
        println!("{}{}  {}", label, " ".repeat(pad), value);
    }
}

pub fn identity(identity: &Identity, role: Option<Role>) {
    let role = role.map(|r| r.label()).unwrap_or("User");
    println!("{}: {} ({})", role, identity.display_name(), identity.username);
}

pub fn public_machine(machine: &PublicMachine) {
    fields(&[
        ("Serial number", machine.serial_number.clone()),
        ("Machine model", or_dash(machine.model_technique_name.as_deref())),
        ("Engine model", or_dash(machine.model_engine_name.as_deref())),
        ("Engine serial", or_dash(Some(machine.serial_engine.as_str()))),
        ("Transmission model", or_dash(machine.model_transmission_name.as_deref())),
        ("Transmission serial", or_dash(Some(machine.serial_transmission.as_str()))),
        ("Drive axle model", or_dash(machine.model_drive_bridge_name.as_deref())),
        ("Drive axle serial", or_dash(Some(machine.serial_drive_bridge.as_str()))),
        ("Steer axle model", or_dash(machine.model_steer_bridge_name.as_deref())),
        ("Steer axle serial", or_dash(Some(machine.serial_steer_bridge.as_str()))),
    ]);
}

pub fn machines(machines: &[Machine]) {
    let rows = machines
        .iter()
        .map(|m| {
            vec![
                m.id.to_string(),
                m.serial_number.clone(),
                cell(&or_dash(m.model_technique_name.as_deref())),
                cell(&or_dash(m.model_engine_name.as_deref())),
                format_date(m.shipment_date),
                cell(&user(&m.client)),
                cell(&user(&m.service_company)),
            ]
        })
        .collect();
    table(
        &["ID", "Serial", "Model", "Engine", "Shipped", "Client", "Service"],
        rows,
    );
}

pub fn machine_detail(machine: &Machine) {
    println!("Machine {}", machine.serial_number);
    fields(&[
        ("Machine model", or_dash(machine.model_technique_name.as_deref())),
        (
            "Engine",
            component(machine.model_engine_name.as_deref(), &machine.serial_engine),
        ),
        (
            "Transmission",
            component(machine.model_transmission_name.as_deref(), &machine.serial_transmission),
        ),
        (
            "Drive axle",
            component(machine.model_drive_bridge_name.as_deref(), &machine.serial_drive_bridge),
        ),
        (
            "Steer axle",
            component(machine.model_steer_bridge_name.as_deref(), &machine.serial_steer_bridge),
        ),
        ("Contract", or_dash(Some(machine.contract_number.as_str()))),
        ("Shipped", format_date(machine.shipment_date)),
        ("Consignee", or_dash(Some(machine.consignee.as_str()))),
        ("Delivery address", or_dash(Some(machine.delivery_address.as_str()))),
        ("Equipment", or_dash(Some(machine.equipment.as_str()))),
        ("Client", user(&machine.client)),
        ("Service company", user(&machine.service_company)),
    ]);
}

pub fn maintenance(records: &[Maintenance]) {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                format_date(r.performed_date),
                or_dash(r.machine_serial.as_deref()),
                cell(&or_dash(r.kind_name.as_deref())),
                r.operating_hours.to_string(),
                cell(&user(&r.service_company)),
            ]
        })
        .collect();
    table(&["ID", "Date", "Machine", "Kind", "Hours", "Service"], rows);
}

pub fn maintenance_detail(record: &Maintenance) {
    println!("Maintenance #{}", record.id);
    fields(&[
        ("Machine", or_dash(record.machine_serial.as_deref())),
        ("Kind", or_dash(record.kind_name.as_deref())),
        ("Performed", format_date(record.performed_date)),
        ("Operating hours", record.operating_hours.to_string()),
        ("Work order", or_dash(Some(record.work_order_number.as_str()))),
        ("Work order date", format_date(record.work_order_date)),
        ("Service company", user(&record.service_company)),
    ]);
}

pub fn complaints(records: &[Complaint]) {
    let rows = records
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                format_date(c.failure_date),
                or_dash(c.machine_serial.as_deref()),
                cell(&or_dash(c.failure_node_name.as_deref())),
                cell(&or_dash(c.recovery_method_name.as_deref())),
                c.downtime().map(|d| d.to_string()).unwrap_or_else(|| "—".to_string()),
            ]
        })
        .collect();
    table(&["ID", "Failed", "Machine", "Failure node", "Recovery", "Downtime"], rows);
}

pub fn complaint_detail(record: &Complaint) {
    println!("Complaint #{}", record.id);
    fields(&[
        ("Machine", or_dash(record.machine_serial.as_deref())),
        ("Failure date", format_date(record.failure_date)),
        ("Operating hours", record.operating_hours.to_string()),
        ("Failure node", or_dash(record.failure_node_name.as_deref())),
        ("Description", or_dash(Some(record.failure_description.as_str()))),
        ("Recovery method", or_dash(record.recovery_method_name.as_deref())),
        ("Parts used", or_dash(Some(record.parts_used.as_str()))),
        ("Recovered", format_date(record.recovery_date)),
        (
            "Downtime, days",
            record.downtime().map(|d| d.to_string()).unwrap_or_else(|| "—".to_string()),
        ),
        ("Service company", user(&record.service_company)),
    ]);
}

pub fn references(items: &[Reference]) {
    let rows = items
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                cell(&or_dash(Some(r.description.as_str()))),
            ]
        })
        .collect();
    table(&["ID", "Name", "Description"], rows);
}

pub fn users(users: &[UserRef]) {
    let rows = users
        .iter()
        .map(|u| {
            vec![
                u.id().map(|id| id.to_string()).unwrap_or_else(|| "—".to_string()),
                u.display_name(),
            ]
        })
        .collect();
    table(&["ID", "Name"], rows);
}
