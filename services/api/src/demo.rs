use crate::infra::{InMemoryHostelRepository, InMemoryResidentRepository};
use chrono::{Local, Months, NaiveDate};
use clap::Args;
use hostel_ops::config::AllocationConfig;
use hostel_ops::error::AppError;
use hostel_ops::inventory::{
    validate_architecture, ExpirySweeper, FloorSpec, Hostel, HostelRegistration,
    InventoryError, InventoryService, ResidentSubmission, RoomSpec, DEFAULT_ROOM_CAPACITY,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the date used for admissions and the expiry sweep (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// JSON file holding either a list of floors or an object with a `floors` field
    #[arg(long)]
    pub(crate) file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LayoutFile {
    Floors(Vec<FloorSpec>),
    Wrapped { floors: Vec<FloorSpec> },
}

impl LayoutFile {
    fn into_floors(self) -> Vec<FloorSpec> {
        match self {
            LayoutFile::Floors(floors) | LayoutFile::Wrapped { floors } => floors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LayoutSummary {
    pub(crate) floors: usize,
    pub(crate) rooms: usize,
    pub(crate) beds: u32,
}

pub(crate) fn summarize_layout(raw: &str) -> Result<LayoutSummary, AppError> {
    let floors = serde_json::from_str::<LayoutFile>(raw)?.into_floors();
    validate_architecture(&floors).map_err(InventoryError::from)?;

    let rooms = floors.iter().flat_map(|floor| floor.rooms.iter());
    Ok(LayoutSummary {
        floors: floors.len(),
        rooms: rooms.clone().count(),
        beds: rooms
            .map(|room| room.capacity.unwrap_or(DEFAULT_ROOM_CAPACITY))
            .sum(),
    })
}

pub(crate) fn validate_layout(args: ValidateArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.file)?;
    let summary = summarize_layout(&raw)?;
    println!(
        "{} is valid: {} floors, {} rooms, {} beds",
        args.file.display(),
        summary.floors,
        summary.rooms,
        summary.beds
    );
    Ok(())
}

fn demo_floors() -> Vec<FloorSpec> {
    vec![
        FloorSpec {
            name: "Ground".to_string(),
            rooms: vec![RoomSpec::new("G01", 2), RoomSpec::new("G02", 1)],
        },
        FloorSpec {
            name: "First".to_string(),
            rooms: vec![RoomSpec::new("101", 2)],
        },
    ]
}

fn admission(name: &str, join_date: NaiveDate, duration_months: u32) -> ResidentSubmission {
    ResidentSubmission {
        name: name.to_string(),
        email: None,
        duration_months,
        join_date: Some(join_date),
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let lapsed_join = today.checked_sub_months(Months::new(3)).unwrap_or(today);

    let service = Arc::new(InventoryService::new(
        Arc::new(InMemoryHostelRepository::default()),
        Arc::new(InMemoryResidentRepository::default()),
        AllocationConfig::default(),
    ));

    println!("Hostel inventory demo ({today})");
    let hostel = service.register_hostel(HostelRegistration {
        name: "Harbour House".to_string(),
    })?;
    let hostel = service
        .define_architecture(hostel.id(), demo_floors())
        .await?;
    render_inventory("Architecture defined", &hostel);

    let mut admitted = Vec::new();
    for submission in [
        admission("Asha", lapsed_join, 1),
        admission("Bilal", today, 6),
        admission("Chen", today, 12),
        admission("Dana", today, 3),
    ] {
        let resident = service
            .assign_new_resident(hostel.id(), submission, today)
            .await?;
        println!(
            "- {} ({}) placed in {} until {}",
            resident.name,
            resident.id,
            resident.room(),
            resident.end_date()
        );
        admitted.push(resident);
    }
    render_inventory("After admissions", &service.hostel(hostel.id())?);

    let (first, second) = service
        .exchange_rooms(&admitted[0].id, &admitted[3].id)
        .await?;
    println!(
        "\n{} now in {}, {} now in {}",
        first.name,
        first.room(),
        second.name,
        second.room()
    );
    render_inventory("After exchange", &service.hostel(hostel.id())?);

    let (removed, discharge) = service.remove_resident(&admitted[1].id).await?;
    println!("\n{} removed ({discharge:?})", removed.name);
    render_inventory("After removal", &service.hostel(hostel.id())?);

    let sweeper = ExpirySweeper::new(service.clone());
    if let Some(report) = sweeper.run_once(today).await {
        println!(
            "\nExpiry sweep examined {} residents, evicted {:?}",
            report.examined, report.evicted
        );
    }
    render_inventory("After expiry sweep", &service.hostel(hostel.id())?);

    println!("\nRemaining residents:");
    for resident in service.residents(hostel.id())? {
        println!(
            "- {} in {} (ends {})",
            resident.name,
            resident.room(),
            resident.end_date()
        );
    }

    Ok(())
}

fn render_inventory(title: &str, hostel: &Hostel) {
    let summary = hostel.summary();
    println!(
        "\n{title}: {} | {}/{} rooms full | {}/{} beds taken",
        hostel.name(),
        summary.occupied_rooms,
        summary.total_rooms,
        summary.occupants,
        summary.total_capacity
    );
    for floor in hostel.floors() {
        println!("  {}", floor.name());
        for room in floor.rooms() {
            let marker = if room.is_occupied() { "full" } else { "open" };
            println!(
                "    {:<5} {}/{} {marker}",
                room.number().as_str(),
                room.occupants(),
                room.capacity()
            );
        }
    }
}
