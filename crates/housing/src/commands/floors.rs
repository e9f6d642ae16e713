//! Floor and room occupancy handlers.

use tabled::Tabled;

use housing_core::model::select_floor;
use housing_core::{Floor, Room};

use crate::cli::{FloorsArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{App, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "Room")]
    number: String,
    #[tabled(rename = "Capacity")]
    capacity: u32,
    #[tabled(rename = "Occupants")]
    occupants: u32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Residents")]
    residents: String,
}

impl RoomRow {
    fn new(room: &Room, color: bool) -> Self {
        Self {
            number: room.number.to_string(),
            capacity: room.capacity,
            occupants: room.occupants.count(),
            status: output::occupancy_label(room.occupancy(), color),
            residents: room.names().join(", "),
        }
    }
}

/// Print `floor`'s rooms, with a floor index on stderr for table output.
pub fn print_floor(floors: &[Floor], floor: &Floor, global: &GlobalOpts) {
    let color = output::should_color(&global.color);

    if matches!(global.output, OutputFormat::Table) {
        let index: Vec<String> = floors
            .iter()
            .map(|f| {
                if f.number == floor.number {
                    format!("[{}]", f.number)
                } else {
                    f.number.to_string()
                }
            })
            .collect();
        util::notice(&format!("Floors: {}", index.join(" ")), global.quiet);
    }

    let out = output::render_list(
        &global.output,
        &floor.rooms,
        |r| RoomRow::new(r, color),
        |r| r.number.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: FloorsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    app.require_sign_in(true)?;
    if !app.housing.is_online() {
        util::notice("Housing API unavailable, showing sample data", global.quiet);
    }

    let floors = match app.housing.load_floors().await {
        Ok(floors) => floors,
        Err(e) => return Err(app.fail(&e, "rooms()").await),
    };

    let Some(floor) = select_floor(&floors, args.floor.as_deref()) else {
        util::notice("No floors available", global.quiet);
        return Ok(());
    };
    if let Some(ref requested) = args.floor {
        if !floor.number.matches(requested) {
            util::notice(
                &format!("Floor {requested} not found, showing floor {}", floor.number),
                global.quiet,
            );
        }
    }

    print_floor(&floors, floor, global);
    Ok(())
}
