//! Reservation handlers: current, reserve, release.

use serde::Serialize;

use housing_core::model::{floor_of, select_floor};
use housing_core::{Floor, Identifier};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::floors::print_floor;
use super::{App, util};

#[derive(Serialize)]
struct CurrentView {
    room: Option<String>,
}

pub async fn current(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.require_sign_in(false)?;

    let room = match app.housing.current_reservation().await {
        Ok(reservation) => Some(reservation.room_number.to_string()),
        // No reservation, or the API cannot tell: both read as "None".
        Err(e) if e.is_not_found() || e.is_unavailable() => None,
        Err(e) => return Err(app.fail(&e, "current()").await),
    };

    let view = CurrentView { room };
    let out = output::render_single(
        &global.output,
        &view,
        |v| format!("Current reservation: {}", v.room.as_deref().unwrap_or("None")),
        |v| v.room.clone().unwrap_or_else(|| "None".into()),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn show_updated(floors: &[Floor], room: Option<&Identifier>, global: &GlobalOpts) {
    let floor = room
        .and_then(|r| floor_of(floors, r))
        .or_else(|| select_floor(floors, None));
    if let Some(floor) = floor {
        print_floor(floors, floor, global);
    }
}

pub async fn reserve(app: &App, room: &str, global: &GlobalOpts) -> Result<(), CliError> {
    app.require_sign_in(false)?;

    let room = room.trim();
    if room.is_empty() {
        return Err(CliError::Validation {
            field: "room".into(),
            reason: "room number must not be empty".into(),
        });
    }
    let room = Identifier::from(room);

    let pb = util::spinner(&format!("Reserving room {room}..."), global.quiet);
    let result = app.housing.reserve(&room).await;
    pb.finish_and_clear();

    let floors = match result {
        Ok(floors) => floors,
        Err(e) => return Err(app.fail(&e, "reserve()").await),
    };

    util::notice(&format!("Reserved room {room}"), global.quiet);
    show_updated(&floors, Some(&room), global);
    Ok(())
}

pub async fn release(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.require_sign_in(false)?;

    if !util::confirm("Release your current reservation?", global.yes)? {
        return Ok(());
    }

    let floors = match app.housing.delete_reservation().await {
        Ok(floors) => floors,
        Err(e) => return Err(app.fail(&e, "deleteReservation()").await),
    };

    util::notice("Reservation released", global.quiet);
    show_updated(&floors, None, global);
    Ok(())
}
