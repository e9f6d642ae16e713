//! Admin handlers: list collections and the registration-form flag.

use serde::Serialize;
use tabled::Tabled;

use housing_core::AdminList;
use housing_core::model::sort_admin_lists;

use crate::cli::{AdminArgs, AdminCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{App, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "List")]
    key: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Entries")]
    entries: String,
}

impl From<&AdminList> for ListRow {
    fn from(l: &AdminList) -> Self {
        Self {
            key: l.key.clone(),
            count: l.strings.len(),
            entries: l.strings.join("\n"),
        }
    }
}

#[derive(Serialize)]
struct OpenView {
    /// `None` when the API does not offer the flag.
    open: Option<bool>,
}

fn describe(view: &OpenView) -> &'static str {
    match view.open {
        Some(true) => "open",
        Some(false) => "closed",
        None => "not supported",
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: AdminArgs, global: &GlobalOpts) -> Result<(), CliError> {
    app.require_sign_in(false)?;

    match args.command {
        AdminCommand::Lists => {
            let pb = util::spinner("Loading lists...", global.quiet);
            let result = app.housing.load_admin_lists().await;
            pb.finish_and_clear();

            let mut lists = match result {
                Ok(lists) => lists,
                Err(e) => return Err(app.fail(&e, "loadAdminLists()").await),
            };
            sort_admin_lists(&mut lists);

            let out = output::render_list(
                &global.output,
                &lists,
                |l| ListRow::from(l),
                |l| l.key.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AdminCommand::Status => {
            let open = match app.housing.is_open().await {
                Ok(open) => Some(open),
                Err(e) if e.is_not_found() || e.is_unavailable() => None,
                Err(e) => return Err(app.fail(&e, "isOpen()").await),
            };

            let view = OpenView { open };
            let out = output::render_single(
                &global.output,
                &view,
                |v| format!("Registration form: {}", describe(v)),
                |v| describe(v).to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AdminCommand::Open => set_open(app, true, global).await,
        AdminCommand::Close => set_open(app, false, global).await,
    }
}

async fn set_open(app: &App, open: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let stored = match app.housing.set_open(open).await {
        Ok(stored) => stored,
        Err(e) => return Err(app.fail(&e, "setOpen()").await),
    };

    let view = OpenView { open: Some(stored) };
    util::notice(
        &format!("Registration form is now {}", describe(&view)),
        global.quiet,
    );
    Ok(())
}
