//! Identity handlers: whoami and login.

use housing_core::Identity;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{App, util};

fn describe(identity: &Identity) -> String {
    match (identity.is_signed_in, identity.email.as_deref()) {
        (true, Some(email)) => format!("Signed in as {email}"),
        (true, None) => "Signed in (account email unavailable)".into(),
        (false, _) => "Not signed in".into(),
    }
}

fn print_identity(identity: &Identity, global: &GlobalOpts) {
    let out = output::render_single(&global.output, identity, describe, |i| {
        i.email.clone().unwrap_or_default()
    });
    output::print_output(&out, global.quiet);
}

pub fn whoami(app: &App, global: &GlobalOpts) {
    print_identity(&app.session.identity(), global);
}

pub async fn login(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    let pb = util::spinner("Waiting for the account chooser...", global.quiet);
    let signed_in = app.session.sign_in().await?;
    pb.finish_and_clear();

    if !signed_in {
        return Err(CliError::NotSignedIn);
    }
    print_identity(&app.session.identity(), global);
    Ok(())
}
