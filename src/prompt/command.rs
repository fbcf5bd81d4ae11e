//! The `prompt get`, `prompt set` and `prompt reset` commands.

use crate::error::CommitError;
use crate::session::Session;

use super::{TemplateKind, TemplateStore};

/// Show the stored template, creating it from the default if missing.
pub fn show_template<S: Session + ?Sized>(
    templates: &TemplateStore,
    kind: TemplateKind,
    session: &mut S,
) -> Result<(), CommitError> {
    let template = templates.get(kind)?;
    session.note(&template, kind.label());
    Ok(())
}

/// Open the template in the user's editor and show the result.
pub fn edit_template<S: Session + ?Sized>(
    templates: &TemplateStore,
    kind: TemplateKind,
    session: &mut S,
) -> Result<(), CommitError> {
    let edited = templates.edit(kind)?;
    session.note(&edited, kind.label());
    session.complete(&format!("{} updated", kind.label()));
    Ok(())
}

/// Ask for confirmation, then restore the built-in default.
///
/// Returns whether the template was reset.
pub fn reset_template<S: Session + ?Sized>(
    templates: &TemplateStore,
    kind: TemplateKind,
    session: &mut S,
) -> Result<bool, CommitError> {
    if session
        .confirm("Are you sure you want to reset the prompt?")?
        .value()
        != Some(true)
    {
        session.done("Reset cancelled");
        return Ok(false);
    }

    let default = templates.reset(kind)?;
    session.note(default, kind.label());
    session.complete(&format!("{} reset to default", kind.label()));
    Ok(true)
}
