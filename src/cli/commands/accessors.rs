//! Accessor command implementation
//!
//! Names and insertion points for the getter and setter of a member
//! variable.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::load_location;
use crate::app::App;
use crate::cli::response::InsertionOutput;
use crate::source::{CSymbol, find_position_for_new_method};

#[derive(Args, Debug)]
pub struct AccessorsArgs {
    /// Position of the member variable (file:line:column)
    pub location: String,
}

#[derive(Serialize)]
struct AccessorsResponse {
    file: String,
    class: String,
    member: String,
    base_name: String,
    getter: Accessor,
    setter: Accessor,
}

#[derive(Serialize)]
struct Accessor {
    name: String,
    exists: bool,
    /// Where to add it when it does not exist yet
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<InsertionOutput>,
}

pub async fn execute(args: AccessorsArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let host = app.host().await?;
    let (location, document) = load_location(&*host, &args.location).await?;

    let Some(member) = document
        .symbol_at(location.position())
        .filter(CSymbol::is_member_variable)
    else {
        ctx.print_error(&format!("No member variable at {}", location));
        return Ok(());
    };
    let Some(class) = member.parent() else {
        ctx.print_error(&format!("Member at {} has no enclosing class", location));
        return Ok(());
    };

    let getter_name = member.getter_name();
    let setter_name = member.setter_name();
    let getter = class.find_getter_for(&member);
    let setter = class.find_setter_for(&member);

    // A new getter goes before an existing setter, a new setter after an
    // existing getter.
    let getter_position = getter.is_none().then(|| {
        let anchor = setter.is_some().then_some(setter_name.as_str());
        find_position_for_new_method(&class, anchor, true)
    });
    let setter_position = setter.is_none().then(|| {
        let anchor = getter.is_some().then_some(getter_name.as_str());
        find_position_for_new_method(&class, anchor, false)
    });

    ctx.print_success_flat(AccessorsResponse {
        file: ctx.relative_path(&location.file),
        class: class.name().to_string(),
        member: member.name().to_string(),
        base_name: member.base_name().to_string(),
        getter: Accessor {
            exists: getter.is_some(),
            position: getter_position.map(Into::into),
            name: getter_name,
        },
        setter: Accessor {
            exists: setter.is_some(),
            position: setter_position.map(Into::into),
            name: setter_name,
        },
    });
    Ok(())
}
