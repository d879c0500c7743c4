use std::ffi::OsString;

use clap::Parser;
use clap::builder::BoolishValueParser;

use crate::engine::state::UserAction;

/// Flags the protocol handler passes in single-dash form.
const LONG_FLAGS: [&str; 3] = ["player", "reinstall", "patch"];

#[derive(Parser, Debug)]
#[command(
    name = "leeklaunch",
    version,
    about = "Bootstrapper that installs, patches and launches the Roblox player"
)]
pub struct Cli {
    /// Deep link or roblox-player URI to launch with.
    #[arg(long, value_name = "DEEPLINK", allow_hyphen_values = true)]
    pub player: Option<String>,

    /// Download and extract the current client again.
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub reinstall: Option<bool>,

    /// Apply file modifications from the mods directory. Fires on presence, whatever the value.
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub patch: Option<bool>,
}

impl Cli {
    pub fn parse_normalized<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_args(args))
    }

    /// Reinstall first; launching already applies mods, so `-patch` alone only runs without `-player`.
    pub fn actions(&self) -> Vec<UserAction> {
        let mut actions = Vec::new();
        if self.reinstall == Some(true) {
            actions.push(UserAction::Reinstall);
        }
        match &self.player {
            Some(deeplink) => actions.push(UserAction::Launch {
                deeplink: deeplink.clone(),
            }),
            None if self.patch.is_some() => actions.push(UserAction::Patch),
            None => {}
        }
        actions
    }
}

/// Rewrite `-player`, `-reinstall` and `-patch` to their `--` spelling.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(flag) = text.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
                return arg;
            };
            let name = flag.split('=').next().unwrap_or(flag);
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}
