use std::path::Path;

use log::info;

use crate::error::LauncherResult;

pub const SCHEMES: [&str; 2] = ["roblox", "roblox-player"];

/// Value stored under `<scheme>\shell\open\command`.
pub fn handler_command(executable: &Path) -> String {
    format!("\"{}\" -player \"%1\"", executable.display())
}

/// Point both URL schemes at `executable`.
#[cfg(target_os = "windows")]
pub fn register_protocols(executable: &Path) -> LauncherResult<()> {
    use log::debug;
    use winreg::RegKey;
    use winreg::enums::HKEY_CURRENT_USER;

    use crate::error::LauncherError;

    let command = handler_command(executable);
    let classes = RegKey::predef(HKEY_CURRENT_USER);

    for scheme in SCHEMES {
        let key_path = format!("Software\\Classes\\{scheme}\\shell\\open\\command");
        let (key, _) = classes
            .create_subkey(&key_path)
            .map_err(|e| LauncherError::io(&key_path, e))?;

        let current: Option<String> = key.get_value("").ok();
        if current.as_deref() == Some(command.as_str()) {
            debug!("protocol: {scheme} already points at {}", executable.display());
            continue;
        }
        key.set_value("", &command)
            .map_err(|e| LauncherError::io(&key_path, e))?;
        info!("protocol: registered {scheme} -> {command}");
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
pub fn register_protocols(executable: &Path) -> LauncherResult<()> {
    info!(
        "protocol: registering {:?} is only supported on Windows; skipping for {}",
        SCHEMES,
        executable.display()
    );
    Ok(())
}
