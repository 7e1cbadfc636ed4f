use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

pub fn write_file(path: &Path, rendered: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create output file '{}': {err}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))?;
    Ok(())
}

pub fn write_stdout(rendered: &str) -> Result<(), String> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| format!("Failed to write output: {err}"))
}
