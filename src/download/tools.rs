use std::path::{Path, PathBuf};

/// Conventional location of the audio conversion tool under `tools_dir`.
pub fn conversion_tool_path(tools_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        tools_dir.join("Scripts").join("ffmpeg.exe")
    } else {
        tools_dir.join("bin").join("ffmpeg")
    }
}

/// Returns the conversion tool if it exists and is executable.
pub fn locate_conversion_tool(tools_dir: &Path) -> Option<PathBuf> {
    let path = conversion_tool_path(tools_dir);
    is_executable(&path).then_some(path)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
