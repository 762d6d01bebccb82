use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{PlotError, Result};

/// Command that opens `path` with the desktop's default application
pub fn opener_command(path: &Path) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    }
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    }
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Shows the saved chart. Returns once the opener has been launched.
pub fn show(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PlotError::Viewer {
            path: path.to_path_buf(),
            message: "file does not exist".to_string(),
        });
    }

    let mut cmd = opener_command(path);
    debug!("Launching viewer: {:?}", cmd);
    cmd.spawn().map_err(|e| PlotError::Viewer {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_command_targets_path() {
        let path = Path::new("Experiments/batch_result_1.pdf");
        let cmd = opener_command(path);
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args.last().copied(), Some(path.as_os_str()));
    }

    #[test]
    fn test_show_missing_file() {
        let result = show(Path::new("no_such_dir/batch_result_9.pdf"));
        assert!(matches!(result, Err(PlotError::Viewer { .. })));
    }
}
