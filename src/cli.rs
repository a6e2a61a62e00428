use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "colorbisect")]
#[command(about = "Find the line whose color code causes a visible effect")]
#[command(long_about = "colorbisect binary-searches the color codes of a stylesheet.

Each step overwrites the color codes (#rgb to #rrggbb) on a range of lines
with #ff0000 and asks whether anything changed in your viewer. Answer with
the two buttons and the range halves until a single line is left.

The file is copied to <FILE>.bak first and restored when the search ends,
fails, or is interrupted with Ctrl-C.

DIALOG:
  A small \"Binary search\" window asks each question. Click \"Original\"
  (white) when nothing changed and \"Changed\" (red) when something did.
  The keys o/n and c/y answer too, and Esc aborts. Without a display the
  terminal popup is used instead.

ENVIRONMENT:
  FIND_COLOR_X_OFFSET    Pixels to shift the first window by (default: 0)
  COLORBISECT_X_OFFSET   Same, read when FIND_COLOR_X_OFFSET is unset

EXAMPLES:
  colorbisect theme.css               Search with the dialog window
  colorbisect --terminal theme.css    Draw the dialog inside the terminal
  colorbisect --plain theme.css       Answer y/n on the console instead")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
struct Cli {
    /// File whose color codes to search
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Draw the dialog as a popup inside the terminal
    #[arg(long, conflicts_with = "plain")]
    #[arg(
        help = "Draw the dialog as a popup inside the terminal instead of a window\n\
                The x-offset is then counted in columns"
    )]
    terminal: bool,

    /// Ask on the console instead of a dialog
    #[arg(long)]
    #[arg(
        help = "Ask y/n questions on the console instead of showing a dialog\n\
                Useful over ssh or when the terminal cannot enter raw mode"
    )]
    plain: bool,

    /// Enable debug logging
    #[arg(long)]
    #[arg(
        help = "Write a debug log to ~/.colorbisect/colorbisect.log\n\
                Same as setting debug = true under [logging] in the config file"
    )]
    debug: bool,
}

/// How the user is asked about each probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Window,
    Terminal,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub file: PathBuf,
    pub dialog: DialogKind,
    pub debug: bool,
}

/// Parse the process arguments
///
/// Errors are returned instead of exiting so the caller controls the exit status.
pub fn parse_args() -> Result<Args, clap::Error> {
    parse_args_from(std::env::args_os())
}

pub fn parse_args_from<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let dialog = if cli.plain {
        DialogKind::Plain
    } else if cli.terminal {
        DialogKind::Terminal
    } else {
        DialogKind::Window
    };
    Ok(Args {
        file: cli.file,
        dialog,
        debug: cli.debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_single_file_argument() {
        let args = parse_args_from(["colorbisect", "theme.css"]).unwrap();
        assert_eq!(args.file, PathBuf::from("theme.css"));
        assert_eq!(args.dialog, DialogKind::Window);
        assert!(!args.debug);
    }

    #[test]
    fn test_flags() {
        let args = parse_args_from(["colorbisect", "--plain", "--debug", "theme.css"]).unwrap();
        assert_eq!(args.dialog, DialogKind::Plain);
        assert!(args.debug);

        let args = parse_args_from(["colorbisect", "--terminal", "theme.css"]).unwrap();
        assert_eq!(args.dialog, DialogKind::Terminal);
    }

    #[test]
    fn test_terminal_and_plain_conflict() {
        let err = parse_args_from(["colorbisect", "--terminal", "--plain", "a.css"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_missing_file_argument_is_usage_error() {
        let err = parse_args_from(["colorbisect"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_extra_argument_is_usage_error() {
        let err = parse_args_from(["colorbisect", "a.css", "b.css"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = parse_args_from(["colorbisect", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
