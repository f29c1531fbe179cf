//! Shell quoting for human-readable command lines.
//!
//! Commands are spawned directly, never through a shell; these helpers only
//! render them for logs and plans.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for display.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
/// - Embedded single quotes are escaped
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Render a program and its arguments as one line.
pub fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(quote_arg)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_arg_simple() {
        assert_eq!(quote_arg("checkout"), "checkout");
        assert_eq!(quote_arg("AIMS-2.5.41"), "AIMS-2.5.41");
    }

    #[test]
    fn quote_arg_with_spaces() {
        assert_eq!(
            quote_arg("C:/Program Files/MATLAB/R2017b/bin/matlab.exe"),
            "'C:/Program Files/MATLAB/R2017b/bin/matlab.exe'"
        );
    }

    #[test]
    fn quote_arg_with_single_quote() {
        assert_eq!(quote_arg("addpath('Util')"), "'addpath('\\''Util'\\'')'");
    }

    #[test]
    fn quote_arg_empty() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn render_command_joins_program_and_args() {
        let args = vec!["install".to_string()];
        assert_eq!(render_command("ant", &args), "ant install");
    }

    #[test]
    fn render_command_quotes_program_path() {
        let args = vec!["-wait".to_string()];
        assert_eq!(
            render_command("/opt/My Tools/matlab", &args),
            "'/opt/My Tools/matlab' -wait"
        );
    }
}
