//! Shell command construction for the MySQL client tools

use std::fmt;
use std::path::Path;

use crate::config::ConnectionParams;

/// Client binary used for imports
pub const MYSQL_BIN: &str = "mysql";

/// Dump binary used for exports
pub const MYSQLDUMP_BIN: &str = "mysqldump";

const REDACTED: &str = "'***'";

/// Quote a value as one POSIX shell word.
///
/// The value is always wrapped in single quotes; embedded single quotes
/// close the quoting, emit an escaped quote and reopen it.
pub fn escape_arg(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// A complete shell command line together with a rendering safe to log
#[derive(Clone, PartialEq, Eq)]
pub struct ShellCommand {
    rendered: String,
    redacted: String,
}

impl ShellCommand {
    pub fn builder(program: &str) -> ShellCommandBuilder {
        ShellCommandBuilder {
            rendered: program.to_string(),
            redacted: program.to_string(),
        }
    }

    /// The command line handed to the shell
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// The command line with secrets masked
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl fmt::Debug for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShellCommand").field(&self.redacted).finish()
    }
}

/// Appends space-separated tokens to a command line
pub struct ShellCommandBuilder {
    rendered: String,
    redacted: String,
}

impl ShellCommandBuilder {
    /// Append a token verbatim (operators such as `<` or `2>&1`)
    pub fn raw(mut self, token: &str) -> Self {
        self.push(token, token);
        self
    }

    /// Append an escaped value
    pub fn arg(mut self, value: &str) -> Self {
        let escaped = escape_arg(value);
        self.push(&escaped, &escaped);
        self
    }

    /// Append a flag glued to its escaped value, e.g. `-h'localhost'`
    pub fn flag(mut self, flag: &str, value: &str) -> Self {
        let token = format!("{}{}", flag, escape_arg(value));
        self.push(&token, &token);
        self
    }

    /// Like `flag`, but the value is masked in the redacted rendering
    pub fn secret_flag(mut self, flag: &str, value: &str) -> Self {
        let token = format!("{}{}", flag, escape_arg(value));
        let masked = format!("{}{}", flag, REDACTED);
        self.push(&token, &masked);
        self
    }

    pub fn build(self) -> ShellCommand {
        ShellCommand {
            rendered: self.rendered,
            redacted: self.redacted,
        }
    }

    fn push(&mut self, token: &str, redacted: &str) {
        self.rendered.push(' ');
        self.rendered.push_str(token);
        self.redacted.push(' ');
        self.redacted.push_str(redacted);
    }
}

fn with_credentials(builder: ShellCommandBuilder, params: &ConnectionParams) -> ShellCommandBuilder {
    let mut builder = builder
        .flag("-h", params.host())
        .flag("-u", params.user());
    if let Some(password) = params.password() {
        builder = builder.secret_flag("-p", password);
    }
    if let Some(port) = params.port() {
        builder = builder.flag("-P", &port.to_string());
    }
    builder
}

/// Build the command that pipes `file` into the configured database
pub fn import_command(params: &ConnectionParams, file: &Path, charset_mode: &str) -> ShellCommand {
    with_credentials(ShellCommand::builder(MYSQL_BIN), params)
        .flag("--default-character-set=", charset_mode)
        .arg(params.database())
        .raw("<")
        .arg(&file.to_string_lossy())
        .raw("2>&1")
        .build()
}

/// Build the command that dumps the configured database (or only `tables`) into `file`
pub fn export_command(params: &ConnectionParams, file: &Path, tables: &[String]) -> ShellCommand {
    let mut builder =
        with_credentials(ShellCommand::builder(MYSQLDUMP_BIN), params).arg(params.database());
    for table in tables {
        builder = builder.arg(table);
    }
    builder.raw(">").arg(&file.to_string_lossy()).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(password: Option<&str>) -> ConnectionParams {
        ConnectionParams::new("localhost", "root", "oxid")
            .unwrap()
            .with_password(password.map(str::to_string))
    }

    #[test]
    fn test_escape_plain_value() {
        assert_eq!(escape_arg("oxid"), "'oxid'");
    }

    #[test]
    fn test_escape_metacharacters_stay_one_word() {
        assert_eq!(escape_arg("a b;c$d"), "'a b;c$d'");
        assert_eq!(escape_arg("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_import_command_without_password() {
        let cmd = import_command(&params(None), Path::new("/tmp/dump.sql"), "utf8");
        assert_eq!(
            cmd.as_str(),
            "mysql -h'localhost' -u'root' --default-character-set='utf8' 'oxid' < '/tmp/dump.sql' 2>&1"
        );
        assert!(!cmd.as_str().split(' ').any(|t| t.starts_with("-p")));
    }

    #[test]
    fn test_import_command_with_password() {
        let cmd = import_command(&params(Some("s3cret")), Path::new("/tmp/dump.sql"), "latin1");
        assert_eq!(cmd.as_str().matches("-p's3cret'").count(), 1);
        assert!(cmd.as_str().contains("--default-character-set='latin1'"));
    }

    #[test]
    fn test_export_command_whole_database() {
        let cmd = export_command(&params(None), Path::new("/tmp/out.sql"), &[]);
        assert_eq!(
            cmd.as_str(),
            "mysqldump -h'localhost' -u'root' 'oxid' > '/tmp/out.sql'"
        );
    }

    #[test]
    fn test_export_command_with_tables() {
        let tables = vec!["users".to_string(), "orders".to_string()];
        let cmd = export_command(&params(Some("pw")), Path::new("/tmp/out.sql"), &tables);
        assert!(cmd.as_str().ends_with("'oxid' 'users' 'orders' > '/tmp/out.sql'"));
        assert_eq!(cmd.as_str().matches("-p'pw'").count(), 1);
    }

    #[test]
    fn test_port_only_when_configured() {
        let without = export_command(&params(None), Path::new("out.sql"), &[]);
        assert!(!without.as_str().contains("-P"));

        let with = params(None).with_port(Some(3307));
        let cmd = export_command(&with, Path::new("out.sql"), &[]);
        assert!(cmd.as_str().contains(" -P'3307' "));
    }

    #[test]
    fn test_injection_attempt_is_quoted() {
        let hostile = ConnectionParams::new("localhost", "root", "shop; rm -rf /")
            .unwrap()
            .with_password(Some("p'w $(whoami)".to_string()));
        let cmd = import_command(&hostile, Path::new("my dump.sql"), "utf8");
        assert!(cmd.as_str().contains(r"-p'p'\''w $(whoami)'"));
        assert!(cmd.as_str().contains("'shop; rm -rf /'"));
        assert!(cmd.as_str().contains("< 'my dump.sql'"));
    }

    #[test]
    fn test_redacted_hides_password() {
        let cmd = export_command(&params(Some("s3cret")), Path::new("out.sql"), &[]);
        assert!(!cmd.redacted().contains("s3cret"));
        assert!(cmd.redacted().contains("-p'***'"));
        assert!(!cmd.to_string().contains("s3cret"));
        assert!(!format!("{:?}", cmd).contains("s3cret"));
    }
}
