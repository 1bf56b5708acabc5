use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Update,
    Filter,
    UpdateStmt,
    SelectStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help(HelpTopic),
    Update(UpdateArgs),
    Filter(FilterArgs),
    UpdateStmt(UpdateStmtArgs),
    SelectStmt(SelectStmtArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonArgs {
    /// Resource config; `None` uses the built-in jobs resource.
    pub config: Option<PathBuf>,
    pub verbose: bool,
    /// JSON object, or `-` to read stdin.
    pub input: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateArgs {
    pub common: CommonArgs,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterArgs {
    pub common: CommonArgs,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmtArgs {
    pub common: CommonArgs,
    /// JSON scalar identifying the record.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmtArgs {
    pub common: CommonArgs,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    let topic = match first.as_str() {
        "-h" | "--help" => return Ok(Command::Help(HelpTopic::Root)),
        "update" => HelpTopic::Update,
        "filter" => HelpTopic::Filter,
        "update-stmt" => HelpTopic::UpdateStmt,
        "select-stmt" => HelpTopic::SelectStmt,
        _ => anyhow::bail!("unknown command: {first}"),
    };
    parse_command(topic, it.map(|s| s.as_str()))
}

fn parse_command<'a>(
    topic: HelpTopic,
    mut it: impl Iterator<Item = &'a str>,
) -> anyhow::Result<Command> {
    let mut config: Option<PathBuf> = None;
    let mut verbose = false;
    let mut offset: Option<usize> = None;
    let mut key: Option<String> = None;
    let mut input: Option<String> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(topic)),
            "-v" | "--verbose" => verbose = true,
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--config=") => {
                config = Some(PathBuf::from(token.trim_start_matches("--config=")));
            }
            "--offset" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--offset requires a value");
                };
                offset = Some(parse_offset(v)?);
            }
            _ if token.starts_with("--offset=") => {
                offset = Some(parse_offset(token.trim_start_matches("--offset="))?);
            }
            "--key" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--key requires a value");
                };
                key = Some(v.to_string());
            }
            _ if token.starts_with("--key=") => {
                key = Some(token.trim_start_matches("--key=").to_string());
            }
            _ if token.starts_with("--") => anyhow::bail!("unknown option: {token}"),
            _ => {
                if input.is_some() {
                    anyhow::bail!("unexpected argument: {token}");
                }
                input = Some(token.to_string());
            }
        }
    }

    let Some(input) = input else {
        anyhow::bail!("missing JSON input (pass an object or `-` for stdin)");
    };
    let common = CommonArgs {
        config,
        verbose,
        input,
    };

    if offset.is_some() && !matches!(topic, HelpTopic::Update | HelpTopic::Filter) {
        anyhow::bail!("--offset is only valid for `update` and `filter`");
    }
    if key.is_some() && topic != HelpTopic::UpdateStmt {
        anyhow::bail!("--key is only valid for `update-stmt`");
    }

    Ok(match topic {
        HelpTopic::Update => Command::Update(UpdateArgs {
            common,
            offset: offset.unwrap_or(0),
        }),
        HelpTopic::Filter => Command::Filter(FilterArgs {
            common,
            offset: offset.unwrap_or(0),
        }),
        HelpTopic::UpdateStmt => {
            let Some(key) = key else {
                anyhow::bail!("update-stmt requires --key");
            };
            Command::UpdateStmt(UpdateStmtArgs { common, key })
        }
        HelpTopic::SelectStmt => Command::SelectStmt(SelectStmtArgs { common }),
        HelpTopic::Root => Command::Help(HelpTopic::Root),
    })
}

fn parse_offset(v: &str) -> anyhow::Result<usize> {
    v.parse()
        .map_err(|_| anyhow::anyhow!("--offset must be a non-negative integer, got {v:?}"))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
pgfrag - parameterized SQL fragments for partial updates and filtered search

USAGE:
  pgfrag <COMMAND> [OPTIONS] <JSON>

COMMANDS:
  update        Build a SET clause from a field object
  filter        Build a WHERE clause from a criteria object
  update-stmt   Build a full UPDATE statement
  select-stmt   Build a full SELECT statement

Run `pgfrag <command> --help` for more."
            );
        }
        HelpTopic::Update => {
            println!(
                "\
USAGE:
  pgfrag update [OPTIONS] <JSON>

OPTIONS:
  --config <FILE>       Resource config (default: built-in jobs resource)
  --offset <N>          Number placeholders from N+1 (default: 0)
  -v, --verbose         Log generated SQL to stderr
  -h, --help            Print help"
            );
        }
        HelpTopic::Filter => {
            println!(
                "\
USAGE:
  pgfrag filter [OPTIONS] <JSON>

OPTIONS:
  --config <FILE>       Resource config (default: built-in jobs resource)
  --offset <N>          Number placeholders from N+1 (default: 0)
  -v, --verbose         Log generated SQL to stderr
  -h, --help            Print help"
            );
        }
        HelpTopic::UpdateStmt => {
            println!(
                "\
USAGE:
  pgfrag update-stmt --key <JSON> [OPTIONS] <JSON>

OPTIONS:
  --key <JSON>          Record key as a JSON scalar (e.g. 7 or '\"c1\"')
  --config <FILE>       Resource config (default: built-in jobs resource)
  -v, --verbose         Log generated SQL to stderr
  -h, --help            Print help"
            );
        }
        HelpTopic::SelectStmt => {
            println!(
                "\
USAGE:
  pgfrag select-stmt [OPTIONS] <JSON>

OPTIONS:
  --config <FILE>       Resource config (default: built-in jobs resource)
  -v, --verbose         Log generated SQL to stderr
  -h, --help            Print help"
            );
        }
    }
}
