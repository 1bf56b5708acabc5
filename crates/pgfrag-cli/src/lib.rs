mod cli;
mod commands;
mod config;
mod logging;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    let out = match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            return Ok(());
        }
        cli::Command::Update(args) => {
            logging::init(args.common.verbose);
            commands::update(args)?
        }
        cli::Command::Filter(args) => {
            logging::init(args.common.verbose);
            commands::filter(args)?
        }
        cli::Command::UpdateStmt(args) => {
            logging::init(args.common.verbose);
            commands::update_stmt(args)?
        }
        cli::Command::SelectStmt(args) => {
            logging::init(args.common.verbose);
            commands::select_stmt(args)?
        }
    };
    println!("{out}");
    Ok(())
}
