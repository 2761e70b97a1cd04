use clap::Subcommand;
use color_eyre::Result;

pub(crate) mod schedule;
pub(crate) mod units;

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP API and the cache sweeper
    Serve,
    /// Print the unit conversion table
    Units,
    /// Work out when production has to start for a delivery
    Schedule(schedule::ScheduleArgs),
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve
    }
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match &self {
            Command::Serve => crate::http_server::cmd::serve().await,
            Command::Units => {
                units::print_units();
                Ok(())
            }
            Command::Schedule(args) => args.print_schedule(),
        }
    }
}
