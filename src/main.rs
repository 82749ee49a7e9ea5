use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use interview_scheduler::config::Config;
use interview_scheduler::display::{print_calendar, print_table};
use interview_scheduler::form::{export_table_to_path, read_table_from_path, AppointmentRequest};
use interview_scheduler::report::{build_month_grids, write_pdf};
use interview_scheduler::store::CsvStore;
use interview_scheduler::{web, SchedulerResult, Session};

#[derive(Parser)]
#[command(name = "interview-scheduler", about = "Interview appointments backed by a spreadsheet")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Print every appointment
    List,
    /// Print the bookable times
    Slots,
    /// Book an appointment
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Print the month calendars
    Calendar,
    /// Write the PDF calendar report
    Report {
        #[arg(default_value = "interview_calendar.pdf")]
        output: PathBuf,
    },
    /// Write the raw data as .xlsx or .csv
    Export {
        #[arg(default_value = "raw_data.xlsx")]
        output: PathBuf,
    },
    /// Append every row of an .xlsx or .csv file
    Import { input: PathBuf },
}

fn open_session(config: &Config) -> SchedulerResult<Session> {
    let mut session = Session::new(CsvStore::new(&config.store));
    session.reload()?;
    Ok(session)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config;
    config.validate()?;

    match cli.command {
        Commands::Serve { port } => {
            println!("Starting web server on port {}...", port);
            println!("Access the API at http://localhost:{}/api/appointments", port);
            web::start_server(port, config).await?;
        }
        Commands::List => {
            let session = open_session(&config)?;
            print_table(session.table());
        }
        Commands::Slots => {
            for slot in config.time_slots()? {
                println!("{}", slot);
            }
        }
        Commands::Add { name, id, date, time, notes } => {
            let mut session = open_session(&config)?;
            let request = AppointmentRequest {
                name,
                identifier: id,
                date,
                time,
                notes,
            };
            let appt = session.append(&request, config.slot_limit, Local::now().date_naive())?;
            println!("Added {} on {} at {}", appt.name, appt.date, appt.time);
        }
        Commands::Calendar => {
            let session = open_session(&config)?;
            print_calendar(&build_month_grids(session.table()));
        }
        Commands::Report { output } => {
            let session = open_session(&config)?;
            let grids = build_month_grids(session.table());
            write_pdf(&grids, &output)?;
            println!("Calendar for {} month(s) saved to {}", grids.len(), output.display());
        }
        Commands::Export { output } => {
            let session = open_session(&config)?;
            export_table_to_path(session.table(), &output)?;
            println!("{} rows saved to {}", session.table().len(), output.display());
        }
        Commands::Import { input } => {
            let mut session = open_session(&config)?;
            let imported = read_table_from_path(&input)?;
            let count = session.import(&imported)?;
            println!("Imported {} rows; store now holds {}", count, session.table().len());
        }
    }

    Ok(())
}
