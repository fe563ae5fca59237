// Entry point and terminal flow.
//
// With `--region` the binary loads the data, renders every panel for that
// selection, exports it and exits. Otherwise it shows a menu:
// - [1] loads the five CSV files (once per process),
// - [2] changes the region selection,
// - [3] renders and exports the dashboard for the current selection, after
//   which the user can go back to the menu or exit.
use clap::Parser;
use once_cell::unsync::OnceCell;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sales_dashboard::config::LOG_ENV;
use sales_dashboard::output::{export_snapshot, render_snapshot};
use sales_dashboard::util::format_int;
use sales_dashboard::{load_dataset, Config, Dashboard, Dataset, Error, RegionFilter, Result};

/// Initialize tracing from `SALES_DASHBOARD_LOG`, defaulting to `info`.
///
/// Logs go to stderr so stdout only carries the dashboard itself.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

struct Session {
    config: Config,
    dataset: OnceCell<Dataset>,
    filter: RegionFilter,
}

impl Session {
    fn new(config: Config) -> Self {
        let filter = config.region_filter().unwrap_or_default();
        Self {
            config,
            dataset: OnceCell::new(),
            filter,
        }
    }

    /// Option [1]. The dataset is read on first use and kept for the rest of
    /// the process.
    fn load(&self) -> Result<&Dataset> {
        if let Some(ds) = self.dataset.get() {
            println!("Dataset already loaded.\n");
            return Ok(ds);
        }
        self.dataset.get_or_try_init(|| {
            let (ds, report) = load_dataset(&self.config.data_dir)?;
            println!(
                "Processing dataset... ({} regions, {} sales reps, {} accounts, {} orders, {} web events)",
                format_int(report.regions),
                format_int(report.sales_reps),
                format_int(report.accounts),
                format_int(report.orders),
                format_int(report.web_events)
            );
            if let Some((first, last)) = report.order_years {
                println!("Orders span {}–{}.", first, last);
            }
            println!();
            Ok(ds)
        })
    }

    /// Option [2]. Accepts a number from the list or a region name.
    fn select_region(&mut self) -> Result<()> {
        let dataset = self.dataset.get().ok_or(Error::DatasetNotLoaded)?;
        let options = dataset.region_options();
        println!("Select Region:");
        for (i, name) in options.iter().enumerate() {
            println!("[{}] {}", i, name);
        }
        let Some(choice) = prompt("Enter choice: ") else {
            return Ok(());
        };
        let selection = choice
            .parse::<usize>()
            .ok()
            .and_then(|i| options.get(i).cloned())
            .unwrap_or(choice);
        let filter = RegionFilter::from_selection(&selection);
        if !options.iter().any(|o| RegionFilter::from_selection(o) == filter) {
            warn!(region = %filter, "Region not in dataset; panels will be empty");
        }
        info!(region = %filter, "Region selection changed");
        self.filter = filter;
        println!("Current selection: {}\n", self.filter);
        Ok(())
    }

    /// Option [3]. Rendering failures abort; export failures are reported and
    /// the console output still stands.
    fn generate(&self) -> Result<()> {
        let dataset = self.dataset.get().ok_or(Error::DatasetNotLoaded)?;
        let snapshot = Dashboard::new(dataset, self.config.dashboard()).build(&self.filter);
        render_snapshot(&snapshot, self.config.preview_rows)?;

        if !self.config.no_export {
            match export_snapshot(&self.config.out_dir, &snapshot) {
                Ok(files) => println!(
                    "(Full tables exported to {}, {} files)\n",
                    self.config.out_dir.display(),
                    files.len()
                ),
                Err(e) => error!("Export failed: {}", e),
            }
        }
        Ok(())
    }
}

/// Print `label` and read one trimmed line; `None` at end of input.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to return to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = prompt("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn run_once(session: &Session) -> Result<()> {
    session.load()?;
    session.generate()
}

fn run_menu(session: &mut Session) {
    loop {
        println!("Sales Metrics Dashboard (selection: {})", session.filter);
        println!("[1] Load the dataset");
        println!("[2] Select region");
        println!("[3] Generate reports\n");
        let Some(choice) = prompt("Enter choice: ") else {
            break;
        };
        let outcome = match choice.as_str() {
            "1" => session.load().map(|_| ()),
            "2" => session.select_region(),
            "3" => {
                println!();
                match session.generate() {
                    Ok(()) if !prompt_back_to_menu() => {
                        println!("Exiting the program.");
                        break;
                    }
                    other => other,
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            eprintln!("Error: {}\n", e);
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let config = Config::parse();
    let one_shot = config.region.is_some();
    let mut session = Session::new(config);

    if one_shot {
        if let Err(e) = run_once(&session) {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    run_menu(&mut session);
    ExitCode::SUCCESS
}
