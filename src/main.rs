//! cachedump - Cache save-data partition dumper
//!
//! Entry point: discovers the target application's cache partitions and
//! dumps each one in turn. The application id, dump root and chunk size
//! are build-time constants; the CLI only controls verbosity.

use cachedump::dump::{walk, DumpContext};
use cachedump::error::DumpResult;
use cachedump::locator::{PartitionLocator, RegistryLocator};
use cachedump::mount::MountAdapter;
use cachedump::platform::{ApplicationId, ControlDataSource, HostPlatform};
use cachedump::ui::{wait_for_button, Console};
use clap::{ArgAction, Parser};
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Title whose cache storages are dumped
const APPLICATION_ID: ApplicationId = ApplicationId(0x0100C090153B4000);

/// Destination root for dumped files
const DUMP_ROOT: &str = "cache_dumps";

/// Backing root for the host platform's emulated storage spaces
const STORAGE_ROOT: &str = "cache_storages";

/// Dump an application's cache save-data partitions
///
/// Mounts every discoverable cache storage read-only, lists its tree and
/// copies each file byte-for-byte under
/// `cache_dumps/<title id>/<partition index>/`.
#[derive(Parser, Debug)]
#[command(name = "cachedump")]
#[command(author, version, long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("cachedump=warn"),
        1 => EnvFilter::new("cachedump=info"),
        _ => EnvFilter::new("cachedump=debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> DumpResult<()> {
    let mut console = Console::stdout();
    console.line(&format!(
        "cachedump v{}. Title {}.",
        env!("CARGO_PKG_VERSION"),
        APPLICATION_ID
    ));
    console.blank();

    let platform = HostPlatform::new(STORAGE_ROOT);

    console.print("Retrieving application control data... ");
    let properties = match platform.control_properties(APPLICATION_ID) {
        Ok(properties) => properties,
        Err(err) => {
            console.blank();
            return Err(err);
        }
    };
    console.line("OK!");
    console.blank();

    console.line("Cache storage properties:");
    console.line(&format!("\t- Size: {:#x}.", properties.cache_storage_size));
    console.line(&format!(
        "\t- Journal size: {:#x}.",
        properties.cache_storage_journal_size
    ));
    console.line(&format!(
        "\t- Data + journal max size: {:#x}.",
        properties.cache_storage_data_and_journal_size_max
    ));
    console.line(&format!(
        "\t- Max index: {}.",
        properties.cache_storage_index_max
    ));
    console.blank();

    // The dump buffer must exist before any partition is touched.
    let mut ctx = DumpContext::new(DUMP_ROOT, APPLICATION_ID)?;

    let locator = RegistryLocator::new(&platform);
    let partitions = locator.list(APPLICATION_ID)?;

    let mut adapter = MountAdapter::new(&platform, APPLICATION_ID);
    for info in &partitions {
        console.print(&format!(
            "Mounting cache storage #{} ({})... ",
            info.index, info.space
        ));
        let partition = match adapter.mount(info) {
            Ok(partition) => partition,
            Err(err) => {
                console.blank();
                console.report_error(&err);
                console.blank();
                continue;
            }
        };
        console.line("OK!");

        console.line(&format!(
            "Directory listing for cache storage #{}:",
            info.index
        ));
        let root = partition.root();
        walk(&mut ctx, partition, &mut console, &root, 0);
        console.blank();

        adapter.unmount();
    }

    console.line("Process finished. Press any button to exit.");
    wait_for_button();
    Ok(())
}
