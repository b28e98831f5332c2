//! querypad - document-query practice shell
//!
//! An interactive shell over the embedded document-query engine:
//! shell-style queries (`db.collection.operation(...)`) executed against
//! an in-memory collection store persisted to a snapshot file.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! querypad
//!
//! # One-shot execution
//! querypad -e "db.users.find()"
//! ```

use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tracing::Level;

use querypad::cli::CliInterface;
use querypad::engine::{QueryEngine, Session};
use querypad::error::Result;
use querypad::formatter::Formatter;
use querypad::matcher::{BasicMatcher, BasicPipeline};
use querypad::store::FileSnapshots;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Build the engine over its ports
/// 4. Run one-shot execution or the interactive REPL
fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    initialize_logging(&cli);

    let engine = build_engine(&cli);
    let mut session = Session::with_debounce(engine, cli.config().debounce());
    let formatter = Formatter::from_config(&cli.config().display);

    if let Some(query) = &cli.args().execute {
        let outcome = session.run(query);
        println!("{}", formatter.format(&outcome));
        if !outcome.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    cli.print_banner();
    run_repl_loop(&mut session, &formatter)
}

/// Wire the engine to its ports: the shipped matcher and pipeline
/// runner, and a file-backed snapshot store at the configured path.
fn build_engine(cli: &CliInterface) -> QueryEngine {
    let snapshots = FileSnapshots::new(&cli.config().storage.snapshot_path);
    QueryEngine::new(
        Box::new(BasicMatcher::new()),
        Box::new(BasicPipeline::new()),
        Box::new(snapshots),
    )
}

/// Main REPL loop
fn run_repl_loop(session: &mut Session, formatter: &Formatter) -> Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("querypad".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                match input {
                    "exit" | "quit" => break,
                    "help" => print_help(),
                    "show collections" => {
                        for name in session.engine().collection_names() {
                            println!("{name}");
                        }
                    }
                    _ => {
                        let outcome = session.run(input);
                        println!("{}", formatter.format(&outcome));
                    }
                }
            }
            Ok(Signal::CtrlC) => continue,
            Ok(Signal::CtrlD) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Print REPL help text
fn print_help() {
    println!(
        r#"Document operations:
  db.collection.find(filter, options)        - Find documents
  db.collection.findOne(filter, options)     - Find one document
  db.collection.insertOne(document)          - Insert one document
  db.collection.insertMany([documents])      - Insert multiple documents
  db.collection.updateOne(filter, update)    - Update one document
  db.collection.updateMany(filter, update)   - Update multiple documents
  db.collection.deleteOne(filter)            - Delete one document
  db.collection.deleteMany(filter)           - Delete multiple documents
  db.collection.countDocuments(filter)       - Count documents
  db.collection.aggregate([stages])          - Run an aggregation pipeline
  db.collection.drop()                       - Drop a collection

Options object: {{projection: {{...}}, sort: {{...}}, skip: n, limit: n}}
Update operators: $set, $unset, $inc, $mul, $min, $max, $rename

Shell:
  show collections                           - List collections
  help                                       - Show this help
  exit / quit                                - Exit shell
"#
    );
}

/// Initialize logging system based on verbosity level
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
