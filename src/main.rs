use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use time_tracker_core::bootstrap::{self, Runtime};
use time_tracker_core::cli::statistics::{write_stat_record, StatisticsCollector};
use time_tracker_core::cli::{self, Args, Command, DataCommand};
use time_tracker_core::domain::Clock;
use time_tracker_core::error::CoreError;
use time_tracker_core::facade::CoreFacade;
use time_tracker_core::pipeline::PipelineOptions;
use time_tracker_core::validation::DateCheckMode;

fn main() -> ExitCode {
    bootstrap::init_logging();
    let args = Args::parse();
    let stat_record = StatisticsCollector::from_command(&args.command);

    match run(args) {
        Ok(()) => {
            let _ = write_stat_record(&stat_record);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            let failed = StatisticsCollector::with_failure(stat_record, format!("{e:?}"));
            let _ = write_stat_record(&failed);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn clock_from_env() -> Result<Clock, CoreError> {
    match std::env::var("TT_TODAY").ok() {
        Some(today) => {
            let date = NaiveDate::parse_from_str(&today, "%Y-%m-%d")
                .map_err(|_| CoreError::InvalidArguments(format!("invalid TT_TODAY '{today}'")))?;
            Ok(Clock::fixed(date))
        }
        None => Ok(Clock::system()),
    }
}

fn run(args: Args) -> Result<(), CoreError> {
    let bundle_root =
        std::env::var("TT_BUNDLE_ROOT").map(PathBuf::from).unwrap_or_else(|_| Runtime::default_bundle_root());
    let db_path = std::env::var("TT_DB_PATH").map(PathBuf::from).unwrap_or_else(|_| Runtime::default_db_path());
    let clock = clock_from_env()?;

    let mut runtime = Runtime::bootstrap(&bundle_root, &db_path, clock.clone())?;
    let mut facade = CoreFacade {
        config: &runtime.config,
        repository: &mut runtime.repository,
        formatters: &runtime.formatters,
        clock,
    };

    dispatch(&mut facade, args.command)
}

fn dispatch(facade: &mut CoreFacade, command: Command) -> Result<(), CoreError> {
    match command {
        Command::Convert { input, output, save_processed } => {
            let ack = facade.run_convert(pipeline_options(input, output, save_processed, true, false, DateCheckMode::None, None));
            report_ack(ack)
        }
        Command::Ingest { input, output, date_check, save_processed } => {
            let mode = cli::parse_date_check(date_check.as_deref());
            let ack = facade.run_ingest(pipeline_options(input, output, save_processed, true, true, mode, None));
            report_ack(ack)
        }
        Command::Import { input, replace_month } => {
            let replace_target = replace_month.as_deref().map(parse_year_month).transpose()?;
            let ack = facade.run_import(PipelineOptions {
                validate_source: false,
                convert: false,
                validate_output: false,
                import: true,
                save_processed_output: false,
                date_check_mode: DateCheckMode::None,
                input_root: input,
                output_root: PathBuf::new(),
                replace_target,
            });
            report_ack(ack)
        }
        Command::ValidateStructure { input } => {
            let ack = facade.run_validate_structure(pipeline_options(
                input,
                PathBuf::new(),
                false,
                false,
                false,
                DateCheckMode::None,
                None,
            ));
            report_ack(ack)
        }
        Command::ValidateLogic { input, date_check } => {
            let mode = cli::parse_date_check(date_check.as_deref());
            let mut options = pipeline_options(input, PathBuf::new(), false, true, false, mode, None);
            options.validate_source = false;
            options.validate_output = true;
            let ack = facade.run_validate_logic(options);
            report_ack(ack)
        }
        Command::Query { kind, format } => {
            let request = kind.into_request()?;
            let format = cli::parse_format(&format)?;
            let output = facade.run_report_query(&request, format);
            if output.ok {
                println!("{}", output.content);
                Ok(())
            } else {
                Err(CoreError::Logic(output.error_message.unwrap_or_else(|| "query failed".to_string())))
            }
        }
        Command::Export { kind, format, out } => run_export(facade, kind, &format, &out),
        Command::Tree { path, max_depth } => {
            let response = facade.run_tree_query(path.as_deref(), max_depth);
            if !response.ok {
                return Err(CoreError::Logic(response.error_message.unwrap_or_else(|| "tree query failed".to_string())));
            }
            if !response.found {
                println!("no such project path");
                return Ok(());
            }
            if response.nodes.is_empty() {
                for root in &response.roots {
                    println!("{root}");
                }
            }
            for node in &response.nodes {
                println!("{}\t{}", node.path, node.duration_seconds);
            }
            Ok(())
        }
        Command::Data { granularity } => {
            let labels = facade.run_data_query(granularity_from(granularity));
            for label in labels {
                println!("{label}");
            }
            Ok(())
        }
    }
}

fn run_export(
    facade: &mut CoreFacade,
    kind: cli::ExportCommand,
    format: &str,
    out: &std::path::Path,
) -> Result<(), CoreError> {
    use cli::ExportCommand;

    if let ExportCommand::AllPeriod { days } = kind {
        let ack = facade.run_all_period_export(&days, &out.to_path_buf());
        return report_ack(ack);
    }

    let format = cli::parse_format(format)?;
    let request = match kind {
        ExportCommand::Day { date } => time_tracker_core::facade::ReportRequest::Day(date),
        ExportCommand::Month { year_month } => time_tracker_core::facade::ReportRequest::Month(year_month),
        ExportCommand::Week { iso_week } => time_tracker_core::facade::ReportRequest::Week(iso_week),
        ExportCommand::Year { year } => time_tracker_core::facade::ReportRequest::Year(year),
        ExportCommand::Period { days } => time_tracker_core::facade::ReportRequest::Period(days),
        ExportCommand::Range { start, end } => {
            let start = NaiveDate::parse_from_str(&start, "%Y-%m-%d")
                .map_err(|_| CoreError::InvalidArguments(format!("invalid date '{start}'")))?;
            let end = NaiveDate::parse_from_str(&end, "%Y-%m-%d")
                .map_err(|_| CoreError::InvalidArguments(format!("invalid date '{end}'")))?;
            time_tracker_core::facade::ReportRequest::Range(start, end)
        }
        ExportCommand::AllPeriod { .. } => unreachable!("handled above"),
    };
    let ack = facade.run_report_export(&request, format, &out.to_path_buf());
    report_ack(ack)
}

fn pipeline_options(
    input: PathBuf,
    output: PathBuf,
    save_processed_output: bool,
    convert: bool,
    import: bool,
    date_check_mode: DateCheckMode,
    replace_target: Option<(i32, u32)>,
) -> PipelineOptions {
    PipelineOptions {
        validate_source: true,
        convert,
        validate_output: convert,
        import,
        save_processed_output,
        date_check_mode,
        input_root: input,
        output_root: output,
        replace_target,
    }
}

fn parse_year_month(s: &str) -> Result<(i32, u32), CoreError> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| CoreError::InvalidArguments(format!("invalid YYYY-MM '{s}'")))?;
    let year: i32 = year.parse().map_err(|_| CoreError::InvalidArguments(format!("invalid YYYY-MM '{s}'")))?;
    let month: u32 = month.parse().map_err(|_| CoreError::InvalidArguments(format!("invalid YYYY-MM '{s}'")))?;
    Ok((year, month))
}

fn granularity_from(g: DataCommand) -> time_tracker_core::facade::DataGranularity {
    g.into()
}

fn report_ack(ack: time_tracker_core::facade::OperationAck) -> Result<(), CoreError> {
    if ack.ok {
        Ok(())
    } else {
        Err(CoreError::Logic(ack.error_message.unwrap_or_else(|| "operation failed".to_string())))
    }
}
